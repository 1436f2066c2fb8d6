use crate::api::error::{AppError, ErrorResponse};
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

#[utoipa::path(
    get,
    path = "/api/v1/bucket/backup",
    responses(
        (status = 200, description = "ZIP archive of every stored object", content_type = "application/zip"),
        (status = 500, description = "Listing or reading objects failed", body = ErrorResponse)
    ),
    tag = "files"
)]
pub async fn download_bucket(State(state): State<crate::AppState>) -> Result<Response, AppError> {
    let archive = state.file_service.archive_bucket().await?;
    let stream = ReaderStream::new(tokio::fs::File::from_std(archive));

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bucket-backup.zip\"",
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
