use crate::api::error::{AppError, ErrorResponse};
use crate::services::file_service::UploadContext;
use crate::services::staging::StagedUpload;
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
};
use chrono::{Datelike, Utc};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use validator::Validate;

use super::types::*;

fn form_error(e: MultipartError) -> AppError {
    AppError::BadRequest(format!("File too large or invalid form: {}", e))
}

#[utoipa::path(
    post,
    path = "/api/v1/upload",
    request_body(content = UploadRequest, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored and processed", body = UploadResponse),
        (status = 400, description = "Invalid form or plagiarism threshold exceeded", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse),
        (status = 503, description = "Plagiarism service unavailable", body = ErrorResponse)
    ),
    tag = "files"
)]
pub async fn upload_file(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let result: Result<Json<UploadResponse>, AppError> = async {
        let mut form = UploadForm::default();
        let mut staged: Option<(StagedUpload, String, String)> = None;

        while let Some(field) = multipart.next_field().await.map_err(form_error)? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "file" => {
                    let original_name = field
                        .file_name()
                        .filter(|n| !n.is_empty())
                        .map(str::to_string)
                        .ok_or_else(|| AppError::BadRequest("Error retrieving file".to_string()))?;
                    let content_type = field
                        .content_type()
                        .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
                        .to_string();

                    let reader = StreamReader::new(field.map_err(std::io::Error::other));
                    let upload = state.file_service.stage(reader, &original_name).await?;
                    staged = Some((upload, original_name, content_type));
                }
                "team_id" => form.team_id = field.text().await.map_err(form_error)?,
                "intake" => form.intake = field.text().await.map_err(form_error)?,
                _ => {}
            }
        }

        let (upload, original_name, content_type) =
            staged.ok_or_else(|| AppError::BadRequest("Error retrieving file".to_string()))?;

        form.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let ctx = UploadContext {
            original_name,
            team_id: form.team_id,
            intake: form.intake,
            year: Utc::now().year(),
            content_type,
        };

        let outcome = state.file_service.process_upload(upload, ctx).await?;
        Ok(Json(UploadResponse::from(outcome)))
    }
    .await;

    match result {
        Ok(res) => Ok(res),
        Err(e) => {
            // Drain what is left so the client reads our response instead of a reset
            tracing::warn!("Upload failed: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            Err(e)
        }
    }
}
