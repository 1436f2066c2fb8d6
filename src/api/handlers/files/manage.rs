use crate::api::error::{AppError, ErrorResponse};
use crate::services::file_service::DeleteOutcome;
use axum::{
    Json,
    extract::{Query, State},
};

use super::types::*;

#[utoipa::path(
    delete,
    path = "/api/v1/files",
    params(DeleteQuery),
    responses(
        (status = 200, description = "Object deleted; metadata_deleted reports the database side", body = DeleteResponse),
        (status = 400, description = "Missing key", body = ErrorResponse),
        (status = 500, description = "Object store failure", body = ErrorResponse)
    ),
    tag = "files"
)]
pub async fn delete_file(
    State(state): State<crate::AppState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    let outcome = state.file_service.delete_by_key(&query.key).await?;

    let message = match outcome {
        DeleteOutcome::Removed => "File deleted successfully",
        DeleteOutcome::MetadataMissing => {
            "File deleted from storage; no metadata record found for this key"
        }
        DeleteOutcome::MetadataFailed => {
            "File deleted from storage; metadata record could not be removed"
        }
    };

    Ok(Json(DeleteResponse {
        status: "success".to_string(),
        message: message.to_string(),
        key: query.key,
        metadata_deleted: outcome.metadata_deleted(),
    }))
}
