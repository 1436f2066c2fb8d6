use crate::api::error::{AppError, ErrorResponse};
use crate::services::file_repository::TeamFile;
use crate::services::file_service::TeamListing;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::*;

#[utoipa::path(
    get,
    path = "/api/v1/download",
    params(TeamQuery),
    responses(
        (status = 200, description = "Download links for the team's files", body = Vec<TeamFile>),
        (status = 204, description = "Team has no files"),
        (status = 400, description = "Missing team_id", body = ErrorResponse),
        (status = 500, description = "Database failure", body = ErrorResponse)
    ),
    tag = "files"
)]
pub async fn list_team_files(
    State(state): State<crate::AppState>,
    Query(query): Query<TeamQuery>,
) -> Result<Response, AppError> {
    match state.file_service.list_by_team(&query.team_id).await? {
        TeamListing::Empty => Ok(StatusCode::NO_CONTENT.into_response()),
        TeamListing::Files(files) => Ok(Json(files).into_response()),
    }
}
