use crate::api::error::AppError;

use super::{FileService, types::TeamListing};

impl FileService {
    pub async fn list_by_team(&self, team_id: &str) -> Result<TeamListing, AppError> {
        if team_id.is_empty() {
            return Err(AppError::BadRequest(
                "team_id parameter is required".to_string(),
            ));
        }

        let files = self
            .repository
            .list_by_team(team_id)
            .await
            .map_err(|e| AppError::Internal(format!("failed to fetch files: {}", e)))?;

        if files.is_empty() {
            Ok(TeamListing::Empty)
        } else {
            Ok(TeamListing::Files(files))
        }
    }
}
