use crate::api::error::AppError;

use super::{FileService, types::DeleteOutcome};

impl FileService {
    /// Removes the object first, then its metadata row.
    ///
    /// Once the object is gone the call succeeds; a metadata failure is only
    /// logged and reported through the outcome.
    pub async fn delete_by_key(&self, key: &str) -> Result<DeleteOutcome, AppError> {
        if key.is_empty() {
            return Err(AppError::BadRequest(
                "Missing file key parameter".to_string(),
            ));
        }

        self.storage
            .delete_file(key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete file: {}", e)))?;
        tracing::info!("🗑️  Deleted object {}", key);

        match self.repository.delete_by_key(key).await {
            Ok(0) => {
                tracing::warn!("Object {} deleted but no metadata record matched", key);
                Ok(DeleteOutcome::MetadataMissing)
            }
            Ok(_) => Ok(DeleteOutcome::Removed),
            Err(e) => {
                tracing::error!("File deleted from storage but not from DB: {}", e);
                Ok(DeleteOutcome::MetadataFailed)
            }
        }
    }
}
