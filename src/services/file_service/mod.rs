use crate::api::error::AppError;
use crate::config::PlagiarismConfig;
use crate::services::{
    backup, file_repository::FileRepository, plagiarism::PlagiarismChecker,
    staging::StagingArea, storage::StorageService,
};
use std::sync::Arc;

pub mod delete;
pub mod list;
pub mod types;
pub mod upload;

pub use types::{DeleteOutcome, TeamListing, UploadContext, UploadOutcome};

/// Request-scoped upload, delete and listing pipelines over the three gateways.
pub struct FileService {
    storage: Arc<dyn StorageService>,
    repository: Arc<dyn FileRepository>,
    plagiarism: Arc<dyn PlagiarismChecker>,
    staging: StagingArea,
    plagiarism_threshold: u32,
}

impl FileService {
    pub fn new(
        storage: Arc<dyn StorageService>,
        repository: Arc<dyn FileRepository>,
        plagiarism: Arc<dyn PlagiarismChecker>,
        staging: StagingArea,
        plagiarism_config: &PlagiarismConfig,
    ) -> Self {
        Self {
            storage,
            repository,
            plagiarism,
            staging,
            plagiarism_threshold: plagiarism_config.threshold,
        }
    }

    pub fn plagiarism_threshold(&self) -> u32 {
        self.plagiarism_threshold
    }

    /// ZIP of the whole bucket, rewound and ready to stream.
    pub async fn archive_bucket(&self) -> Result<std::fs::File, AppError> {
        let (file, _count) = backup::archive_bucket(self.storage.clone())
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create zip: {}", e)))?;
        Ok(file)
    }
}
