use crate::api::error::AppError;
use crate::services::file_repository::NewFileRecord;
use crate::services::staging::{StagedUpload, StagingError};
use crate::services::storage::{PRESIGNED_URL_TTL, storage_key};
use crate::utils::file_type::{self, FileType};
use chrono::Utc;
use tokio::io::AsyncRead;

use super::{FileService, types::*};

impl FileService {
    /// Writes the upload stream to the scratch directory and hands back the
    /// guard that owns the local copy.
    pub async fn stage<R>(&self, reader: R, original_name: &str) -> Result<StagedUpload, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let staged = self
            .staging
            .stage(reader, original_name)
            .await
            .map_err(|e| match e {
                StagingError::Read { source } => {
                    AppError::BadRequest(format!("File too large or invalid form: {}", source))
                }
                other => AppError::Internal(format!("Failed to save file: {}", other)),
            })?;

        tracing::info!(
            "📥 Staged {} as {} ({} bytes)",
            original_name,
            staged.generated_name,
            staged.size
        );

        Ok(StagedUpload::new(staged))
    }

    /// Upload → presign → persist metadata → type-specific checks.
    ///
    /// The staged file is released on every exit path.
    pub async fn process_upload(
        &self,
        staged: StagedUpload,
        ctx: UploadContext,
    ) -> Result<UploadOutcome, AppError> {
        let result = self.run_pipeline(&staged, &ctx).await;
        staged.release().await;
        result
    }

    async fn run_pipeline(
        &self,
        staged: &StagedUpload,
        ctx: &UploadContext,
    ) -> Result<UploadOutcome, AppError> {
        let original_name = file_type::base_name(&ctx.original_name).to_string();
        let key = storage_key(ctx.year, &ctx.intake, &ctx.team_id, &original_name);

        // 1. Object store
        self.storage
            .put_file(staged.path(), &key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to upload to cloud storage: {}", e)))?;
        tracing::info!("☁️  Uploaded {} to {}", staged.generated_name(), key);

        // From here on a failure leaves the object without a metadata row.
        // 2. Presigned download link
        let download_url = self
            .storage
            .presign(&key, PRESIGNED_URL_TTL)
            .await
            .map_err(|e| {
                tracing::error!("Object {} stored without metadata (presign failed)", key);
                AppError::Internal(format!("Failed to generate download link: {}", e))
            })?;

        // 3. Metadata row
        let extension = file_type::extension(&original_name);
        let record = self
            .repository
            .create(NewFileRecord {
                original_name: original_name.clone(),
                storage_key: key.clone(),
                download_url,
                size: staged.size() as i64,
                team_id: ctx.team_id.clone(),
                file_type: extension.strip_prefix('.').unwrap_or(extension).to_string(),
                content_type: ctx.content_type.clone(),
                created_at: Utc::now(),
            })
            .await
            .map_err(|e| {
                tracing::error!("Object {} stored without metadata (insert failed)", key);
                AppError::Internal(format!("Failed to save file metadata: {}", e))
            })?;

        // 4. Type-specific processing
        match FileType::detect(&original_name) {
            FileType::Pdf => {
                let percent = self.plagiarism.check(staged.path()).await.map_err(|e| {
                    AppError::ServiceUnavailable(format!("Plagiarism check failed: {}", e))
                })?;

                if percent >= self.plagiarism_threshold as f64 {
                    tracing::warn!(
                        "🚫 {} rejected: {}% similarity (threshold {}%)",
                        key,
                        percent,
                        self.plagiarism_threshold
                    );
                    return Err(AppError::PlagiarismRejected {
                        detected: percent,
                        threshold: self.plagiarism_threshold,
                    });
                }

                tracing::info!("✅ {} passed plagiarism check ({}%)", key, percent);
                Ok(UploadOutcome::Pdf {
                    record,
                    plagiarism_percent: percent,
                })
            }
            FileType::Archive => Ok(UploadOutcome::Archive { record }),
            FileType::Unknown => {
                tracing::warn!("Unsupported file type for {}", key);
                Err(AppError::UnsupportedMediaType(
                    "Unsupported file type".to_string(),
                ))
            }
        }
    }
}
