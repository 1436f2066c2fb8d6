use crate::services::file_service::UploadOutcome;
use crate::utils::file_type;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Multipart body of `POST /api/v1/upload` (documentation only).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadRequest {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub team_id: String,
    pub intake: String,
}

/// Text fields collected while reading the multipart stream.
#[derive(Debug, Default, Validate)]
pub struct UploadForm {
    #[validate(length(min = 1, message = "team_id is required"))]
    pub team_id: String,
    #[validate(length(min = 1, message = "intake is required"))]
    pub intake: String,
}

#[derive(Serialize, ToSchema)]
pub struct UploadMetadata {
    pub plagiarism_checked: bool,
    pub plagiarism_percent: f64,
}

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub status: String,
    pub message: String,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub storage_key: String,
    pub download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<UploadMetadata>,
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        let (message, metadata, record) = match outcome {
            UploadOutcome::Pdf {
                record,
                plagiarism_percent,
            } => (
                "PDF processed successfully",
                Some(UploadMetadata {
                    plagiarism_checked: true,
                    plagiarism_percent,
                }),
                record,
            ),
            UploadOutcome::Archive { record } => ("Archive processed successfully", None, record),
        };

        Self {
            status: "success".to_string(),
            message: message.to_string(),
            file_type: file_type::extension(&record.original_name).to_string(),
            file_name: record.original_name,
            file_size: record.size,
            storage_key: record.storage_key,
            download_url: record.download_url,
            metadata,
        }
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteQuery {
    /// Storage key returned by the upload endpoint
    #[serde(default)]
    pub key: String,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub status: String,
    pub message: String,
    pub key: String,
    pub metadata_deleted: bool,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeamQuery {
    #[serde(default)]
    pub team_id: String,
}
