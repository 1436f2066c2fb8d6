use crate::entities::files;
use crate::services::file_repository::TeamFile;

/// Form fields that accompany the uploaded bytes.
#[derive(Debug, Clone)]
pub struct UploadContext {
    pub original_name: String,
    pub team_id: String,
    pub intake: String,
    pub year: i32,
    pub content_type: String,
}

#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Pdf {
        record: files::Model,
        plagiarism_percent: f64,
    },
    Archive {
        record: files::Model,
    },
}

impl UploadOutcome {
    pub fn record(&self) -> &files::Model {
        match self {
            UploadOutcome::Pdf { record, .. } | UploadOutcome::Archive { record } => record,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Object and metadata row both removed.
    Removed,
    /// Object removed; no metadata row matched the key.
    MetadataMissing,
    /// Object removed; the metadata delete failed and was logged.
    MetadataFailed,
}

impl DeleteOutcome {
    pub fn metadata_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Removed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TeamListing {
    Empty,
    Files(Vec<TeamFile>),
}
