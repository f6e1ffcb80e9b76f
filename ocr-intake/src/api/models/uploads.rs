use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Response returned for a successfully stored upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Generated identifier the file is stored under
    #[schema(value_type = String, format = "uuid")]
    pub file_id: Uuid,
    /// Original filename exactly as the client declared it
    pub filename: String,
    /// Always "uploaded"
    pub status: UploadStatus,
}

/// Lifecycle state of an accepted upload
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploaded,
}
