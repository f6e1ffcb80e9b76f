use crate::AppState;
use crate::api::models::uploads::{UploadResponse, UploadStatus};
use crate::errors::{Error, ErrorBody, Result};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/ocr/upload",
    tag = "ocr",
    summary = "Upload document",
    description = "Upload a document for OCR processing. The file is checked against the configured \
                   size limit and extension allow-list, then stored under a generated identifier.",
    request_body(
        content_type = "multipart/form-data",
        description = "Multipart form with a single 'file' field"
    ),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "File too large, file type not allowed, or malformed request", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn upload_file(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadResponse>> {
    let policy = &state.config.ocr;

    // Collected from the 'file' field as the multipart body streams in
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_read_error(e, 0, policy.max_file_size))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let filename = field.file_name().map(|s| s.to_string()).ok_or_else(|| Error::BadRequest {
                    message: "The 'file' field must carry a filename".to_string(),
                })?;

                tracing::debug!(filename = %filename, "Reading upload stream");

                // Check the size limit incrementally to fail fast instead of
                // buffering an oversized upload to completion. A file of
                // exactly max_file_size bytes is still accepted.
                let mut content: Vec<u8> = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| multipart_read_error(e, content.len() as u64, policy.max_file_size))?
                {
                    let total = content.len() as u64 + chunk.len() as u64;
                    if total > policy.max_file_size {
                        tracing::warn!(
                            filename = %filename,
                            bytes_read = total,
                            max_file_size = policy.max_file_size,
                            "Upload exceeds size limit, aborting"
                        );
                        return Err(Error::FileTooLarge {
                            size: total,
                            limit: policy.max_file_size,
                        });
                    }
                    content.extend_from_slice(&chunk);
                }

                upload = Some((filename, content));
            }
            _ => {
                // Ignore unknown fields (forward compatibility)
            }
        }
    }

    let (filename, content) = upload.ok_or_else(|| Error::BadRequest {
        message: "Missing required field: 'file'".to_string(),
    })?;

    // The size check comes first: an upload that is both oversized and of a
    // disallowed type reports "File too large".
    let extension = derive_extension(&filename);
    if !policy.allowed_extensions.contains(&extension) {
        return Err(Error::FileTypeNotAllowed { extension });
    }

    // Storage key is independent of the client-supplied filename
    let file_id = Uuid::new_v4();
    let path = state.storage.store(file_id, &extension, &content).await?;

    tracing::info!(
        file_id = %file_id,
        filename = %filename,
        size_bytes = content.len(),
        path = ?path,
        "Upload stored"
    );

    Ok(Json(UploadResponse {
        file_id,
        filename,
        status: UploadStatus::Uploaded,
    }))
}

/// Classify a failure while reading the multipart body.
///
/// The router caps request bodies a little above the configured size limit
/// (see [`crate::build_router`]); a body cut off by that cap surfaces as a
/// length-limit error and is reported as an oversize upload, not a malformed
/// body. `bytes_read` is how much file content had been collected when the
/// read failed.
fn multipart_read_error(err: MultipartError, bytes_read: u64, limit: u64) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!(
            bytes_read,
            max_file_size = limit,
            "Request body exceeds the upload size cap, aborting"
        );
        return Error::FileTooLarge { size: bytes_read, limit };
    }

    Error::BadRequest {
        message: format!("Failed to parse multipart data: {}", err),
    }
}

/// Extension of a declared filename: the substring after the last `.`, lower-cased.
///
/// A filename without a `.` yields the whole name, which then has to clear the
/// allow-set like any other extension. Multi-dot names yield the final segment
/// ("archive.tar.gz" -> "gz").
fn derive_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, extension)) => extension.to_lowercase(),
        None => filename.to_lowercase(),
    }
}
