//! Product image uploads.
//!
//! `POST /upload` takes a multipart form with an `image` file field, stores
//! it under the uploads directory with a generated name and answers with the
//! public path the file is served from.

use std::path::Path;

use axum::Json;
use axum::extract::{Multipart, State};
use chrono::Utc;
use rand::Rng;
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Multipart field the file is read from.
pub const IMAGE_FIELD: &str = "image";

/// Public prefix uploaded files are served under.
pub const UPLOADS_PATH: &str = "/uploads";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Store one uploaded image.
///
/// # Errors
///
/// `BadRequest` when the form has no `image` field or cannot be read,
/// `Internal` when the file cannot be written.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = stored_name(field.file_name());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let dir = &state.config().uploads_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::Internal(format!("create uploads dir: {e}")))?;
        tokio::fs::write(dir.join(&filename), &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("write upload: {e}")))?;

        tracing::info!(filename = %filename, size = bytes.len(), "Image uploaded");
        return Ok(Json(UploadResponse {
            url: format!("{UPLOADS_PATH}/{filename}"),
        }));
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

/// `image-<millis>-<random><ext>`, keeping the client's extension when it
/// is plain alphanumeric.
fn stored_name(original: Option<&str>) -> String {
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    format!(
        "{IMAGE_FIELD}-{}-{suffix}{ext}",
        Utc::now().timestamp_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_name_keeps_extension() {
        let name = stored_name(Some("Basket Photo.JPG"));
        assert!(name.starts_with("image-"));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn test_stored_name_drops_odd_extensions() {
        assert!(!stored_name(Some("x.p/ng")).contains('/'));
        assert!(!stored_name(Some("noext")).contains('.'));
        assert!(!stored_name(None).contains('.'));
    }
}
