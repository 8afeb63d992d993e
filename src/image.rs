// src/image.rs
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::errors::{AnalyzeError, Result};

pub const DATA_URL_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

/// Validates an incoming image data URL without retaining any of it.
///
/// Checks, in order: presence, the `data:image/` prefix, that the base64
/// payload decodes, and that the decoded size stays under `max_bytes`
/// (0 disables the ceiling). Returns the decoded byte length.
pub fn validate_data_url(image: &str, max_bytes: usize) -> Result<usize> {
    if image.is_empty() {
        return Err(AnalyzeError::InvalidRequest("Image is required".to_string()));
    }

    if !image.starts_with(DATA_URL_PREFIX) {
        return Err(AnalyzeError::InvalidRequest(
            "Invalid image format. Please provide a valid base64 image.".to_string(),
        ));
    }

    let payload = match image.find(BASE64_MARKER) {
        Some(idx) => &image[idx + BASE64_MARKER.len()..],
        None => {
            return Err(AnalyzeError::InvalidRequest(
                "Invalid image format. Please provide a valid base64 image.".to_string(),
            ));
        }
    };

    let decoded = STANDARD.decode(payload).map_err(|_| {
        AnalyzeError::InvalidRequest(
            "Invalid image format. Please provide a valid base64 image.".to_string(),
        )
    })?;

    if max_bytes > 0 && decoded.len() > max_bytes {
        return Err(AnalyzeError::InvalidRequest(
            "Image exceeds the maximum allowed size.".to_string(),
        ));
    }

    Ok(decoded.len())
}
