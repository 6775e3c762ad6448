//! Content sniffing for media bytes moving to and from the service.

use crate::{Error, Result};

/// Prefix of an MP4 file once it has been base64-encoded: the leading
/// zero bytes of the `ftyp` box size encode to `AAAA`.
///
/// Checking for it is a heuristic. Real MP4 bytes never start with these
/// ASCII letters, but other payloads could.
pub const BASE64_VIDEO_MAGIC: &[u8] = b"AAAA";

pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/png",
                &bytes[..bytes.len().min(4)]
            );
            "image/png"
        }
    }
}

/// File extension used when saving media of `mime_type`.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        _ => "png",
    }
}

/// Decodes `bytes` once if they look like base64 text of a video; returns
/// them untouched otherwise.
pub fn decode_if_base64_video(bytes: Vec<u8>) -> Result<Vec<u8>> {
    if !bytes.starts_with(BASE64_VIDEO_MAGIC) {
        return Ok(bytes);
    }

    tracing::debug!("Video payload looks base64-encoded, decoding");
    use base64::Engine as _;
    let trimmed: Vec<u8> = bytes
        .into_iter()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    base64::engine::general_purpose::STANDARD
        .decode(&trimmed)
        .map_err(|e| Error::malformed(format!("Failed to decode base64 video payload: {}", e)))
}
