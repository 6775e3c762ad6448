use crate::models::ReferenceImage;
use crate::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

const UPLOAD_JPEG_QUALITY: u8 = 95;

/// Width of previews for the current selection.
pub const DISPLAY_WIDTH: u32 = 640;

/// True when `bytes` decode as an image in a supported format.
pub fn is_valid_image(bytes: &[u8]) -> bool {
    image::guess_format(bytes).is_ok() && image::load_from_memory(bytes).is_ok()
}

fn reencode_jpeg_sync(bytes: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)?;
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut out = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, UPLOAD_JPEG_QUALITY))?;
    Ok(out)
}

/// Re-encodes a reference image as RGB JPEG, the format the video model
/// accepts regardless of what the user uploaded.
pub async fn prepare_video_reference(image: &ReferenceImage) -> Result<ReferenceImage> {
    let bytes = image.bytes.clone();
    let jpeg = tokio::task::spawn_blocking(move || reencode_jpeg_sync(&bytes))
        .await
        .map_err(|e| Error::Invariant(format!("Image processing task join error: {}", e)))??;

    tracing::debug!(
        "Re-encoded reference image {} ({} bytes) to JPEG ({} bytes)",
        image.mime_type,
        image.bytes.len(),
        jpeg.len()
    );

    Ok(ReferenceImage {
        bytes: jpeg,
        mime_type: "image/jpeg".to_string(),
    })
}

fn downscale_sync(bytes: &[u8], target_width: u32) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();
    let resized = if width <= target_width {
        img
    } else {
        let target_height = ((height as f64) * (target_width as f64 / width as f64)).max(1.0) as u32;
        img.resize_exact(target_width, target_height, FilterType::Lanczos3)
    };

    let mut out = Vec::new();
    resized.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

/// Scales an image down to `target_width`, keeping its aspect ratio, and
/// returns it as PNG. Narrower images keep their size.
pub async fn downscale_for_display(bytes: &[u8], target_width: u32) -> Result<Vec<u8>> {
    let bytes = bytes.to_vec();
    tokio::task::spawn_blocking(move || downscale_sync(&bytes, target_width))
        .await
        .map_err(|e| Error::Invariant(format!("Image processing task join error: {}", e)))?
}
