//! Image handling around remote calls
//!
//! Validity checks for returned images, re-encoding of reference images
//! before video upload, display previews, and writing artifacts to disk.

pub mod export;
pub mod processor;

pub use export::export_artifact;
pub use processor::{downscale_for_display, is_valid_image, prepare_video_reference, DISPLAY_WIDTH};

/// Encoded 10x10 red PNG for tests.
#[cfg(test)]
pub(crate) fn test_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(10, 10, image::Rgba([255, 0, 0, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
