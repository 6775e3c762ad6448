use crate::ai::mime::extension_for_mime;
use crate::models::{Artifact, MediaKind};
use crate::Result;
use little_exif::metadata::Metadata;
use std::path::{Path, PathBuf};

/// Writes `artifact` to `dir/<stem>.<ext>` and returns the path.
///
/// The extension follows the artifact's mime type. Image metadata is
/// stripped after writing.
pub async fn export_artifact(artifact: &Artifact, dir: &Path, stem: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(format!("{}.{}", stem, extension_for_mime(&artifact.mime_type)));
    tokio::fs::write(&path, &artifact.media).await?;

    if artifact.kind == MediaKind::Image {
        if let Err(e) = Metadata::file_clear_metadata(&path) {
            tracing::warn!("Failed to strip metadata from {}: {}", path.display(), e);
        }
    }

    tracing::info!(
        "Saved {} ({} bytes) to {}",
        artifact.mime_type,
        artifact.media.len(),
        path.display()
    );
    Ok(path)
}
