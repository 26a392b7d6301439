use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::ScrapeError;
use crate::models::SavedImage;

/// Write `bytes` to `dir/filename`, replacing any existing file.
///
/// The bytes land in a temporary file next to the destination and are
/// renamed into place only after a full write, so a failed save never
/// leaves a truncated image behind.
pub fn save_bytes(dir: &Path, filename: &str, bytes: &[u8]) -> Result<SavedImage, ScrapeError> {
    let path = dir.join(filename);
    let write_err = |source: std::io::Error| ScrapeError::Write {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(&path).map_err(|e| write_err(e.error))?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "image saved");
    Ok(SavedImage {
        filename: filename.to_string(),
        path,
        len: bytes.len(),
    })
}
