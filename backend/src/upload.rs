use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::warn;
use uuid::Uuid;

/// Upload size cap.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Returns the lowercased extension when the filename carries one from the
/// allow-list, `None` otherwise.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// A transient uploaded file scoped to a single request. The file is
/// removed when the guard drops, on every exit path: normal return,
/// validation failure or inference error.
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// Writes the upload under a fresh uuid name inside `dir`, creating the
    /// directory if needed.
    pub fn write(dir: &Path, extension: &str, bytes: &[u8]) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.{}", Uuid::new_v4(), extension));
        let mut file = fs::File::create(&path)?;
        file.write_all(bytes)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove upload {}: {}", self.path.display(), e);
            }
        }
    }
}
