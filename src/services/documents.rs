//! KML file I/O service.
//!
//! This module centralizes reading source documents and writing exports,
//! providing consistent error messages and atomic writes.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::session::ExportedKml;

/// Service for loading and saving KML files.
pub struct KmlService;

impl KmlService {
    /// Reads a KML file as text.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use kmlstyler::services::KmlService;
    ///
    /// let text = KmlService::load(Path::new("trails.kml"))?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read KML file {}", path.display()))
    }

    /// File name component of a path, used as the import's source name.
    #[must_use]
    pub fn file_name(path: &Path) -> Option<String> {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Writes an export into `dir` under its derived file name.
    ///
    /// Returns the full path of the written file.
    pub fn save(exported: &ExportedKml, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&exported.file_name);
        Self::save_to(&exported.contents, &path)?;
        Ok(path)
    }

    /// Writes KML text to `path`.
    ///
    /// This performs an atomic write using a temp file + rename pattern to ensure
    /// the file is never left in a corrupted state.
    pub fn save_to(contents: &str, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let temp_path = path.with_extension("kml.tmp");
        fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write temp file {}", temp_path.display()))?;

        fs::rename(&temp_path, path).with_context(|| {
            format!(
                "Failed to rename temp file {} to {}",
                temp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}
