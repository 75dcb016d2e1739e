//! File-system backed preview and download sinks.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::app::controllers::preview::PreviewSink;
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::services::export::DownloadSink;

/// Writes the composed document to a temp file and opens it in the
/// system browser when asked to.
pub struct BrowserPreviewSink {
    path: PathBuf,
    open_in_browser: bool,
}

impl BrowserPreviewSink {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            open_in_browser: true,
        }
    }

    /// temp_dir/ferrisplay-preview/preview.html
    pub fn default_path() -> PathBuf {
        std::env::temp_dir()
            .join("ferrisplay-preview")
            .join("preview.html")
    }

    /// Disable launching the browser on reveal. Headless runs and tests.
    pub fn without_browser(mut self) -> Self {
        self.open_in_browser = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreviewSink for BrowserPreviewSink {
    fn publish(&mut self, document: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, document)?;
        Ok(())
    }

    fn reveal(&mut self) -> Result<()> {
        if !self.open_in_browser {
            return Ok(());
        }
        open::that(&self.path).map_err(|e| {
            tracing::warn!("Failed to open preview in browser: {}", e);
            AppError::Io(e)
        })
    }
}

/// Saves downloads into a directory. Existing files are never overwritten;
/// a ` (n)` suffix is added instead, like a browser download folder.
pub struct DirectoryDownloadSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectoryDownloadSink {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn free_path(&self, filename: &str) -> PathBuf {
        let candidate = self.dir.join(filename);
        if !candidate.exists() {
            return candidate;
        }
        let path = Path::new(filename);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);
        let ext = path.extension().and_then(|s| s.to_str());
        let parent = path.parent().unwrap_or(Path::new(""));
        (1..)
            .map(|n| {
                let name = match ext {
                    Some(ext) => format!("{stem} ({n}).{ext}"),
                    None => format!("{stem} ({n})"),
                };
                self.dir.join(parent).join(name)
            })
            .find(|p| !p.exists())
            .unwrap_or(candidate)
    }
}

impl DownloadSink for DirectoryDownloadSink {
    fn download(&mut self, filename: &str, content: &[u8], _mime: &str) -> Result<()> {
        // Only plain relative segments may land under the download directory
        if !Path::new(filename)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(AppError::TransferFailure(format!(
                "{filename} is outside the download directory"
            )));
        }
        let target = self.free_path(filename);
        let write = || -> std::io::Result<()> {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, content)
        };
        write().map_err(|e| {
            AppError::TransferFailure(format!("{}: {}", target.display(), e))
        })?;
        tracing::info!("Downloaded {}", target.display());
        self.written.push(target);
        Ok(())
    }
}
