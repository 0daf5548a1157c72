use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Receives a finished CSV document. The host analogue of a browser download.
pub trait ExportSink: Send + Sync {
    fn deliver(&self, file_name: &str, contents: &str) -> Result<PathBuf>;
}

pub struct DirectoryExportSink {
    dir: PathBuf,
}

impl DirectoryExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectoryExportSink {
    fn deliver(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create export dir {}", self.dir.display()))?;

        let path = self.dir.join(file_name);
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write laps to {}", path.display()))?;
        Ok(path)
    }
}
