//! Template source capability
//!
//! Resolution reads templates through [`TemplateSource`] so tests can serve
//! templates from memory.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Template not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads raw template bytes by path
pub trait TemplateSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError>;
}

/// Reads templates from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTemplateSource;

impl TemplateSource for FsTemplateSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
            _ => SourceError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })
    }
}

/// In-memory templates keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateSource {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryTemplateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn with(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }
}

impl TemplateSource for MemoryTemplateSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn fs_source_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.yaml");
        fs::write(&path, "version: '1'\n").unwrap();

        assert_eq!(FsTemplateSource.read(&path).unwrap(), b"version: '1'\n");
    }

    #[test]
    fn fs_source_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = FsTemplateSource.read(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn memory_source() {
        let source = MemoryTemplateSource::new().with("/t/a.yaml", "tasks: []");
        assert_eq!(source.read(Path::new("/t/a.yaml")).unwrap(), b"tasks: []");
        assert!(matches!(
            source.read(Path::new("/t/b.yaml")),
            Err(SourceError::NotFound(_))
        ));
    }
}
