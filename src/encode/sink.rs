use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{CollageError, CollageResult};

/// Receives the encoded collage under a suggested file name.
pub trait ExportSink {
    /// Persist `bytes` as `name`.
    fn save(&mut self, name: &str, bytes: &[u8]) -> CollageResult<()>;
}

/// Writes exports into a directory, creating it when needed.
#[derive(Clone, Debug)]
pub struct FileSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FileSink {
    /// Create a sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Paths written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ExportSink for FileSink {
    fn save(&mut self, name: &str, bytes: &[u8]) -> CollageResult<()> {
        let file = Path::new(name);
        if file.file_name().map(Path::new) != Some(file) {
            return Err(CollageError::validation(format!(
                "export name must be a plain file name, got \"{name}\""
            )));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir {}", self.dir.display()))?;
        let path = self.dir.join(file);
        std::fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved export");
        self.written.push(path);
        Ok(())
    }
}

/// In-memory sink for tests and embedding in other programs.
#[derive(Debug, Default)]
pub struct InMemorySink {
    pub(crate) saved: Vec<(String, Vec<u8>)>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved, in order.
    pub fn saved(&self) -> &[(String, Vec<u8>)] {
        &self.saved
    }
}

impl ExportSink for InMemorySink {
    fn save(&mut self, name: &str, bytes: &[u8]) -> CollageResult<()> {
        self.saved.push((name.to_owned(), bytes.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
