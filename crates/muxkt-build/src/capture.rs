use crate::RunnerError;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// The file receiving the merged stdout/stderr of the latest run.
///
/// Each run truncates it; the content outlives the process so the last
/// output can be shown verbatim later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSink {
    pub path: PathBuf,
}

impl CaptureSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the sink for a new run, discarding the previous capture.
    pub fn open_truncated(&self) -> Result<File, RunnerError> {
        let wrap = |source| RunnerError::Capture {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(wrap)?;
        }
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(wrap)
    }

    /// Reads the latest capture.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected; the
    /// build tool's output is not guaranteed to be clean.
    pub fn read(&self) -> Result<String, RunnerError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(RunnerError::CaptureMissing(self.path.clone()))
            }
            Err(source) => Err(RunnerError::Capture {
                path: self.path.clone(),
                source,
            }),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}
