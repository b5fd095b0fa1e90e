use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub mod capture;
pub mod error;
pub mod runner;

pub use capture::CaptureSink;
pub use error::RunnerError;
pub use runner::{ProcessExecutor, Runner, SystemExecutor};

/// One episode to mux.
///
/// The identifier is either a plain episode label (`"01"`) or an
/// `"<arc>_<episode>"` composite for projects using the alternate folder
/// structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub identifier: String,
    /// 1-based position within the session.
    pub ordinal: usize,
}

impl WorkItem {
    pub fn new(identifier: impl Into<String>, ordinal: usize) -> Self {
        Self {
            identifier: identifier.into(),
            ordinal,
        }
    }

    /// Builds one work item per identifier, numbered from 1.
    pub fn sequence<I, S>(identifiers: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        identifiers
            .into_iter()
            .enumerate()
            .map(|(i, id)| Self::new(id, i + 1))
            .collect()
    }

    /// The Gradle task that muxes this item.
    pub fn subcommand(&self) -> String {
        format!("mux.{}", self.identifier)
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

/// The Gradle wrapper script a SubKt project ships with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    pub file_name: String,
}

impl Launcher {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
        }
    }

    /// `gradlew` on unix, `gradlew.bat` on windows.
    pub fn platform() -> Self {
        if cfg!(windows) {
            Self::new("gradlew.bat")
        } else {
            Self::new("gradlew")
        }
    }

    /// Location of the script inside a project directory.
    pub fn resolve(&self, working_dir: &std::path::Path) -> PathBuf {
        working_dir.join(&self.file_name)
    }
}

impl Default for Launcher {
    fn default() -> Self {
        Self::platform()
    }
}
