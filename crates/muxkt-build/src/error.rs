use std::path::PathBuf;
use thiserror::Error;

/// Environment problems that stop a mux session.
///
/// A build that runs and exits non-zero is not an error; it is reported
/// through the exit code.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("the path '{}' does not exist", .0.display())]
    WorkingDirMissing(PathBuf),

    #[error("you do not have permission to access '{}'", .0.display())]
    WorkingDirInaccessible(PathBuf),

    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("build launcher '{}' not found; is this a SubKt project?", .0.display())]
    LauncherNotFound(PathBuf),

    #[error("could not open capture file '{}': {source}", path.display())]
    Capture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file not found: {}", .0.display())]
    CaptureMissing(PathBuf),

    #[error("failed to launch '{}': {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
