use crate::{CaptureSink, Launcher, RunnerError, WorkItem};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Launches a process with both output streams sent to `sink`.
///
/// This allows the runner to be exercised in tests without a Gradle project.
pub trait ProcessExecutor: std::fmt::Debug {
    /// Runs `program` to completion and returns its exit code, or `None`
    /// when it was terminated by a signal.
    fn execute(
        &self,
        program: &Path,
        args: &[String],
        working_dir: &Path,
        sink: File,
    ) -> io::Result<Option<i32>>;
}

/// Default implementation of [`ProcessExecutor`] using `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl ProcessExecutor for SystemExecutor {
    fn execute(
        &self,
        program: &Path,
        args: &[String],
        working_dir: &Path,
        sink: File,
    ) -> io::Result<Option<i32>> {
        let stderr = sink.try_clone()?;
        let status = Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(sink))
            .stderr(Stdio::from(stderr))
            .status()?;
        Ok(status.code())
    }
}

/// Runs `mux.<identifier>` through a project's Gradle wrapper.
#[derive(Debug)]
pub struct Runner {
    working_dir: PathBuf,
    launcher: Launcher,
    extra_flags: Vec<String>,
    sink: CaptureSink,
    executor: Box<dyn ProcessExecutor>,
}

impl Runner {
    pub fn new(working_dir: PathBuf, sink: CaptureSink) -> Self {
        Self {
            working_dir,
            launcher: Launcher::platform(),
            extra_flags: Vec::new(),
            sink,
            executor: Box::new(SystemExecutor),
        }
    }

    pub fn with_flags(mut self, flags: Vec<String>) -> Self {
        self.extra_flags = flags;
        self
    }

    pub fn with_launcher(mut self, launcher: Launcher) -> Self {
        self.launcher = launcher;
        self
    }

    /// Replaces the process executor (for testing).
    pub fn with_executor(mut self, executor: Box<dyn ProcessExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn sink(&self) -> &CaptureSink {
        &self.sink
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Arguments passed to the launcher: `--console=plain [flags...] mux.<id>`.
    pub fn arguments(&self, item: &WorkItem) -> Vec<String> {
        let mut args = Vec::with_capacity(self.extra_flags.len() + 2);
        args.push("--console=plain".to_string());
        args.extend(self.extra_flags.iter().cloned());
        args.push(item.subcommand());
        args
    }

    /// Checks that the project directory exists and can be listed.
    pub fn check_working_dir(&self) -> Result<(), RunnerError> {
        let dir = &self.working_dir;
        let meta = fs::metadata(dir).map_err(|e| classify_dir_error(dir, e))?;
        if !meta.is_dir() {
            return Err(RunnerError::NotADirectory(dir.clone()));
        }
        fs::read_dir(dir).map_err(|e| classify_dir_error(dir, e))?;
        Ok(())
    }

    /// Runs one work item to completion and returns its exit code.
    ///
    /// The capture sink is truncated first and holds the complete output
    /// once this returns. A process killed by a signal reports `-1`.
    pub fn run(&self, item: &WorkItem) -> Result<i32, RunnerError> {
        self.check_working_dir()?;

        let program = self.launcher.resolve(&self.working_dir);
        if !program.is_file() {
            return Err(RunnerError::LauncherNotFound(program));
        }

        let args = self.arguments(item);
        log::info!("running {} {}", program.display(), args.join(" "));

        let sink = self.sink.open_truncated()?;
        let code = self
            .executor
            .execute(&program, &args, &self.working_dir, sink)
            .map_err(|source| {
                if source.kind() == io::ErrorKind::NotFound {
                    RunnerError::LauncherNotFound(program.clone())
                } else {
                    RunnerError::Spawn {
                        program: program.clone(),
                        source,
                    }
                }
            })?;

        match code {
            Some(code) => {
                log::debug!("{} exited with {}", item, code);
                Ok(code)
            }
            None => {
                log::warn!("{} was terminated by a signal", item);
                Ok(-1)
            }
        }
    }
}

fn classify_dir_error(dir: &Path, e: io::Error) -> RunnerError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => RunnerError::WorkingDirInaccessible(dir.to_path_buf()),
        _ => RunnerError::WorkingDirMissing(dir.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    #[derive(Debug)]
    struct MockExecutor {
        output: String,
        code: Option<i32>,
        calls: RefCell<Vec<(PathBuf, Vec<String>)>>,
    }

    impl MockExecutor {
        fn new(output: &str, code: Option<i32>) -> Self {
            Self {
                output: output.to_string(),
                code,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ProcessExecutor for Rc<MockExecutor> {
        fn execute(
            &self,
            program: &Path,
            args: &[String],
            _working_dir: &Path,
            mut sink: File,
        ) -> io::Result<Option<i32>> {
            self.calls
                .borrow_mut()
                .push((program.to_path_buf(), args.to_vec()));
            sink.write_all(self.output.as_bytes())?;
            Ok(self.code)
        }
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("gradlew"), "#!/bin/sh\n").unwrap();
        dir
    }

    #[test]
    fn test_arguments_order() {
        let runner = Runner::new(PathBuf::from("."), CaptureSink::new(PathBuf::from("o.txt")))
            .with_flags(vec!["-Pkey=value".into(), "--offline".into()]);
        assert_eq!(
            runner.arguments(&WorkItem::new("ft_01", 1)),
            ["--console=plain", "-Pkey=value", "--offline", "mux.ft_01"]
        );
    }

    #[test]
    fn test_run_captures_output_and_exit_code() {
        let dir = project();
        let sink = CaptureSink::new(dir.path().join("output.txt"));
        let mock = Rc::new(MockExecutor::new("BUILD FAILED in 1s\n", Some(1)));
        let runner = Runner::new(dir.path().to_path_buf(), sink.clone())
            .with_launcher(Launcher::new("gradlew"))
            .with_executor(Box::new(Rc::clone(&mock)));

        let code = runner.run(&WorkItem::new("01", 1)).unwrap();
        assert_eq!(code, 1);
        assert_eq!(sink.read().unwrap(), "BUILD FAILED in 1s\n");

        let calls = mock.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, dir.path().join("gradlew"));
        assert_eq!(calls[0].1.last().map(String::as_str), Some("mux.01"));
    }

    #[test]
    fn test_signal_is_negative_exit() {
        let dir = project();
        let mock = Rc::new(MockExecutor::new("", None));
        let runner = Runner::new(
            dir.path().to_path_buf(),
            CaptureSink::new(dir.path().join("output.txt")),
        )
        .with_launcher(Launcher::new("gradlew"))
        .with_executor(Box::new(mock));
        assert_eq!(runner.run(&WorkItem::new("01", 1)).unwrap(), -1);
    }

    #[test]
    fn test_missing_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone");
        let runner = Runner::new(gone.clone(), CaptureSink::new(dir.path().join("o.txt")));
        match runner.run(&WorkItem::new("01", 1)) {
            Err(RunnerError::WorkingDirMissing(p)) => assert_eq!(p, gone),
            other => panic!("expected WorkingDirMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_working_dir_is_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "").unwrap();
        let runner = Runner::new(file, CaptureSink::new(dir.path().join("o.txt")));
        assert!(matches!(
            runner.check_working_dir(),
            Err(RunnerError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_missing_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CaptureSink::new(dir.path().join("output.txt"));
        let runner = Runner::new(dir.path().to_path_buf(), sink.clone())
            .with_launcher(Launcher::new("gradlew"));
        assert!(matches!(
            runner.run(&WorkItem::new("01", 1)),
            Err(RunnerError::LauncherNotFound(_))
        ));
        assert!(!sink.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_merges_streams() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("gradlew");
        fs::write(
            &script,
            "#!/bin/sh\necho \"args: $*\"\necho \"Error: from stderr\" >&2\nexit 3\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let sink = CaptureSink::new(dir.path().join("out").join("output.txt"));
        let runner = Runner::new(dir.path().to_path_buf(), sink.clone())
            .with_launcher(Launcher::new("gradlew"))
            .with_flags(vec!["-Pdry=true".into()]);

        assert_eq!(runner.run(&WorkItem::new("02", 1)).unwrap(), 3);
        let captured = sink.read().unwrap();
        assert!(captured.contains("args: --console=plain -Pdry=true mux.02"));
        assert!(captured.contains("Error: from stderr"));
    }
}
