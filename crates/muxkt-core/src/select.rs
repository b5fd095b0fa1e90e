//! "Pick one or many from a list" capability.
//!
//! The session never talks to a terminal menu directly; callers hand it a
//! [`Selector`]. [`FzfSelector`] is the interactive implementation.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("'{0}' is required for interactive selection but was not found on PATH")]
    Unavailable(String),

    #[error("selection failed: {0}")]
    Io(#[from] io::Error),

    #[error("User did not select anything.")]
    NothingSelected,
}

pub trait Selector {
    /// Returns the chosen entry, or `None` when the user cancelled.
    fn pick_one(&self, prompt: &str, candidates: &[String]) -> Result<Option<String>, SelectError>;

    /// Returns the chosen entries in list order; empty when cancelled.
    fn pick_many(&self, prompt: &str, candidates: &[String]) -> Result<Vec<String>, SelectError>;
}

/// Shells out to `fzf`, which is looked up on `PATH` only when a
/// selection is actually needed.
#[derive(Debug, Clone, Default)]
pub struct FzfSelector {
    program: Option<PathBuf>,
}

impl FzfSelector {
    /// Uses a specific `fzf` binary instead of searching `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    fn program(&self) -> Result<PathBuf, SelectError> {
        match &self.program {
            Some(program) => Ok(program.clone()),
            None => which::which("fzf").map_err(|_| SelectError::Unavailable("fzf".to_string())),
        }
    }

    fn run(&self, prompt: &str, candidates: &[String], multi: bool) -> Result<Vec<String>, SelectError> {
        let mut cmd = Command::new(self.program()?);
        cmd.arg(format!("--prompt={prompt}"))
            .arg("--height=40%")
            .arg("--reverse");
        if multi {
            cmd.arg("--multi");
        }
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(candidates.join("\n").as_bytes())?;
        }
        let output = child.wait_with_output()?;

        // 1: no match, 130: aborted with Esc/Ctrl-C
        if !output.status.success() {
            log::debug!("fzf exited with {:?}", output.status.code());
            return Ok(Vec::new());
        }
        Ok(parse_selection(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Selector for FzfSelector {
    fn pick_one(&self, prompt: &str, candidates: &[String]) -> Result<Option<String>, SelectError> {
        Ok(self.run(prompt, candidates, false)?.into_iter().next())
    }

    fn pick_many(&self, prompt: &str, candidates: &[String]) -> Result<Vec<String>, SelectError> {
        self.run(prompt, candidates, true)
    }
}

fn parse_selection(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
