use crate::history::{History, HistoryStore};
use anyhow::{bail, Context, Result};
use muxkt_build::{CaptureSink, Launcher, ProcessExecutor, Runner, WorkItem};
use muxkt_log::{classify, CapturedOutput, RunOutcome};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// Everything one mux session needs to know, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub project: String,
    pub working_dir: PathBuf,
    /// Work item identifiers, run in this order.
    pub episodes: Vec<String>,
    /// Gradle flags inserted before the task name.
    pub extra_flags: Vec<String>,
}

impl SessionContext {
    pub fn from_history(history: History) -> Self {
        Self {
            project: history.project,
            working_dir: history.path,
            episodes: history.episodes,
            extra_flags: history.custom_flags,
        }
    }

    pub fn to_history(&self) -> History {
        History {
            project: self.project.clone(),
            path: self.working_dir.clone(),
            episodes: self.episodes.clone(),
            custom_flags: self.extra_flags.clone(),
        }
    }
}

/// Consumer of classified runs.
pub trait Renderer {
    /// Called before the item's process is launched.
    fn begin(&mut self, project: &str, item: &WorkItem) -> io::Result<()>;

    fn render(&mut self, outcome: &RunOutcome) -> io::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub identifier: String,
    pub exit_code: i32,
    pub succeeded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub outcomes: Vec<ItemResult>,
}

impl SessionReport {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// Runs every episode of a [`SessionContext`] in order.
#[derive(Debug)]
pub struct Session {
    context: SessionContext,
    runner: Runner,
}

impl Session {
    pub fn new(context: SessionContext, sink: CaptureSink) -> Self {
        let runner = Runner::new(context.working_dir.clone(), sink)
            .with_flags(context.extra_flags.clone());
        Self { context, runner }
    }

    pub fn with_launcher(mut self, launcher: Launcher) -> Self {
        self.runner = self.runner.with_launcher(launcher);
        self
    }

    /// Replaces the process executor (for testing).
    pub fn with_executor(mut self, executor: Box<dyn ProcessExecutor>) -> Self {
        self.runner = self.runner.with_executor(executor);
        self
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Records the session in `history`, then runs, classifies and renders
    /// each episode in turn.
    ///
    /// A failing build does not stop the session. Problems with the
    /// environment (missing project directory, missing wrapper script,
    /// unreadable capture) abort it.
    pub fn run(
        &self,
        history: &mut dyn HistoryStore,
        renderer: &mut dyn Renderer,
    ) -> Result<SessionReport> {
        if self.context.episodes.is_empty() {
            bail!("no episodes to mux for '{}'", self.context.project);
        }
        self.runner.check_working_dir()?;

        history
            .record(self.context.to_history())
            .context("failed to record history")?;

        let mut report = SessionReport::default();
        for item in WorkItem::sequence(self.context.episodes.iter().cloned()) {
            renderer.begin(&self.context.project, &item)?;

            let code = self
                .runner
                .run(&item)
                .with_context(|| format!("could not mux episode {item}"))?;
            let text = self.runner.sink().read()?;
            let outcome = classify(&item.identifier, code, &CapturedOutput::new(text));
            log::info!(
                "{} finished with exit code {} ({} failure line(s))",
                item,
                code,
                outcome.failures.len()
            );

            renderer.render(&outcome)?;
            report.outcomes.push(ItemResult {
                identifier: item.identifier,
                exit_code: code,
                succeeded: outcome.succeeded,
            });
        }
        Ok(report)
    }
}
