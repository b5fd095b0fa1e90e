use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What the last session ran, so it can be repeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub project: String,
    pub path: PathBuf,
    /// Work item identifiers in the order they were run.
    pub episodes: Vec<String>,
    #[serde(default)]
    pub custom_flags: Vec<String>,
}

/// Run-history persistence, injected into a session.
pub trait HistoryStore {
    /// Replaces the stored history with `history`.
    fn record(&mut self, history: History) -> anyhow::Result<()>;

    fn last(&self) -> Option<History>;
}

/// Keeps history in memory only.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entry: Option<History>,
}

impl HistoryStore for MemoryHistory {
    fn record(&mut self, history: History) -> anyhow::Result<()> {
        self.entry = Some(history);
        Ok(())
    }

    fn last(&self) -> Option<History> {
        self.entry.clone()
    }
}
