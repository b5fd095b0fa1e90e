use serde::{Deserialize, Serialize};
use std::fmt;

/// Captured console output of one external process run.
///
/// Line endings are normalised to `\n` on construction so that captures
/// ending in `.*` never carry a trailing carriage return.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapturedOutput {
    text: String,
}

impl CapturedOutput {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let text = if text.contains('\r') {
            text.replace("\r\n", "\n")
        } else {
            text
        };
        Self { text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> std::str::Lines<'_> {
        self.text.lines()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<&str> for CapturedOutput {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for CapturedOutput {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Extraction categories, declared in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Tasks,
    Chapters,
    Tracks,
    Fonts,
    Warnings,
    DuplicateFonts,
    Output,
    ActionableTasks,
    BuildSuccessful,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "EXECUTED")]
    Executed,
    #[serde(rename = "UP-TO-DATE")]
    UpToDate,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executed => write!(f, "EXECUTED"),
            Self::UpToDate => write!(f, "UP-TO-DATE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// 1-based position among the task matches, in order of appearance.
    pub ordinal: usize,
    pub name: String,
    pub target: String,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub name: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub kind: String,
    pub metadata: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontRecord {
    /// File name of the attachment; used for ordering and duplicate checks.
    pub name: String,
    pub path: String,
}

impl FontRecord {
    pub fn from_path(path: &str) -> Self {
        let name = path
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(path)
            .to_string();
        Self {
            name,
            path: path.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainLine {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum ClassifiedRecord {
    Task(TaskRecord),
    Chapter(ChapterRecord),
    Track(TrackRecord),
    Font(FontRecord),
    Plain(PlainLine),
}

/// All records extracted for one category, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub category: Category,
    pub records: Vec<ClassifiedRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningMessage {
    pub text: String,
    pub severe: bool,
}

impl WarningMessage {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let severe = text.contains("not found");
        Self { text, severe }
    }
}

/// Placeholder shown for a font validation pass that reported nothing.
pub const NO_ISSUES: &str = "No issues were found.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningGroup {
    pub title: String,
    pub messages: Vec<WarningMessage>,
}

impl WarningGroup {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            messages: Vec::new(),
        }
    }

    /// Messages to display; an empty group yields the synthetic placeholder.
    pub fn display_messages(&self) -> Vec<WarningMessage> {
        if self.messages.is_empty() {
            vec![WarningMessage::new(NO_ISSUES)]
        } else {
            self.messages.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureLine {
    /// Name of the failure signature that produced this line.
    pub signature: String,
    pub text: String,
}

/// Result of classifying one work item's captured output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub item: String,
    pub exit_code: i32,
    pub succeeded: bool,
    pub sections: Vec<Section>,
    pub warnings: Vec<WarningGroup>,
    pub failures: Vec<FailureLine>,
}

impl RunOutcome {
    pub fn section(&self, category: Category) -> Option<&Section> {
        self.sections.iter().find(|s| s.category == category)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
