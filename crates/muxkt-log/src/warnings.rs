use crate::catalog::{WARNING_CONTEXT, WARNING_MESSAGE};
use crate::ir::{WarningGroup, WarningMessage};

/// Clusters `warning:` lines under the `Validating fonts for ...` line that
/// introduced them.
///
/// Grouping depends on line order, so this is a sequential scan rather than
/// a whole-text regex pass. A warning seen before any context line cannot be
/// attributed to a subtitle file and is dropped.
#[derive(Debug, Default)]
pub struct WarningGrouper {
    groups: Vec<WarningGroup>,
    current: Option<WarningGroup>,
}

impl WarningGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one line of captured output.
    pub fn feed_line(&mut self, line: &str) {
        if WARNING_CONTEXT.is_match(line) {
            if let Some(done) = self.current.take() {
                self.groups.push(done);
            }
            self.current = Some(WarningGroup::new(context_title(line)));
        } else if let Some(caps) = WARNING_MESSAGE.captures(line) {
            let text = caps.get(1).map_or("", |m| m.as_str()).trim();
            match self.current.as_mut() {
                Some(group) => group.messages.push(WarningMessage::new(text)),
                None => log::debug!("dropping unattributed warning: {}", text),
            }
        }
    }

    /// Closes any open group and returns all groups in the order they were opened.
    pub fn finish(mut self) -> Vec<WarningGroup> {
        if let Some(done) = self.current.take() {
            self.groups.push(done);
        }
        self.groups
    }

    /// Groups the warnings of a complete capture.
    pub fn group<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<WarningGroup> {
        let mut grouper = Self::new();
        for line in lines {
            grouper.feed_line(line);
        }
        grouper.finish()
    }
}

/// Trimmed context line without its trailing `...`.
fn context_title(line: &str) -> String {
    let trimmed = line.trim();
    let keep = trimmed.chars().count().saturating_sub(3);
    trimmed.chars().take(keep).collect()
}
