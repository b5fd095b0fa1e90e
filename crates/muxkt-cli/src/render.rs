use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::queue;
use muxkt_build::WorkItem;
use muxkt_core::Renderer;
use muxkt_log::{present, Block, LineKind, RunOutcome, WarningGroup};
use std::io::{self, IsTerminal, Stdout, Write};

const DEFAULT_WIDTH: usize = 80;

/// Writes presentation blocks as aligned, colored text.
pub struct TerminalRenderer<W: Write> {
    out: W,
    color: bool,
    width: usize,
}

impl TerminalRenderer<Stdout> {
    pub fn stdout() -> Self {
        let out = io::stdout();
        let color = out.is_terminal();
        let width = crossterm::terminal::size()
            .map(|(w, _)| usize::from(w))
            .unwrap_or(DEFAULT_WIDTH);
        Self { out, color, width }
    }
}

impl<W: Write> TerminalRenderer<W> {
    /// No escape sequences; used for pipes and tests.
    pub fn plain(out: W) -> Self {
        Self {
            out,
            color: false,
            width: DEFAULT_WIDTH,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn styled(&mut self, text: &str, color: Color, bold: bool) -> io::Result<()> {
        if !self.color {
            return writeln!(self.out, "{text}");
        }
        queue!(self.out, SetForegroundColor(color))?;
        if bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        queue!(
            self.out,
            Print(text),
            SetAttribute(Attribute::Reset),
            ResetColor,
            Print("\n")
        )
    }

    fn heading(&mut self, title: &str) -> io::Result<()> {
        self.styled(title, Color::Green, true)
    }

    fn block(&mut self, block: &Block) -> io::Result<()> {
        match block {
            Block::Table {
                title,
                columns,
                show_header,
                rows,
                ..
            } => {
                self.heading(title)?;
                let widths = column_widths(columns, *show_header, rows);
                if *show_header {
                    self.styled(&pad_row(columns, &widths), Color::Cyan, true)?;
                }
                for row in rows {
                    writeln!(self.out, "{}", pad_row(row, &widths))?;
                }
            }
            Block::Warnings { title, groups } => {
                self.heading(title)?;
                self.warning_groups(groups)?;
            }
            Block::Lines { kind, title, lines } => {
                let color = match kind {
                    LineKind::Failure => Color::Red,
                    LineKind::Output | LineKind::Summary => Color::Green,
                };
                if let Some(title) = title {
                    self.styled(title, color, true)?;
                }
                for line in lines {
                    if *kind == LineKind::Failure {
                        self.styled(line, Color::Red, false)?;
                    } else {
                        writeln!(self.out, "{line}")?;
                    }
                }
            }
        }
        writeln!(self.out)
    }

    fn warning_groups(&mut self, groups: &[WarningGroup]) -> io::Result<()> {
        for group in groups {
            self.warning_box(group)?;
        }
        Ok(())
    }

    /// Draws one group as a box with its context line in the top border.
    fn warning_box(&mut self, group: &WarningGroup) -> io::Result<()> {
        let messages = group.display_messages();
        let title_len = group.title.chars().count();
        let inner = messages
            .iter()
            .map(|m| m.text.chars().count() + 2)
            .fold(title_len + 4, usize::max);

        let top = format!("┌─ {} {}┐", group.title, "─".repeat(inner - title_len - 3));
        self.styled(&top, Color::Blue, true)?;
        for message in &messages {
            let pad = " ".repeat(inner - 2 - message.text.chars().count());
            self.box_row(&message.text, &pad, message.severe)?;
        }
        self.styled(&format!("└{}┘", "─".repeat(inner)), Color::Blue, true)
    }

    fn box_row(&mut self, text: &str, pad: &str, severe: bool) -> io::Result<()> {
        if !self.color {
            return writeln!(self.out, "│ {text}{pad} │");
        }
        queue!(self.out, SetForegroundColor(Color::Blue), Print("│ "), ResetColor)?;
        if severe {
            queue!(
                self.out,
                SetForegroundColor(Color::Red),
                SetAttribute(Attribute::Bold)
            )?;
        }
        queue!(
            self.out,
            Print(text),
            SetAttribute(Attribute::Reset),
            ResetColor,
            Print(pad),
            SetForegroundColor(Color::Blue),
            Print(" │"),
            ResetColor,
            Print("\n")
        )
    }

    fn rule(&mut self) -> io::Result<()> {
        let line = "─".repeat(self.width);
        self.styled(&line, Color::DarkGrey, false)
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn begin(&mut self, project: &str, item: &WorkItem) -> io::Result<()> {
        self.styled(
            &format!("Muxing \"{project}\" - Episode {item}"),
            Color::Cyan,
            false,
        )?;
        self.out.flush()
    }

    fn render(&mut self, outcome: &RunOutcome) -> io::Result<()> {
        let blocks = present(outcome);
        if blocks.is_empty() && !outcome.succeeded {
            self.styled(
                &format!("Build exited with code {} and printed no diagnostics.", outcome.exit_code),
                Color::Red,
                true,
            )?;
        }
        for block in &blocks {
            self.block(block)?;
        }
        self.rule()?;
        self.out.flush()
    }
}

/// Collects every outcome and prints them as one JSON array at the end.
pub struct JsonRenderer<W: Write> {
    out: W,
    outcomes: Vec<RunOutcome>,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            outcomes: Vec::new(),
        }
    }

    pub fn finish(mut self) -> io::Result<W> {
        serde_json::to_writer_pretty(&mut self.out, &self.outcomes)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn begin(&mut self, project: &str, item: &WorkItem) -> io::Result<()> {
        log::info!("muxing {} episode {}", project, item);
        Ok(())
    }

    fn render(&mut self, outcome: &RunOutcome) -> io::Result<()> {
        self.outcomes.push(outcome.clone());
        Ok(())
    }
}

fn column_widths(columns: &[String], show_header: bool, rows: &[Vec<String>]) -> Vec<usize> {
    (0..columns.len())
        .map(|i| {
            let header = if show_header {
                columns[i].chars().count()
            } else {
                0
            };
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .fold(header, usize::max)
        })
        .collect()
}

fn pad_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}", width = *width))
        .collect();
    padded.join("  ").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use muxkt_log::{classify, CapturedOutput};

    fn render_plain(text: &str, exit_code: i32) -> String {
        let mut renderer = TerminalRenderer::plain(Vec::new());
        let outcome = classify("01", exit_code, &CapturedOutput::new(text));
        renderer.begin("show", &WorkItem::new("01", 1)).unwrap();
        renderer.render(&outcome).unwrap();
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_success_layout() {
        let text = "> Task :merge.01\n> Task :swap.01 UP-TO-DATE\nAttaching fonts/Foo.ttf\n\
                    Output: out/Show - 01.mkv\nBUILD SUCCESSFUL in 3s\n";
        let out = render_plain(text, 0);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Muxing \"show\" - Episode 01");
        assert_eq!(lines[1], "TASKS PERFORMED:");
        assert_eq!(lines[2], "#  Task performed for 01  Status");
        assert_eq!(lines[3], format!("1  {:<21}  EXECUTED", "merge"));
        assert_eq!(lines[4], format!("2  {:<21}  UP-TO-DATE", "swap"));
        assert!(out.contains("FONTS ATTACHED:\n1  Foo.ttf\n"));
        assert!(out.contains("OUTPUT:\nout/Show - 01.mkv\n"));
        assert!(out.contains("BUILD SUCCESSFUL in 3s\n"));
        assert!(!out.contains('\u{1b}'));
        assert!(lines.last().unwrap().starts_with('─'));
    }

    #[test]
    fn test_failure_layout() {
        let text = "Validating fonts for 01/ep.ass...\nwarning: font Foo not found\n\
                    warning: glyph missing\nBUILD FAILED in 1s\n";
        let out = render_plain(text, 1);
        let boxed = [
            "WARNINGS:",
            "┌─ Validating fonts for 01/ep.ass ─┐",
            "│ font Foo not found               │",
            "│ glyph missing                    │",
            "└──────────────────────────────────┘",
        ]
        .join("\n");
        assert!(out.contains(&boxed), "{out}");
        let warnings_at = out.find("WARNINGS:").unwrap();
        let failure_at = out.find("FAILURE:").unwrap();
        assert!(warnings_at < failure_at);
        assert!(out.contains("FAILURE:\nBUILD FAILED in 1s\n"));
    }

    #[test]
    fn test_empty_warning_group_box() {
        let text = "Validating fonts for EP01...\nwarning: a much longer warning message\n\
                    Validating fonts for EP02...\nBUILD FAILED in 1s\n";
        let out = render_plain(text, 1);
        let lines: Vec<&str> = out.lines().collect();
        let top = lines.iter().position(|l| l.starts_with("┌─ Validating fonts for EP01")).unwrap();
        assert_eq!(lines[top], format!("┌─ Validating fonts for EP01 {}┐", "─".repeat(3)));
        assert_eq!(lines[top + 1], "│ a much longer warning message │");
        assert_eq!(lines[top + 2], format!("└{}┘", "─".repeat(31)));
        assert!(out.contains("│ No issues were found.       │"), "{out}");
        for line in &lines[top..top + 3] {
            assert_eq!(line.chars().count(), 33);
        }
    }

    #[test]
    fn test_silent_failure_is_reported() {
        let out = render_plain("", 137);
        assert!(out.contains("exited with code 137"));
    }

    #[test]
    fn test_json_renderer_emits_array() {
        let mut renderer = JsonRenderer::new(Vec::new());
        for (id, code) in [("01", 0), ("02", 1)] {
            let outcome = classify(id, code, &CapturedOutput::new("BUILD FAILED in 1s\n"));
            renderer.render(&outcome).unwrap();
        }
        let out = renderer.finish().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["item"], "01");
        assert_eq!(items[1]["succeeded"], false);
        assert_eq!(items[1]["failures"][0]["signature"], "build_failed");
    }

    #[test]
    fn test_column_widths_ignore_hidden_header() {
        let rows = vec![vec!["1".to_string(), "A.ttf".to_string()]];
        let columns = vec!["#".to_string(), "Font".to_string()];
        assert_eq!(column_widths(&columns, false, &rows), [1, 5]);
        assert_eq!(column_widths(&columns, true, &rows), [1, 5]);
        assert_eq!(pad_row(&rows[0], &[3, 5]), "1    A.ttf");
    }
}
