//! Presentation blocks for a classified run.
//!
//! Blocks carry rows and columns rather than formatted text, so any
//! terminal layer can lay them out without re-parsing the capture.

use crate::catalog::header;
use crate::ir::{Category, ClassifiedRecord, RunOutcome, Section, WarningGroup};
use serde::Serialize;

/// Title of the block listing failure lines.
pub const FAILURE_TITLE: &str = "FAILURE:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Output,
    Summary,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    Table {
        category: Category,
        title: String,
        columns: Vec<String>,
        show_header: bool,
        rows: Vec<Vec<String>>,
    },
    /// One titled box per group; empty groups already carry the placeholder message.
    Warnings {
        title: String,
        groups: Vec<WarningGroup>,
    },
    Lines {
        kind: LineKind,
        title: Option<String>,
        lines: Vec<String>,
    },
}

/// Maps a run outcome to its presentation blocks.
///
/// On success the blocks follow catalog order with warnings in their own
/// slot; on failure the warnings come first, followed by the failure lines.
pub fn present(outcome: &RunOutcome) -> Vec<Block> {
    let mut blocks = Vec::new();

    if outcome.succeeded {
        let mut warnings_placed = false;
        for section in &outcome.sections {
            if !warnings_placed && section.category > Category::Warnings {
                push_warnings(&mut blocks, &outcome.warnings);
                warnings_placed = true;
            }
            if let Some(block) = section_block(section) {
                blocks.push(block);
            }
        }
        if !warnings_placed {
            push_warnings(&mut blocks, &outcome.warnings);
        }
    } else {
        push_warnings(&mut blocks, &outcome.warnings);
        if !outcome.failures.is_empty() {
            blocks.push(Block::Lines {
                kind: LineKind::Failure,
                title: Some(FAILURE_TITLE.to_string()),
                lines: outcome.failures.iter().map(|f| f.text.clone()).collect(),
            });
        }
    }

    blocks
}

fn push_warnings(blocks: &mut Vec<Block>, groups: &[WarningGroup]) {
    if let Some(block) = warnings_block(groups) {
        blocks.push(block);
    }
}

fn warnings_block(groups: &[WarningGroup]) -> Option<Block> {
    if groups.is_empty() {
        return None;
    }
    Some(Block::Warnings {
        title: header(Category::Warnings).to_string(),
        groups: groups
            .iter()
            .map(|g| WarningGroup {
                title: g.title.clone(),
                messages: g.display_messages(),
            })
            .collect(),
    })
}

fn section_block(section: &Section) -> Option<Block> {
    let title = header(section.category).to_string();
    let records = &section.records;
    let block = match section.category {
        Category::Tasks => {
            let target = records.iter().find_map(|r| match r {
                ClassifiedRecord::Task(t) => Some(t.target.as_str()),
                _ => None,
            })?;
            let rows = records
                .iter()
                .filter_map(|r| match r {
                    ClassifiedRecord::Task(t) => Some(vec![
                        t.ordinal.to_string(),
                        t.name.clone(),
                        t.status.to_string(),
                    ]),
                    _ => None,
                })
                .collect();
            Block::Table {
                category: section.category,
                title,
                columns: vec![
                    "#".to_string(),
                    format!("Task performed for {target}"),
                    "Status".to_string(),
                ],
                show_header: true,
                rows,
            }
        }
        Category::Fonts | Category::DuplicateFonts => Block::Table {
            category: section.category,
            title,
            columns: vec!["#".to_string(), "Font".to_string()],
            show_header: false,
            rows: records
                .iter()
                .filter_map(|r| match r {
                    ClassifiedRecord::Font(f) => Some(f.name.clone()),
                    _ => None,
                })
                .enumerate()
                .map(|(i, name)| vec![(i + 1).to_string(), name])
                .collect(),
        },
        Category::Tracks => Block::Table {
            category: section.category,
            title,
            columns: vec!["Track".into(), "Metadata".into(), "File".into()],
            show_header: true,
            rows: records
                .iter()
                .filter_map(|r| match r {
                    ClassifiedRecord::Track(t) => {
                        Some(vec![t.kind.clone(), t.metadata.clone(), t.file.clone()])
                    }
                    _ => None,
                })
                .collect(),
        },
        Category::Chapters => Block::Table {
            category: section.category,
            title,
            columns: vec!["Name".into(), "Timestamp".into()],
            show_header: true,
            rows: records
                .iter()
                .filter_map(|r| match r {
                    ClassifiedRecord::Chapter(c) => Some(vec![c.name.clone(), c.timestamp.clone()]),
                    _ => None,
                })
                .collect(),
        },
        Category::Output | Category::ActionableTasks | Category::BuildSuccessful => {
            let kind = if section.category == Category::Output {
                LineKind::Output
            } else {
                LineKind::Summary
            };
            Block::Lines {
                kind,
                title: (!title.is_empty()).then_some(title),
                lines: records
                    .iter()
                    .filter_map(|r| match r {
                        ClassifiedRecord::Plain(p) => Some(p.text.clone()),
                        _ => None,
                    })
                    .collect(),
            }
        }
        Category::Warnings => return None,
    };
    Some(block)
}
