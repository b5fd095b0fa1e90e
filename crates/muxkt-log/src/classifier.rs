use crate::catalog::{EXTRACTION_RULES, ExtractionRule, TASK_SHAPE, TRACK_DETAIL};
use crate::failures::scan_failures;
use crate::ir::{
    CapturedOutput, Category, ChapterRecord, ClassifiedRecord, FontRecord, PlainLine, RunOutcome,
    Section, TaskRecord, TaskStatus, TrackRecord,
};
use crate::warnings::WarningGrouper;
use std::collections::{BTreeSet, HashMap};

/// Turns one capture into structured records.
///
/// The exit code alone decides the path: zero runs the extraction rules and
/// the warning grouper, anything else runs the failure scanner and the
/// warning grouper.
pub fn classify(item: &str, exit_code: i32, output: &CapturedOutput) -> RunOutcome {
    if exit_code == 0 {
        let (sections, warnings_seen) = extract(output);
        let warnings = if warnings_seen {
            WarningGrouper::group(output.lines())
        } else {
            Vec::new()
        };
        RunOutcome {
            item: item.to_string(),
            exit_code,
            succeeded: true,
            sections,
            warnings,
            failures: Vec::new(),
        }
    } else {
        RunOutcome {
            item: item.to_string(),
            exit_code,
            succeeded: false,
            sections: Vec::new(),
            warnings: WarningGrouper::group(output.lines()),
            failures: scan_failures(output),
        }
    }
}

/// Runs every success-path rule over the capture.
///
/// Returns the non-empty sections in catalog order and whether any warning
/// marker line was present.
pub fn extract(output: &CapturedOutput) -> (Vec<Section>, bool) {
    let mut sections = Vec::new();
    let mut warnings_seen = false;

    for rule in EXTRACTION_RULES.iter() {
        let matches = raw_matches(rule, output.as_str());
        if matches.is_empty() {
            continue;
        }
        let records = match rule.category {
            Category::Warnings => {
                warnings_seen = true;
                continue;
            }
            Category::Tasks => tasks(&matches),
            Category::Chapters => chapters(&matches),
            Category::Tracks => tracks(&matches),
            Category::Fonts => fonts(&matches),
            Category::DuplicateFonts => duplicate_fonts(&matches),
            Category::Output | Category::ActionableTasks | Category::BuildSuccessful => matches
                .iter()
                .map(|text| {
                    ClassifiedRecord::Plain(PlainLine {
                        text: text.to_string(),
                    })
                })
                .collect(),
        };
        if !records.is_empty() {
            sections.push(Section {
                category: rule.category,
                records,
            });
        }
    }

    (sections, warnings_seen)
}

fn raw_matches<'a>(rule: &ExtractionRule, text: &'a str) -> Vec<&'a str> {
    rule.pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

fn tasks(matches: &[&str]) -> Vec<ClassifiedRecord> {
    let mut records = Vec::new();
    for (i, raw) in matches.iter().enumerate() {
        let item = raw.replace(".default", "");
        let Some(caps) = TASK_SHAPE.captures(&item) else {
            log::debug!("task line without a target: {}", item);
            continue;
        };
        let status = if caps.get(3).is_some() {
            TaskStatus::UpToDate
        } else {
            TaskStatus::Executed
        };
        records.push(ClassifiedRecord::Task(TaskRecord {
            ordinal: i + 1,
            name: caps[1].to_string(),
            target: caps[2].to_string(),
            status,
        }));
    }
    records
}

/// Chapter lines come in pairs: `CHAPTERnn=<timestamp>` then `CHAPTERnnNAME=<name>`.
///
/// A trailing unpaired line is dropped.
fn chapters(matches: &[&str]) -> Vec<ClassifiedRecord> {
    if matches.len() % 2 != 0 {
        log::warn!(
            "odd number of chapter lines ({}); dropping trailing `{}`",
            matches.len(),
            matches[matches.len() - 1]
        );
    }
    matches
        .chunks_exact(2)
        .map(|pair| {
            ClassifiedRecord::Chapter(ChapterRecord {
                timestamp: value_of(pair[0]).to_string(),
                name: value_of(pair[1]).to_string(),
            })
        })
        .collect()
}

fn value_of(line: &str) -> &str {
    line.split_once('=').map_or(line, |(_, value)| value)
}

fn tracks(matches: &[&str]) -> Vec<ClassifiedRecord> {
    matches
        .iter()
        .filter_map(|line| {
            let Some(caps) = TRACK_DETAIL.captures(line) else {
                log::debug!("skipping malformed track line: {}", line);
                return None;
            };
            Some(ClassifiedRecord::Track(TrackRecord {
                kind: caps[1].to_string(),
                metadata: caps[2].to_string(),
                file: caps[3].to_string(),
            }))
        })
        .collect()
}

/// Attached fonts sorted by name; repeated attachments of a name appear once.
fn fonts(matches: &[&str]) -> Vec<ClassifiedRecord> {
    let mut fonts: Vec<FontRecord> = matches.iter().map(|p| FontRecord::from_path(p)).collect();
    fonts.sort_by(|a, b| a.name.cmp(&b.name));
    fonts.dedup_by(|a, b| a.name == b.name);
    fonts.into_iter().map(ClassifiedRecord::Font).collect()
}

/// Fonts attached more than once, each reported once, by name.
fn duplicate_fonts(matches: &[&str]) -> Vec<ClassifiedRecord> {
    let mut counts: HashMap<String, (usize, &str)> = HashMap::new();
    for path in matches {
        let font = FontRecord::from_path(path);
        counts.entry(font.name).or_insert((0, *path)).0 += 1;
    }
    let duplicates: BTreeSet<(String, &str)> = counts
        .into_iter()
        .filter(|(_, (count, _))| *count > 1)
        .map(|(name, (_, path))| (name, path))
        .collect();
    duplicates
        .into_iter()
        .map(|(name, path)| {
            ClassifiedRecord::Font(FontRecord {
                name,
                path: path.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section<'a>(sections: &'a [Section], category: Category) -> &'a [ClassifiedRecord] {
        sections
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.records.as_slice())
            .unwrap_or(&[])
    }

    fn font_names(records: &[ClassifiedRecord]) -> Vec<&str> {
        records
            .iter()
            .map(|r| match r {
                ClassifiedRecord::Font(f) => f.name.as_str(),
                other => panic!("unexpected record {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_fonts_sorted_and_duplicates() {
        let text = "Attaching fonts/Foo.ttf\nAttaching fonts/Bar.otf\nAttaching fonts/Foo.ttf\n";
        let (sections, _) = extract(&text.into());
        assert_eq!(
            font_names(section(&sections, Category::Fonts)),
            ["Bar.otf", "Foo.ttf"]
        );
        assert_eq!(
            font_names(section(&sections, Category::DuplicateFonts)),
            ["Foo.ttf"]
        );
    }

    #[test]
    fn test_no_duplicate_section_without_duplicates() {
        let text = "Attaching fonts/A.ttf\nAttaching fonts/B.ttf\n";
        let (sections, _) = extract(&text.into());
        assert!(section(&sections, Category::DuplicateFonts).is_empty());
        assert!(sections.iter().all(|s| s.category != Category::DuplicateFonts));
    }

    #[test]
    fn test_task_up_to_date() {
        let (sections, _) = extract(&"> Task :project.compile UP-TO-DATE\n".into());
        assert_eq!(
            section(&sections, Category::Tasks),
            [ClassifiedRecord::Task(TaskRecord {
                ordinal: 1,
                name: "project".into(),
                target: "compile".into(),
                status: TaskStatus::UpToDate,
            })]
        );
    }

    #[test]
    fn test_task_default_variant_and_ordinals() {
        let text = "> Task :chapters.01.default\n> Task :clean\n> Task :mux.01\n";
        let (sections, _) = extract(&text.into());
        let tasks: Vec<_> = section(&sections, Category::Tasks)
            .iter()
            .map(|r| match r {
                ClassifiedRecord::Task(t) => (t.ordinal, t.name.as_str(), t.target.as_str(), t.status),
                other => panic!("unexpected record {other:?}"),
            })
            .collect();
        assert_eq!(
            tasks,
            [
                (1, "chapters", "01", TaskStatus::Executed),
                (3, "mux", "01", TaskStatus::Executed),
            ]
        );
    }

    #[test]
    fn test_chapters_paired_and_odd_tail_dropped() {
        let text = "CHAPTER01=00:00:00.000\nCHAPTER01NAME=Prologue\nCHAPTER02=00:01:30.000\nCHAPTER02NAME=Opening\nCHAPTER03=00:03:00.000\n";
        let (sections, _) = extract(&text.into());
        assert_eq!(
            section(&sections, Category::Chapters),
            [
                ClassifiedRecord::Chapter(ChapterRecord {
                    name: "Prologue".into(),
                    timestamp: "00:00:00.000".into(),
                }),
                ClassifiedRecord::Chapter(ChapterRecord {
                    name: "Opening".into(),
                    timestamp: "00:01:30.000".into(),
                }),
            ]
        );
    }

    #[test]
    fn test_tracks_strict_rematch() {
        let text = "Track video (H.264, jpn) [01/video.mkv]\nTrack broken [nothing]\n";
        let (sections, _) = extract(&text.into());
        assert_eq!(
            section(&sections, Category::Tracks),
            [ClassifiedRecord::Track(TrackRecord {
                kind: "video".into(),
                metadata: "H.264, jpn".into(),
                file: "01/video.mkv".into(),
            })]
        );
    }

    #[test]
    fn test_passthrough_lines_verbatim() {
        let text = "Output: out/Show - 01.mkv\n5 actionable tasks: 5 executed\nBUILD SUCCESSFUL in 9s\n";
        let (sections, warnings_seen) = extract(&text.into());
        assert!(!warnings_seen);
        let categories: Vec<_> = sections.iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            [
                Category::Output,
                Category::ActionableTasks,
                Category::BuildSuccessful
            ]
        );
        assert_eq!(
            section(&sections, Category::Output),
            [ClassifiedRecord::Plain(PlainLine {
                text: "out/Show - 01.mkv".into()
            })]
        );
    }

    #[test]
    fn test_classify_success_groups_warnings() {
        let text = "Validating fonts for EP01...\nwarning: glyph missing\nBUILD SUCCESSFUL in 1s\n";
        let outcome = classify("01", 0, &text.into());
        assert!(outcome.succeeded);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.section(Category::Warnings).is_none());
    }

    #[test]
    fn test_classify_success_uppercase_context() {
        let text = "VALIDATING FONTS FOR EP01...\nwarning: x\n";
        let outcome = classify("01", 0, &text.into());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].messages[0].text, "x");
    }

    #[test]
    fn test_classify_failure_path() {
        let outcome = classify("01", 1, &"BUILD FAILED with an exception.".into());
        assert!(!outcome.succeeded);
        assert!(outcome.sections.is_empty());
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.failures.len(), 1);
    }

    #[test]
    fn test_crlf_capture() {
        let text = "> Task :mux.01\r\nBUILD SUCCESSFUL in 2s\r\n";
        let outcome = classify("01", 0, &CapturedOutput::new(text));
        let task = match &outcome.section(Category::Tasks).unwrap().records[0] {
            ClassifiedRecord::Task(t) => t.clone(),
            other => panic!("unexpected record {other:?}"),
        };
        assert_eq!(task.target, "01");
    }
}
