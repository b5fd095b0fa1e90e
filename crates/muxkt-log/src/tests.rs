use crate::ir::{Category, ClassifiedRecord, TaskStatus, NO_ISSUES};
use crate::{classify, present, Block, CapturedOutput};

#[test]
fn test_classify_empty_capture() {
    let outcome = classify("01", 0, &CapturedOutput::default());
    assert!(outcome.succeeded);
    assert!(outcome.sections.is_empty());
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_exit_code_selects_path() {
    let text = "> Task :mux.01\nError: broken pipe\n";
    let ok = classify("01", 0, &text.into());
    assert!(ok.failures.is_empty());
    assert!(!ok.sections.is_empty());

    let failed = classify("01", 2, &text.into());
    assert!(failed.sections.is_empty());
    assert_eq!(failed.failures.len(), 1);
    assert_eq!(failed.exit_code, 2);
}

#[test]
fn test_signal_exit_is_failure() {
    let outcome = classify("01", -1, &"".into());
    assert!(!outcome.succeeded);
    assert!(outcome.failures.is_empty());
}

#[test]
fn test_task_status_rule() {
    let text = "> Task :a.x UP-TO-DATE\n> Task :b.y\n> Task :c.z NO-SOURCE\n";
    let outcome = classify("01", 0, &text.into());
    let statuses: Vec<_> = outcome
        .section(Category::Tasks)
        .map(|s| s.records.as_slice())
        .unwrap_or(&[])
        .iter()
        .map(|r| match r {
            ClassifiedRecord::Task(t) => t.status,
            other => panic!("unexpected record {other:?}"),
        })
        .collect();
    assert_eq!(
        statuses,
        [TaskStatus::UpToDate, TaskStatus::Executed, TaskStatus::Executed]
    );
}

#[test]
fn test_scenario_context_groups() {
    let text = "Validating fonts for EP01...\nValidating fonts for EP02...\nwarning: glyph missing\nBUILD SUCCESSFUL in 1s\n";
    let outcome = classify("01", 0, &text.into());
    assert_eq!(outcome.warnings.len(), 2);

    let blocks = present(&outcome);
    let groups = blocks
        .iter()
        .find_map(|b| match b {
            Block::Warnings { groups, .. } => Some(groups),
            _ => None,
        })
        .unwrap();
    assert_eq!(groups[0].messages[0].text, NO_ISSUES);
    assert!(groups[1].messages[0].text.contains("glyph missing"));
    assert!(!groups[1].messages[0].severe);
}

#[test]
fn test_outcome_json_shape() {
    let outcome = classify("ft_01", 0, &"> Task :mux.ft_01\n".into());
    let json = outcome.to_json().unwrap();
    assert!(json.contains("\"item\": \"ft_01\""));
    assert!(json.contains("\"category\": \"tasks\""));
    assert!(json.contains("\"status\": \"EXECUTED\""));
}
