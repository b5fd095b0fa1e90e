use crate::ir::Category;
use once_cell::sync::Lazy;
use regex::Regex;

/// A success-path extraction rule. Each pattern has exactly one capture group.
#[derive(Debug)]
pub struct ExtractionRule {
    pub category: Category,
    pub header: &'static str,
    pub pattern: Regex,
}

/// A known fatal-error phrasing emitted by the build tool.
#[derive(Debug)]
pub struct FailureSignature {
    pub name: &'static str,
    pub pattern: Regex,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern `{pattern}`: {e}"))
}

const FONT_ATTACHMENT: &str = r"Attaching (.*(?i:otf|ttf))";

const RULES: &[(Category, &str, &str)] = &[
    // Tasks starting with `S` are SubKt's internal setup/sync tasks.
    (Category::Tasks, "TASKS PERFORMED:", r"> Task :([^S].*)"),
    (Category::Chapters, "CHAPTERS GENERATED:", r"(?m)^[ \t]*(CHAPTER.*)"),
    (Category::Tracks, "TRACK LIST:", r"(Track .*\])"),
    (Category::Fonts, "FONTS ATTACHED:", FONT_ATTACHMENT),
    (
        Category::Warnings,
        "WARNINGS:",
        r"((?i:validating) fonts.*|(?i:warning): .*)",
    ),
    (
        Category::DuplicateFonts,
        "DUPLICATE FONTS ATTACHED:",
        FONT_ATTACHMENT,
    ),
    (Category::Output, "OUTPUT:", r"Output: (.*mkv)"),
    (Category::ActionableTasks, "", r"(\d+ actionable tasks:.*)"),
    (Category::BuildSuccessful, "", r"(BUILD SUCCESSFUL in .*s)"),
];

const SIGNATURES: &[(&str, &str)] = &[
    ("what_went_wrong", r"(What went wrong.*)"),
    ("problem_occurred", r"(A problem occurred.*)"),
    ("execution_failed", r"(Execution failed for task.*)"),
    ("error_resolving", r"(Error resolving.*)"),
    ("not_in_root_project", r"(.*not found in root project.*)"),
    ("style_exists", r"(style already exists.*)"),
    ("fatal_font_issues", r"(one or more fatal font-related issues encountered.*)"),
    ("file_not_found", r"(FileNotFoundException.*)"),
    ("mkvmerge_identify_failed", r"(mkvmerge -J command failed.*)"),
    ("mkvmerge_identify_timeout", r"(mkvmerge -J command timed out for file.*)"),
    ("malformed_property", r"(malformed property.*)"),
    ("mkvmerge_failed", r"(mkvmerge failed:.*)"),
    ("error", r"(Error: .*)"),
    ("failure", r"(FAILURE: .*)"),
    ("ambiguous_task", r"(is ambiguous in root project.*)"),
    ("missing_sync_line", r"(could not find target sync line.*)"),
    ("missing_property_file", r"(could not find property file.*)"),
    ("create_task", r"(Could not create task.*)"),
    ("no_chapters", r"(no chapter definitions found;.*)"),
    ("negative_shift", r"(Negative time after shifting line from.*)"),
    ("unresolved", r"(Could not resolve.*)"),
    ("list_versions", r"(Could not list available versions.*)"),
    ("duplicate_sync_lines", r"(duplicate target sync lines with value.*)"),
    ("webhook", r"(could not post to webhook:.*)"),
    ("unexpected_crc", r"(Unexpected CRC for.*)"),
    ("invalid_crc", r"(not a valid CRC:.*)"),
    ("malformed_line", r"(malformed line in.*)"),
    ("recursive_property", r"(Recursive property dependency detected:.*)"),
    ("unfinished_task", r"(Attempting to access unfinished task.*)"),
    ("missing_entry", r"(Attempted to access entry.*)"),
    (
        "torrent_root",
        r"(more than one file added, but no root set, or conflicting roots..*)",
    ),
    ("torrent_upload", r"(couldn't upload torrent:.*)"),
    ("request_failed", r"(request failed:.*)"),
    ("upload", r"(could not upload.*)"),
    ("destination_directory", r"(can't convert type to destination directory:.*)"),
    ("ssl_session", r"(Invalid SSL Session.*)"),
    ("create_directory", r"(Could not create directory:.*)"),
    ("ssh", r"(ssh command failed.*)"),
    ("string_conversion", r"(no conversion available from String to.*)"),
    ("collisions", r"(Invalid value for Collisions:.*)"),
    ("section_fields", r"(too few fields in section.*)"),
    ("parse", r"(could not parse.*)"),
    ("property_name", r"(no match for property name.*)"),
    ("invalid_time", r"(not a valid time:.*)"),
    ("invalid_color", r"(not a valid color:.*)"),
    ("invalid_boolean", r"(not a valid boolean:.*)"),
    ("build_failed", r"(BUILD FAILED.*)"),
];

/// Success-path rules, in presentation order.
pub static EXTRACTION_RULES: Lazy<Vec<ExtractionRule>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|&(category, header, pattern)| ExtractionRule {
            category,
            header,
            pattern: compile(pattern),
        })
        .collect()
});

/// Failure signatures, in emission order.
pub static FAILURE_SIGNATURES: Lazy<Vec<FailureSignature>> = Lazy::new(|| {
    SIGNATURES
        .iter()
        .map(|&(name, pattern)| FailureSignature {
            name,
            pattern: compile(pattern),
        })
        .collect()
});

/// `<name>.<target>[ UP-TO-DATE]`, applied after `.default` is stripped.
pub(crate) static TASK_SHAPE: Lazy<Regex> =
    Lazy::new(|| compile(r"^([^.]+)\.(\S+)( UP-TO-DATE)?"));

/// Strict form of a track line: `Track <kind> (<metadata>) [<file>]`.
pub(crate) static TRACK_DETAIL: Lazy<Regex> =
    Lazy::new(|| compile(r"Track (\w+) \((.*?)\) \[(.*?)\]$"));

/// Opens a warning group in the line-by-line scan.
pub(crate) static WARNING_CONTEXT: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i:validating) fonts for.*"));

/// A warning message; the capture is the text after the last marker on the line.
pub(crate) static WARNING_MESSAGE: Lazy<Regex> =
    Lazy::new(|| compile(r"^.*(?i:warning): (.*)"));

/// Returns the rule for `category`.
pub fn rule(category: Category) -> Option<&'static ExtractionRule> {
    EXTRACTION_RULES.iter().find(|r| r.category == category)
}

/// Display header for `category`; empty for passthrough lines.
pub fn header(category: Category) -> &'static str {
    rule(category).map_or("", |r| r.header)
}
