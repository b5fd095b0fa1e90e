//! # muxkt Output Classifier
//!
//! Turns the console output of a SubKt `mux.<episode>` Gradle run into
//! structured records.
//!
//! ## Overview
//!
//! The build tool only speaks unstructured text. This crate applies a fixed,
//! ordered table of regular expressions to one complete capture and produces:
//!
//! - **Tasks** with their `EXECUTED` / `UP-TO-DATE` status
//! - **Chapters** paired from their `CHAPTERnn=` / `CHAPTERnnNAME=` lines
//! - **Tracks** split into kind, metadata and source file
//! - **Fonts** attached to the output, plus the names attached more than once
//! - **Warning groups** clustered under their `Validating fonts for ...` line
//! - **Failure lines** for every known fatal-error phrasing
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   exit == 0   ┌──────────────┐
//! │ CapturedOutput │ ────────────► │  classifier  │──┐
//! │                │               └──────────────┘  │  ┌──────────────┐
//! │                │ ────────────────────────────────┼─►│ WarningGroup │
//! │                │   exit != 0   ┌──────────────┐  │  └──────────────┘
//! │                │ ────────────► │   failures   │──┤
//! └────────────────┘               └──────────────┘  ▼
//!                                               RunOutcome ──present()──► Vec<Block>
//! ```
//!
//! The pattern tables live in [`catalog`] and are versioned by
//! [`CATALOG_VERSION`].
//!
//! ## Examples
//!
//! ```
//! use muxkt_log::{classify, CapturedOutput, Category};
//!
//! let capture = CapturedOutput::new("> Task :merge.01 UP-TO-DATE\nBUILD SUCCESSFUL in 3s\n");
//! let outcome = classify("01", 0, &capture);
//!
//! assert!(outcome.succeeded);
//! assert!(outcome.section(Category::Tasks).is_some());
//! ```
//!
//! Outcomes serialize to JSON:
//!
//! ```
//! use muxkt_log::{classify, CapturedOutput};
//!
//! let outcome = classify("01", 1, &CapturedOutput::new("BUILD FAILED in 1s"));
//! let json = outcome.to_json()?;
//! assert!(json.contains("build_failed"));
//! # Ok::<(), serde_json::Error>(())
//! ```

/// Extraction rules and failure signatures.
pub mod catalog;
/// Success-path extraction and post-processing.
pub mod classifier;
/// Failure-path scanning.
pub mod failures;
/// Typed record Intermediate Representation (IR).
pub mod ir;
pub mod present;
/// Line-sequential warning grouping.
pub mod warnings;

#[cfg(test)]
mod tests;

pub use classifier::classify;
pub use failures::scan_failures;
pub use ir::{
    CapturedOutput, Category, ChapterRecord, ClassifiedRecord, FailureLine, FontRecord, PlainLine,
    RunOutcome, Section, TaskRecord, TaskStatus, TrackRecord, WarningGroup, WarningMessage,
};
pub use present::{present, Block, LineKind};
pub use warnings::WarningGrouper;

/// Version of the pattern tables.
///
/// - MAJOR: a rule or signature removed, or a capture changed meaning
/// - MINOR: new rules or signatures
/// - PATCH: pattern fixes that do not change what is captured
pub const CATALOG_VERSION: &str = "1.0.0";
