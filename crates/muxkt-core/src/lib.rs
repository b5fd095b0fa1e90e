//! # muxkt Core
//!
//! Session orchestration for muxkt: configuration, run history, episode
//! resolution and the loop that drives a SubKt project's mux tasks.
//!
//! ## Overview
//!
//! [`muxkt_build`] runs one Gradle invocation and [`muxkt_log`] classifies
//! its output. This crate ties them together:
//!
//! ```text
//! ConfigStore ──► resolve_project / resolve_episodes ──► SessionContext
//!                      (Selector)                              │
//!                                                              ▼
//!        HistoryStore ◄── record ── Session::run ── for each episode:
//!                                                   Runner::run
//!                                                   classify
//!                                                   Renderer::render
//! ```
//!
//! ## Modules
//!
//! - [`config`] - The TOML configuration file (projects and history)
//! - [`history`] - The [`HistoryStore`] seam used by sessions
//! - [`episodes`] - Project and episode resolution, including the alternate
//!   (arc/season) folder structure
//! - [`select`] - The "pick from a list" capability and its `fzf` backend
//! - [`deps`] - External tool presence checks
//! - [`session`] - [`Session`], [`SessionContext`] and the [`Renderer`] seam
//!
//! All interaction with the outside world (processes, menus, history
//! storage, output) goes through traits so sessions can be tested without
//! Gradle or a terminal.
//!
//! ## Example
//!
//! ```no_run
//! use muxkt_build::CaptureSink;
//! use muxkt_core::history::MemoryHistory;
//! use muxkt_core::{Renderer, Session, SessionContext};
//! use muxkt_build::WorkItem;
//! use muxkt_log::RunOutcome;
//!
//! struct Quiet;
//!
//! impl Renderer for Quiet {
//!     fn begin(&mut self, _project: &str, _item: &WorkItem) -> std::io::Result<()> {
//!         Ok(())
//!     }
//!     fn render(&mut self, outcome: &RunOutcome) -> std::io::Result<()> {
//!         println!("{}: {}", outcome.item, outcome.succeeded);
//!         Ok(())
//!     }
//! }
//!
//! let ctx = SessionContext {
//!     project: "show".into(),
//!     working_dir: "/home/me/subs/show".into(),
//!     episodes: vec!["01".into(), "02".into()],
//!     extra_flags: Vec::new(),
//! };
//! let session = Session::new(ctx, CaptureSink::new("/tmp/output.txt".into()));
//! let report = session.run(&mut MemoryHistory::default(), &mut Quiet)?;
//! println!("{} failed", report.failed());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod deps;
pub mod episodes;
pub mod history;
pub mod select;
pub mod session;

pub use config::{ConfigError, ConfigStore, FolderStructure, ProjectConfig};
pub use history::{History, HistoryStore};
pub use select::{FzfSelector, SelectError, Selector};
pub use session::{ItemResult, Renderer, Session, SessionContext, SessionReport};
