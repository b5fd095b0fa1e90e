use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use crossterm::style::Stylize;
use muxkt_build::{CaptureSink, RunnerError};
use muxkt_core::config::OUTPUT_FILE;
use muxkt_core::episodes::{resolve_episodes, resolve_project};
use muxkt_core::{
    deps, ConfigError, ConfigStore, FzfSelector, HistoryStore, Session, SessionContext,
    SessionReport,
};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

mod config_cmd;
mod render;

use render::{JsonRenderer, TerminalRenderer};

#[derive(Parser)]
#[command(name = "muxkt")]
#[command(about = "Mux SubKt projects and summarise the Gradle output", long_about = None)]
struct Cli {
    /// Log more (-v info, -vv debug); RUST_LOG overrides this
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mux episodes of a configured project
    Mux(MuxArgs),
    /// Add, remove, list or edit projects in the config
    Config {
        #[command(subcommand)]
        action: config_cmd::ConfigCommand,
    },
}

#[derive(Args)]
struct MuxArgs {
    /// Project name from the config; picked interactively when omitted
    project: Option<String>,

    /// Episode numbers; picked interactively when omitted
    episodes: Vec<u32>,

    /// Repeat the last mux
    #[arg(short, long, conflicts_with_all = ["project", "episodes"])]
    repeat: bool,

    /// Print the raw output of the previous mux and exit
    #[arg(short, long)]
    output: bool,

    /// Extra Gradle flag (e.g. -Pkey=value); may be repeated
    #[arg(short = 'c', long = "custom-flag", allow_hyphen_values = true)]
    custom_flags: Vec<String>,

    /// Print the classified results as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Mux(args) => mux(args),
        Commands::Config { action } => config_cmd::run(action),
    }
}

fn config_dir() -> anyhow::Result<PathBuf> {
    Ok(ConfigStore::default_dir().ok_or(ConfigError::NoConfigDir)?)
}

fn mux(args: MuxArgs) -> anyhow::Result<ExitCode> {
    let sink = CaptureSink::new(config_dir()?.join(OUTPUT_FILE));
    if args.output {
        return show_output(&sink);
    }

    let missing = deps::missing_dependencies();
    if !missing.is_empty() {
        bail!("the following dependencies are missing: {}", missing.join(", "));
    }

    let mut store = ConfigStore::load()?;
    let context = if args.repeat {
        let history = store
            .last()
            .context("no history found in the configuration")?;
        SessionContext::from_history(history)
    } else {
        let selector = FzfSelector::default();
        let (name, project) = resolve_project(&store, args.project.as_deref(), &selector)?;
        let episodes = resolve_episodes(&project, &args.episodes, &selector)?;
        SessionContext {
            project: name,
            working_dir: project.path,
            episodes,
            extra_flags: args.custom_flags,
        }
    };
    log::info!(
        "muxing {} episode(s) of '{}' in {:?}",
        context.episodes.len(),
        context.project,
        context.working_dir
    );

    let session = Session::new(context, sink);
    let report = if args.json {
        run_json(&session, &mut store, std::io::stdout())?
    } else {
        session.run(&mut store, &mut TerminalRenderer::stdout())?
    };

    if !report.all_succeeded() {
        log::warn!(
            "{} of {} episode(s) failed to mux",
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Runs the session and prints its outcomes as JSON, including the items
/// that finished before an environment error aborted the session.
fn run_json<W: Write>(
    session: &Session,
    history: &mut dyn HistoryStore,
    out: W,
) -> anyhow::Result<SessionReport> {
    let mut renderer = JsonRenderer::new(out);
    let result = session.run(history, &mut renderer);
    renderer.finish()?;
    result
}

/// Prints the previous capture verbatim.
fn show_output(sink: &CaptureSink) -> anyhow::Result<ExitCode> {
    match sink.read() {
        Ok(text) => {
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Err(RunnerError::CaptureMissing(path)) => {
            eprintln!("File not found: {}", path.display());
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
