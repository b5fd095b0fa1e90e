use anyhow::{bail, Context};
use clap::Subcommand;
use crossterm::style::Stylize;
use muxkt_core::{ConfigStore, FolderStructure, FzfSelector, ProjectConfig, SelectError, Selector};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, ExitCode};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Register a SubKt project
    Add {
        /// Project name (no spaces)
        name: String,
        /// Directory containing build.gradle.kts
        path: PathBuf,
        /// Episodes are nested inside numbered arc/season folders
        #[arg(long)]
        alternate: bool,
        /// Arc key override as FOLDER=ARC, e.g. fairytail=ft
        #[arg(
            short = 'e',
            long = "exception",
            value_parser = parse_exception,
            requires = "alternate"
        )]
        exceptions: Vec<(String, String)>,
    },
    /// Remove a project; picked interactively when no name is given
    Remove { name: Option<String> },
    /// Show registered projects and the last mux
    List,
    /// Open the config file in $VISUAL or $EDITOR
    Edit,
    /// Print the location of the config file
    Path,
}

pub fn run(action: ConfigCommand) -> anyhow::Result<ExitCode> {
    let mut store = ConfigStore::load()?;
    match action {
        ConfigCommand::Add {
            name,
            path,
            alternate,
            exceptions,
        } => {
            let path = fs::canonicalize(&path)
                .with_context(|| format!("the path '{}' does not exist", path.display()))?;
            let mut project = ProjectConfig::new(path);
            if alternate {
                project = project.alternate(exceptions.into_iter().collect::<BTreeMap<_, _>>());
            }
            store.add_project(&name, project)?;
            store.save()?;
            println!("{} {}", "Added a new project".green(), name.bold());
        }
        ConfigCommand::Remove { name } => {
            let name = match name {
                Some(name) => name,
                None => {
                    let names = store.project_names();
                    if names.is_empty() {
                        bail!("no projects exist in the configuration");
                    }
                    FzfSelector::default()
                        .pick_one("Select project to remove: ", &names)?
                        .ok_or(SelectError::NothingSelected)?
                }
            };
            store.remove_project(&name)?;
            store.save()?;
            println!("{} {}", "Removed project".green(), name.bold());
        }
        ConfigCommand::List => list(&store),
        ConfigCommand::Edit => edit(&store)?,
        ConfigCommand::Path => println!("{}", store.path().display()),
    }
    Ok(ExitCode::SUCCESS)
}

fn list(store: &ConfigStore) {
    let config = store.config();
    if config.projects.is_empty() {
        println!("No projects found. Run 'muxkt config add' to add projects.");
    }
    for (name, project) in &config.projects {
        let structure = match project.folder_structure {
            FolderStructure::Normal => "normal",
            FolderStructure::Alternate => "alternate",
        };
        println!(
            "{}  {}  ({})",
            name.as_str().bold(),
            project.path.display(),
            structure
        );
        for (arc, value) in &project.exceptions {
            println!("    {arc} -> {value}");
        }
    }
    if let Some(history) = &config.history {
        println!();
        println!(
            "{} {} [{}]",
            "Last mux:".cyan(),
            history.project,
            history.episodes.join(", ")
        );
        if !history.custom_flags.is_empty() {
            println!("  flags: {}", history.custom_flags.join(" "));
        }
    }
}

fn edit(store: &ConfigStore) -> anyhow::Result<()> {
    if !store.exists() {
        store.save()?;
    }
    let command = editor_command(std::env::var("VISUAL").ok(), std::env::var("EDITOR").ok());
    let (program, args) = command
        .split_first()
        .context("editor could not be found")?;
    log::info!("opening {:?} with {}", store.path(), program);
    let status = Command::new(program)
        .args(args)
        .arg(store.path())
        .status()
        .with_context(|| format!("editor '{program}' could not be started"))?;
    if !status.success() {
        bail!("editor '{}' exited with {}", program, status);
    }
    // Surface mistakes made while editing right away.
    ConfigStore::load_from(store.path())?;
    Ok(())
}

/// `$VISUAL`, then `$EDITOR`, then the platform default; split on
/// whitespace so values like `code --wait` work.
fn editor_command(visual: Option<String>, editor: Option<String>) -> Vec<String> {
    visual
        .into_iter()
        .chain(editor)
        .find(|e| !e.trim().is_empty())
        .map(|e| e.split_whitespace().map(String::from).collect())
        .unwrap_or_else(|| {
            let fallback = if cfg!(windows) { "notepad" } else { "vi" };
            vec![fallback.to_string()]
        })
}

/// Parses `FOLDER=ARC`; the folder part is normalised the way arc keys are.
fn parse_exception(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FOLDER=ARC, got '{raw}'"))?;
    let key: String = key.chars().filter(|c| *c != ' ').collect::<String>().to_lowercase();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return Err(format!("neither side of '{raw}' may be blank"));
    }
    Ok((key, value.to_string()))
}
