//! Turns a project name and optional episode numbers into work item
//! identifiers, asking the [`Selector`] for anything not given.

use crate::config::{ConfigError, ConfigStore, FolderStructure, ProjectConfig};
use crate::select::{SelectError, Selector};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const PROJECT_PROMPT: &str = "Select a project: ";
const ARC_PROMPT: &str = "Select an arc/season: ";
const EPISODE_PROMPT: &str = "Select single or multiple episode: ";

/// Looks up `name`, or lets the user pick among registered projects.
pub fn resolve_project(
    store: &ConfigStore,
    name: Option<&str>,
    selector: &dyn Selector,
) -> Result<(String, ProjectConfig)> {
    let names = store.project_names();
    if names.is_empty() {
        return Err(ConfigError::NoProjects.into());
    }
    let name = match name {
        Some(name) => name.to_string(),
        None => selector
            .pick_one(PROJECT_PROMPT, &names)?
            .ok_or(SelectError::NothingSelected)?,
    };
    let project = store.project(&name)?.clone();
    Ok((name, project))
}

/// Resolves the identifiers to mux for `project`.
///
/// Explicit numbers are sorted and zero-padded. For the alternate folder
/// structure each identifier is prefixed with the arc key.
pub fn resolve_episodes(
    project: &ProjectConfig,
    numbers: &[u32],
    selector: &dyn Selector,
) -> Result<Vec<String>> {
    let explicit = pad_episodes(numbers);

    match project.folder_structure {
        FolderStructure::Normal if !explicit.is_empty() => Ok(explicit),
        FolderStructure::Normal => pick_folders(&project.path, selector),
        FolderStructure::Alternate => {
            let arc = pick_folder(&project.path, ARC_PROMPT, selector)?;
            let episodes = if explicit.is_empty() {
                pick_folders(&project.path.join(&arc), selector)?
            } else {
                explicit
            };
            let key = arc_key(&arc, &project.exceptions);
            log::debug!("arc folder '{}' maps to '{}'", arc, key);
            Ok(episodes
                .into_iter()
                .map(|ep| format!("{key}_{ep}"))
                .collect())
        }
    }
}

/// `[3, 1]` becomes `["01", "03"]`.
pub fn pad_episodes(numbers: &[u32]) -> Vec<String> {
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();
    sorted.into_iter().map(|n| format!("{n:02}")).collect()
}

/// Arc key for an arc folder name: the first three characters (the
/// numbering, e.g. `"01 "`) are dropped, spaces removed and the rest
/// lowercased, then mapped through the project's exceptions.
pub fn arc_key(folder: &str, exceptions: &BTreeMap<String, String>) -> String {
    let key: String = folder
        .chars()
        .skip(3)
        .filter(|c| *c != ' ')
        .collect::<String>()
        .to_lowercase();
    exceptions.get(&key).cloned().unwrap_or(key)
}

/// Subdirectories of `dir` whose name starts with a digit, sorted.
pub fn numbered_folders(dir: &Path) -> Result<Vec<String>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("could not list '{}'", dir.display()))?;
    let mut folders = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            folders.push(name);
        }
    }
    folders.sort();
    Ok(folders)
}

fn pick_folder(dir: &Path, prompt: &str, selector: &dyn Selector) -> Result<String> {
    let folders = numbered_folders(dir)?;
    Ok(selector
        .pick_one(prompt, &folders)?
        .ok_or(SelectError::NothingSelected)?)
}

fn pick_folders(dir: &Path, selector: &dyn Selector) -> Result<Vec<String>> {
    let folders = numbered_folders(dir)?;
    let picked = selector.pick_many(EPISODE_PROMPT, &folders)?;
    if picked.is_empty() {
        return Err(SelectError::NothingSelected.into());
    }
    Ok(picked)
}
