//! Persistent configuration: registered projects and the last mux run.
//!
//! The file lives at `<config_dir>/muxkt/config.toml`:
//!
//! ```toml
//! [projects.fairytail]
//! path = "/home/me/subs/fairytail"
//! folder_structure = "alternate"
//!
//! [projects.fairytail.exceptions]
//! fairytail = "ft"
//!
//! [history]
//! project = "fairytail"
//! path = "/home/me/subs/fairytail"
//! episodes = ["ft_01", "ft_02"]
//! custom_flags = []
//! ```
//!
//! A missing file is an empty configuration. Nothing is written until
//! [`ConfigStore::save`] is called.

use crate::history::{History, HistoryStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The file a directory must contain to be accepted as a SubKt project.
pub const BUILD_SCRIPT: &str = "build.gradle.kts";

/// Name of the configuration file inside [`ConfigStore::default_dir`].
pub const CONFIG_FILE: &str = "config.toml";

/// Name of the capture file inside [`ConfigStore::default_dir`].
pub const OUTPUT_FILE: &str = "output.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the user configuration directory")]
    NoConfigDir,

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("'{0}' is not a valid project name; names must be non-empty and contain no spaces")]
    InvalidName(String),

    #[error("'{}' does not appear to be a SubKt project (no build.gradle.kts)", .0.display())]
    NotSubkt(PathBuf),

    #[error("no project named '{0}' found in the config")]
    UnknownProject(String),

    #[error("no projects found in the config; run 'muxkt config add' to add projects")]
    NoProjects,
}

/// How episode folders are laid out inside a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderStructure {
    /// Episode folders sit directly in the project root.
    #[default]
    Normal,
    /// Episodes are nested inside numbered arc/season folders.
    Alternate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub folder_structure: FolderStructure,
    /// Arc key overrides, used when a folder name does not match the arc
    /// name in `sub.properties`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exceptions: BTreeMap<String, String>,
}

impl ProjectConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            folder_structure: FolderStructure::Normal,
            exceptions: BTreeMap::new(),
        }
    }

    pub fn alternate(mut self, exceptions: BTreeMap<String, String>) -> Self {
        self.folder_structure = FolderStructure::Alternate;
        self.exceptions = exceptions;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<History>,
}

/// A [`Config`] bound to the file it was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    config: Config,
}

impl ConfigStore {
    /// `<config_dir>/muxkt`, if the platform has a config directory.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("muxkt"))
    }

    /// Loads the configuration from its default location.
    pub fn load() -> Result<Self, ConfigError> {
        let dir = Self::default_dir().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(dir.join(CONFIG_FILE))
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = match fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No config at {:?}, starting empty", path);
                Config::default()
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        log::debug!(
            "Loaded {} project(s) from {:?}",
            config.projects.len(),
            path
        );
        Ok(Self { path, config })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let wrap = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(wrap)?;
        }
        let text = toml::to_string_pretty(&self.config)?;
        fs::write(&self.path, text).map_err(wrap)?;
        log::info!("Saved config to {:?}", self.path);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registers (or replaces) a project.
    pub fn add_project(&mut self, name: &str, project: ProjectConfig) -> Result<(), ConfigError> {
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidName(name.to_string()));
        }
        if !project.path.join(BUILD_SCRIPT).is_file() {
            return Err(ConfigError::NotSubkt(project.path));
        }
        if self
            .config
            .projects
            .insert(name.to_string(), project)
            .is_some()
        {
            log::warn!("Replaced existing project '{}'", name);
        }
        Ok(())
    }

    pub fn remove_project(&mut self, name: &str) -> Result<ProjectConfig, ConfigError> {
        self.config
            .projects
            .remove(name)
            .ok_or_else(|| ConfigError::UnknownProject(name.to_string()))
    }

    pub fn project(&self, name: &str) -> Result<&ProjectConfig, ConfigError> {
        if self.config.projects.is_empty() {
            return Err(ConfigError::NoProjects);
        }
        self.config
            .projects
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProject(name.to_string()))
    }

    /// Registered project names in sorted order.
    pub fn project_names(&self) -> Vec<String> {
        self.config.projects.keys().cloned().collect()
    }
}

impl HistoryStore for ConfigStore {
    fn record(&mut self, history: History) -> anyhow::Result<()> {
        self.config.history = Some(history);
        self.save()?;
        Ok(())
    }

    fn last(&self) -> Option<History> {
        self.config.history.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subkt_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(BUILD_SCRIPT), "").unwrap();
        dir
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load_from(dir.path().join("config.toml")).unwrap();
        assert!(!store.exists());
        assert_eq!(store.config(), &Config::default());
    }

    #[test]
    fn test_round_trip_with_exceptions_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let project_dir = subkt_dir();
        let path = dir.path().join("muxkt").join("config.toml");

        let mut store = ConfigStore::load_from(&path).unwrap();
        let exceptions = BTreeMap::from([("fairytail".to_string(), "ft".to_string())]);
        store
            .add_project(
                "fairytail",
                ProjectConfig::new(project_dir.path()).alternate(exceptions),
            )
            .unwrap();
        store
            .record(History {
                project: "fairytail".into(),
                path: project_dir.path().to_path_buf(),
                episodes: vec!["ft_01".into(), "ft_02".into()],
                custom_flags: vec!["-Pdry=true".into()],
            })
            .unwrap();

        let reloaded = ConfigStore::load_from(&path).unwrap();
        assert_eq!(reloaded.config(), store.config());
        let project = reloaded.project("fairytail").unwrap();
        assert_eq!(project.folder_structure, FolderStructure::Alternate);
        assert_eq!(project.exceptions["fairytail"], "ft");
    }

    #[test]
    fn test_history_replaces_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::load_from(dir.path().join("config.toml")).unwrap();
        for episodes in [vec!["01"], vec!["02", "03"]] {
            store
                .record(History {
                    project: "show".into(),
                    path: PathBuf::from("/show"),
                    episodes: episodes.into_iter().map(String::from).collect(),
                    custom_flags: Vec::new(),
                })
                .unwrap();
        }
        let last = store.last().unwrap();
        assert_eq!(last.episodes, ["02", "03"]);

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text.matches("[history]").count(), 1);
    }

    #[test]
    fn test_rejects_names_with_spaces() {
        let project_dir = subkt_dir();
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::load_from(dir.path().join("config.toml")).unwrap();
        let err = store
            .add_project("my show", ProjectConfig::new(project_dir.path()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidName(_)));
    }

    #[test]
    fn test_rejects_non_subkt_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::load_from(dir.path().join("config.toml")).unwrap();
        let err = store
            .add_project("show", ProjectConfig::new(dir.path()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotSubkt(_)));
    }

    #[test]
    fn test_project_lookup_errors() {
        let project_dir = subkt_dir();
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::load_from(dir.path().join("config.toml")).unwrap();
        assert!(matches!(store.project("show"), Err(ConfigError::NoProjects)));

        store
            .add_project("show", ProjectConfig::new(project_dir.path()))
            .unwrap();
        assert!(matches!(
            store.project("other"),
            Err(ConfigError::UnknownProject(_))
        ));
        assert_eq!(store.project_names(), ["show"]);

        store.remove_project("show").unwrap();
        assert!(store.project_names().is_empty());
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[projects\n").unwrap();
        assert!(matches!(
            ConfigStore::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
