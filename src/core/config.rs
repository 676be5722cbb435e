use crate::core::dirs::get_config_directory;
use crate::core::error::GoverError;
use crate::core::refs::{EnumerationOptions, DEFAULT_FETCH_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineOptions {
    /// Skip per-tag and per-branch detail queries.
    pub fast_mode: bool,
    /// Never contact remotes; list local references only.
    pub skip_fetch: bool,
    pub debug: bool,
    pub git_binary: PathBuf,
    pub cache_ttl_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fast_mode: false,
            skip_fetch: false,
            debug: false,
            git_binary: PathBuf::from("git"),
            cache_ttl_secs: 300,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
        }
    }
}

impl EngineOptions {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn enumeration(&self) -> EnumerationOptions {
        EnumerationOptions {
            fast_mode: self.fast_mode,
            skip_fetch: self.skip_fetch,
            fetch_timeout: self.fetch_timeout(),
            ..EnumerationOptions::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub engine: EngineOptions,
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, GoverError> {
        Ok(get_config_directory()?.join(CONFIG_FILE_NAME))
    }

    /// Read the config at `path`, or at the default location when `None`.
    /// A missing file is created with an empty project list.
    pub fn load_or_create(path: Option<&Path>) -> Result<Self, GoverError> {
        let config_file = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if config_file.exists() {
            Self::load(&config_file)
        } else {
            log::info!("Creating default configuration at {}", config_file.display());
            let config = Self::default();
            config.save(&config_file)?;
            Ok(config)
        }
    }

    pub fn load(config_file: &Path) -> Result<Self, GoverError> {
        let content =
            std::fs::read_to_string(config_file).map_err(|source| GoverError::ConfigReadFailed {
                path: config_file.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| GoverError::ConfigParseFailed {
            path: config_file.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, config_file: &Path) -> Result<(), GoverError> {
        if let Some(dir) = config_file.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_file, content)?;
        Ok(())
    }

    pub fn enabled_projects(&self) -> Vec<Project> {
        self.projects.iter().filter(|p| p.enabled).cloned().collect()
    }

    /// Look up an enabled project by name.
    pub fn project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.enabled && p.name == name)
    }
}

fn default_true() -> bool {
    true
}
