use crate::error::{AppError, ConfigError, Result};
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

fn default_bind() -> String {
    "127.0.0.1:8080".into()
}

fn default_workers() -> usize {
    4
}

fn default_database_path() -> PathBuf {
    PathBuf::from("railyard.sqlite")
}

fn default_seed_dir() -> Option<PathBuf> {
    Some(PathBuf::from("data"))
}

fn default_max_upload_size() -> usize {
    50 * 1024 * 1024
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    #[serde(default = "default_bind")]
    pub(crate) bind: String,
    #[serde(default = "default_workers")]
    pub(crate) workers: usize,

    /// Snapshot file. Created on first write if missing.
    #[serde(default = "default_database_path")]
    pub(crate) database_path: PathBuf,
    /// Directory holding the reference-data seed files.
    #[serde(default = "default_seed_dir")]
    pub(crate) seed_dir: Option<PathBuf>,

    /// Upper bound for streamed request bodies, in bytes.
    #[serde(default = "default_max_upload_size")]
    pub(crate) max_upload_size: usize,

    /// Program and leading arguments of the text recognizer. Image paths
    /// are appended. Unset means uploads answer 503.
    #[serde(default)]
    pub(crate) ocr_command: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            workers: default_workers(),
            database_path: default_database_path(),
            seed_dir: default_seed_dir(),
            max_upload_size: default_max_upload_size(),
            ocr_command: None,
        }
    }
}

impl Config {
    pub(crate) fn load(settings_file: &Path) -> Result<Config> {
        let contents = read_to_string(settings_file).map_err(|e| ConfigError::ReadFile {
            path: settings_file.display().to_string(),
            source: e,
        })?;
        toml::from_str(&contents).map_err(|e| AppError::from(ConfigError::from(e)))
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| -> Result<()> {
            Err(ConfigError::Invalid {
                reason: reason.to_string(),
            }
            .into())
        };
        if self.workers == 0 {
            return invalid("workers must be greater than 0");
        }
        if self.max_upload_size == 0 {
            return invalid("max_upload_size must be greater than 0");
        }
        if self.ocr_command.as_ref().is_some_and(|c| c.is_empty()) {
            return invalid("ocr_command must name a program");
        }
        Ok(())
    }
}

pub(crate) fn load() -> Result<Config> {
    let mut settings = match std::env::var("CONFIG_FILE") {
        Err(_) => {
            if Path::new("settings.toml").exists() {
                Config::load(Path::new("settings.toml"))?
            } else {
                Config::default()
            }
        }
        Ok(settings_file) => Config::load(Path::new(&settings_file))?,
    };

    if let Some(database_path) = std::env::var_os("DATABASE_PATH") {
        settings.database_path = PathBuf::from(database_path);
    }

    settings.validate()?;
    Ok(settings)
}
