use std::{
    fs, io,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use serde::Deserialize;
use shared::domain::{RequestConfig, DEFAULT_API_KEY, DEFAULT_ENDPOINT};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "viewer.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    endpoint: Option<String>,
    api_key: Option<String>,
    output: Option<OutputFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub api_key: String,
    pub output: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            api_key: DEFAULT_API_KEY.into(),
            output: OutputFormat::Text,
        }
    }
}

impl Settings {
    pub fn request_config(&self) -> RequestConfig {
        RequestConfig::new(self.endpoint.clone(), self.api_key.clone())
    }

    fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.endpoint {
            self.endpoint = v;
        }
        if let Some(v) = file_cfg.api_key {
            self.api_key = v;
        }
        if let Some(v) = file_cfg.output {
            self.output = v;
        }
    }

    /// Environment overrides. `APP__*` names win over the `APOD_*` names.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for name in ["APOD_ENDPOINT", "APP__ENDPOINT"] {
            if let Some(v) = lookup(name) {
                self.endpoint = v;
            }
        }
        for name in ["APOD_API_KEY", "APP__API_KEY"] {
            if let Some(v) = lookup(name) {
                self.api_key = v;
            }
        }
        for name in ["APOD_OUTPUT", "APP__OUTPUT"] {
            if let Some(v) = lookup(name) {
                match OutputFormat::parse(&v) {
                    Some(output) => self.output = output,
                    None => warn!(variable = name, value = %v, "ignoring unknown output format"),
                }
            }
        }
    }
}

/// Defaults, then the config file, then the environment.
///
/// An explicitly requested file must exist and parse. The implicit
/// `viewer.toml` is optional and skipped with a warning when invalid.
pub fn load_settings(explicit_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    match explicit_path {
        Some(path) => settings.apply_file(read_file_settings(path)?),
        None => match read_file_settings(Path::new(DEFAULT_CONFIG_FILE)) {
            Ok(file_cfg) => settings.apply_file(file_cfg),
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(error = %err, "ignoring default config file"),
        },
    }

    settings.apply_env(|name| std::env::var(name).ok());
    Ok(settings)
}

fn read_file_settings(path: &Path) -> Result<FileSettings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
