use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::assets::{self, AssetError};
use crate::tokens::{BorderDefaults, FontFaceConfig, ThemeFilter};

const BUILTIN_CONFIG: &str = "config/workshop.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config in {origin}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Asset(#[from] AssetError),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct WorkshopConfig {
    pub tokens: TokenBuildConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TokenBuildConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default = "default_wrapper")]
    pub wrapper: String,
    #[serde(default = "default_fraction_digits")]
    pub math_fraction_digits: u32,
    pub themes: ThemeFilter,
    #[serde(default)]
    pub border_defaults: BorderDefaults,
    pub fonts: FontFaceConfig,
}

fn default_wrapper() -> String {
    "tds".to_string()
}

fn default_fraction_digits() -> u32 {
    3
}

impl WorkshopConfig {
    pub fn builtin() -> Result<Self, ConfigError> {
        let text = assets::required_text(BUILTIN_CONFIG)?;
        Self::from_toml_str(&text, BUILTIN_CONFIG)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Loads `path` when given, the embedded defaults otherwise.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })
    }
}
