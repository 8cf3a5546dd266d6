//! Layered configuration for `vqs`.
//!
//! Highest priority first: `--endpoint`, `VQS_ENDPOINT`, the TOML file
//! (`--config PATH`, else `./vqs.toml` when present), built-in defaults.
//!
//! # Example
//!
//! ```toml
//! [backend]
//! endpoint = "http://localhost:8000"
//! timeout_secs = 30
//!
//! [search]
//! product = "All"
//!
//! [diff]
//! context = 3
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use vqs_client::{ClientConfig, DEFAULT_ENDPOINT};
use vqs_core::{ProductFilter, DEFAULT_CONTEXT};

/// Environment variable overriding the backend endpoint.
pub const ENDPOINT_ENV: &str = "VQS_ENDPOINT";

/// Config file read from the working directory when `--config` is absent.
pub const IMPLICIT_CONFIG: &str = "vqs.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

// ── File format ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub diff: DiffSection,
}

/// `[backend]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendSection {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// `[search]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSection {
    pub product: Option<ProductFilter>,
}

/// `[diff]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiffSection {
    pub context: Option<usize>,
}

// ── Resolved settings ─────────────────────────────────────────────────────────

/// Effective settings after every layer has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub timeout_secs: Option<u64>,
    pub product: ProductFilter,
    pub context: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::resolve(FileConfig::default(), None, None)
    }
}

impl Settings {
    /// Read the config file and environment, then apply the flag override.
    pub fn load(config_path: Option<&Path>, endpoint_flag: Option<&str>) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => read_config(path)?,
            None => {
                let implicit = Path::new(IMPLICIT_CONFIG);
                if implicit.is_file() {
                    read_config(implicit)?
                } else {
                    FileConfig::default()
                }
            }
        };
        let env_endpoint = std::env::var(ENDPOINT_ENV).ok();
        Ok(Settings::resolve(file, env_endpoint.as_deref(), endpoint_flag))
    }

    /// Merge the layers. Blank strings count as unset.
    pub fn resolve(file: FileConfig, env_endpoint: Option<&str>, endpoint_flag: Option<&str>) -> Self {
        let endpoint = [endpoint_flag, env_endpoint, file.backend.endpoint.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|e| !e.is_empty())
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string();

        Settings {
            endpoint,
            timeout_secs: file.backend.timeout_secs,
            product: file.search.product.unwrap_or_default(),
            context: file.diff.context.unwrap_or(DEFAULT_CONTEXT),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.endpoint).with_timeout_secs(self.timeout_secs)
    }
}

pub fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
