use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use codelore_protocol::Endpoint;

pub const ENV_API_URL: &str = "CODELORE_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "CODELORE_TIMEOUT_SECS";
pub const ENV_MMDC: &str = "CODELORE_MMDC";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub mermaid_cli: PathBuf,
    pub render_timeout: Duration,
}

/// On-disk form of [`ClientConfig`]; every key is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub mermaid_cli: Option<PathBuf>,
    pub render_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(120),
            mermaid_cli: PathBuf::from("mmdc"),
            render_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Defaults, then the optional file, then the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = file {
            config.apply_file(path)?;
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = parse_config_file(path, &raw)?;
        self.apply(parsed)
    }

    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS.to_string(),
                    value: raw.clone(),
                }
            })?),
            None => None,
        };
        self.apply(ConfigFile {
            base_url: lookup(ENV_API_URL),
            timeout_secs,
            mermaid_cli: lookup(ENV_MMDC).map(PathBuf::from),
            render_timeout_secs: None,
        })
    }

    fn apply(&mut self, layer: ConfigFile) -> Result<(), ConfigError> {
        if let Some(url) = layer.base_url {
            self.set_base_url(&url)?;
        }
        if let Some(secs) = layer.timeout_secs {
            self.timeout = positive_secs("timeout_secs", secs)?;
        }
        if let Some(program) = layer.mermaid_cli {
            self.mermaid_cli = program;
        }
        if let Some(secs) = layer.render_timeout_secs {
            self.render_timeout = positive_secs("render_timeout_secs", secs)?;
        }
        Ok(())
    }

    pub fn set_base_url(&mut self, url: &str) -> Result<(), ConfigError> {
        let trimmed = url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "base_url".to_string(),
                value: url.to_string(),
            });
        }
        self.base_url = trimmed.to_string();
        Ok(())
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint.path())
    }
}

fn positive_secs(key: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: secs.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn parse_config_file(path: &Path, raw: &str) -> Result<ConfigFile, ConfigError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        serde_json::from_str(raw).map_err(|err| err.to_string())
    } else {
        toml::from_str(raw).map_err(|err| err.to_string())
    };
    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}
