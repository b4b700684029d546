use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use finch_rewards::RewardConfig;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "FINCH_CONFIG";
pub const BIND_ADDR_ENV: &str = "FINCH_BIND_ADDR";
const DEFAULT_CONFIG_PATH: &str = "finch.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid reward settings: {0}")]
    Rewards(#[from] finch_rewards::ConfigError),
    #[error("Invalid rules file: {0}")]
    Rules(#[from] finch_rules::RuleError),
    #[error("Invalid bind address '{0}'")]
    BindAddr(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// TOML file of `[[rules]]` loaded at startup.
    pub rules_file: Option<PathBuf>,
    pub max_body_bytes: usize,
    pub rewards: RewardConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            rules_file: None,
            max_body_bytes: 64 * 1024,
            rewards: RewardConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig =
            toml::from_str(toml_content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.rewards.validate()?;
        Ok(config)
    }

    /// A missing file means defaults; an unreadable or malformed one is an error.
    /// A relative `rules_file` is taken relative to the config file's directory.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let mut config = Self::from_toml(&content)?;
                if let Some(dir) = path.parent() {
                    config.rules_file = config
                        .rules_file
                        .take()
                        .map(|rules| if rules.is_relative() { dir.join(rules) } else { rules });
                }
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io { path: path.to_path_buf(), source }),
        }
    }

    /// Reads the file named by `FINCH_CONFIG`, then applies `FINCH_BIND_ADDR`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = Self::load_from(&path)?;
        if let Ok(addr) = std::env::var(BIND_ADDR_ENV) {
            config.bind_addr = addr.parse().map_err(|_| ConfigError::BindAddr(addr))?;
        }
        Ok(config)
    }

    pub fn read_rules(&self) -> Result<finch_rules::RuleSet, ConfigError> {
        let Some(path) = &self.rules_file else {
            return Ok(finch_rules::RuleSet::new());
        };
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.clone(), source })?;
        Ok(finch_rules::RuleSet::from_toml(&content)?)
    }
}
