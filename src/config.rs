use crate::ledger::engine::DEFAULT_BLACKLIST;

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable pointing at the configuration file.
pub const CONFIG_ENV: &str = "TRANSFER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG` when set.
    pub log_level: String,
    pub use_json: bool,
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    /// Countries cross-border transfers may not involve.
    pub blacklist: Vec<String>,
    /// Answer business rule failures with the 512-516 status codes older
    /// clients expect, instead of 4xx codes.
    pub legacy_status_codes: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LedgerConfig {
    /// CSV file the ledger is loaded from at startup.
    pub source: PathBuf,
    /// CSV file the ledger is written to after every transfer. Defaults to `source`.
    #[serde(default)]
    pub destination: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            use_json: false,
            server: ServerConfig::default(),
            ledger: LedgerConfig::default(),
            blacklist: DEFAULT_BLACKLIST.iter().map(|c| c.to_string()).collect(),
            legacy_status_codes: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("users.csv"),
            destination: None,
        }
    }
}

impl LedgerConfig {
    pub fn destination(&self) -> &Path {
        self.destination.as_deref().unwrap_or(&self.source)
    }
}

impl AppConfig {
    /// Load the configuration from `TRANSFER_CONFIG`, or from
    /// `config/default.yaml`. A missing default file means default settings;
    /// a missing file that was explicitly asked for is an error.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};

    use std::path::Path;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!("127.0.0.1:5000", config.address());
        assert_eq!(vec!["RUS", "PRK", "IRN"], config.blacklist);
        assert_eq!(Path::new("users.csv"), config.ledger.destination());
        assert!(!config.legacy_status_codes);
    }

    #[test]
    // Anything left out of the file keeps its default value.
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
log_level: debug
server:
  port: 8080
ledger:
  source: data/usersSubTask1.csv
  destination: data/users.csv
legacy_status_codes: true
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).expect("config should parse");

        assert_eq!("debug", config.log_level);
        assert_eq!("127.0.0.1:8080", config.address());
        assert_eq!(Path::new("data/usersSubTask1.csv"), config.ledger.source);
        assert_eq!(Path::new("data/users.csv"), config.ledger.destination());
        assert_eq!(AppConfig::default().blacklist, config.blacklist);
        assert!(config.legacy_status_codes);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();

        let got = AppConfig::from_file(dir.path().join("missing.yaml"));
        assert!(matches!(got, Err(ConfigError::Read { .. })), "{:?}", got);

        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "server: [not, a, map]").unwrap();
        let got = AppConfig::from_file(&path);
        assert!(matches!(got, Err(ConfigError::Parse { .. })), "{:?}", got);
    }
}
