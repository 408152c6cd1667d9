//! Configuration management for stratus.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, StratusError};

/// Environment variable consulted when no data file is given any other way
pub const LEGACY_DATA_FILE_ENV: &str = "BACKEND_FILENAME";

/// Command-line arguments for stratus
#[derive(Parser, Debug, Default)]
#[command(name = "stratus")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the weather observation file to serve
    #[arg(env = "STRATUS_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Host address to bind to
    #[arg(short = 'H', long, env = "STRATUS_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "STRATUS_PORT")]
    pub port: Option<u16>,

    /// Number of worker threads
    #[arg(short, long, env = "STRATUS_WORKERS")]
    pub workers: Option<usize>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "STRATUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "STRATUS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Field delimiter of the data file
    #[arg(long, env = "STRATUS_DELIMITER")]
    pub delimiter: Option<char>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads (None = number of CPU cores)
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the observation file
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Data configuration
    #[serde(default)]
    pub data: DataConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, PathBuf)> {
        Self::from_args(Args::parse())
    }

    /// Resolve configuration from already parsed arguments
    pub fn from_args(args: Args) -> Result<(Self, PathBuf)> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments and environment
        if let Some(host) = args.host {
            config.server.host = host;
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        if args.workers.is_some() {
            config.server.workers = args.workers;
        }
        if let Some(log_level) = args.log_level {
            config.log_level = log_level;
        }
        if let Some(delimiter) = args.delimiter {
            config.data.delimiter = delimiter;
        }
        if args.data_file.is_some() {
            config.data.file_path = args.data_file;
        }

        let data_path = config
            .data
            .file_path
            .clone()
            .or_else(|| std::env::var_os(LEGACY_DATA_FILE_ENV).map(PathBuf::from))
            .ok_or_else(|| StratusError::Config {
                message: format!(
                    "No data file supplied; pass it as an argument, set STRATUS_DATA_FILE or {}, or set data.file_path in the config file",
                    LEGACY_DATA_FILE_ENV
                ),
            })?;
        config.data.file_path = Some(data_path.clone());

        Ok((config, data_path))
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.server.host = other.server.host;
        self.server.port = other.server.port;
        if other.server.workers.is_some() {
            self.server.workers = other.server.workers;
        }
        if other.data.file_path.is_some() {
            self.data.file_path = other.data.file_path;
        }
        self.data.delimiter = other.data.delimiter;
        self.log_level = other.log_level;
    }

    /// Delimiter as the single byte the decoder expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.data.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| StratusError::Config {
                message: format!(
                    "Invalid delimiter: {:?}. Must be a single ASCII character",
                    self.data.delimiter
                ),
            })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(StratusError::Config {
                message: "Server host cannot be empty".to_string(),
            });
        }

        // 0 would ask the OS for an ephemeral port
        if self.server.port == 0 {
            return Err(StratusError::Config {
                message: "Server port cannot be 0".to_string(),
            });
        }

        if self.server.workers == Some(0) {
            return Err(StratusError::Config {
                message: "Worker count cannot be 0".to_string(),
            });
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(StratusError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        self.delimiter_byte()?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data: DataConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            file_path: None,
            delimiter: default_delimiter(),
        }
    }
}

// Default value functions for serde
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_delimiter() -> char {
    ','
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.data.delimiter, ',');
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_merge() {
        let mut config1 = Config::default();
        let mut config2 = Config::default();

        config2.server.port = 9000;
        config2.server.workers = Some(4);
        config2.data.delimiter = ';';

        config1.merge(config2);

        assert_eq!(config1.server.port, 9000);
        assert_eq!(config1.server.workers, Some(4));
        assert_eq!(config1.data.delimiter, ';');
    }

    #[test]
    fn test_args_override_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"server": {{"port": 4000, "workers": 2}}, "data": {{"file_path": "from_json.csv"}}, "log_level": "debug"}}"#
        )
        .unwrap();

        let args = Args {
            config: Some(file.path().to_path_buf()),
            port: Some(5000),
            ..Default::default()
        };
        let (config, path) = Config::from_args(args).unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.workers, Some(2));
        assert_eq!(config.log_level, "debug");
        assert_eq!(path, PathBuf::from("from_json.csv"));

        let args = Args {
            data_file: Some(PathBuf::from("explicit.csv")),
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let (_, path) = Config::from_args(args).unwrap();
        assert_eq!(path, PathBuf::from("explicit.csv"));
    }

    #[test]
    fn test_config_validation() {
        // Valid config should pass
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.server.host = "".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.workers = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.data.delimiter = 'é';
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.data.delimiter = '\t';
        assert_eq!(config.delimiter_byte().unwrap(), b'\t');
    }
}
