//! Configuration management for sealkit
//!
//! Holds the defaults the CLI applies when a flag is not given: container
//! framing, key size, text encoding and output format.

use crate::crypto::{Encoding, Framing, KeySize, SUPPORTED_NONCE_LENGTHS, SUPPORTED_TAG_LENGTHS};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How sealed containers are written to files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Raw `nonce || ciphertext || tag` bytes
    #[default]
    Raw,
    /// Combined bytes as text in the configured encoding
    Encoded,
    /// JSON envelope carrying the framing
    Envelope,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Raw => f.write_str("raw"),
            OutputFormat::Encoded => f.write_str("encoded"),
            OutputFormat::Envelope => f.write_str("envelope"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(OutputFormat::Raw),
            "encoded" => Ok(OutputFormat::Encoded),
            "envelope" => Ok(OutputFormat::Envelope),
            other => Err(Error::InvalidConfig(format!("unknown output format: {}", other))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Container framing used when none is given
    #[serde(default)]
    pub framing: Framing,

    /// Key size for `keygen`
    #[serde(default)]
    pub key_size: KeySize,

    /// Text encoding for encoded output
    #[serde(default)]
    pub encoding: Encoding,

    /// Output format for `encrypt`
    #[serde(default)]
    pub output: OutputFormat,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Default configuration file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sealkit")
            .join("config.yaml")
    }

    /// Load configuration from a file (YAML or JSON), with environment variable substitution
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        // Perform environment variable substitution
        let content = Self::substitute_env_vars(&content)?;

        let mut config: Config = if Self::is_yaml(path_ref) {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse YAML config: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse JSON config: {}", e)))?
        };

        // Override with environment variables if set
        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise start from defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            let mut config = Config::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("SEALKIT_NONCE_LENGTH") {
            if let Ok(length) = value.trim().parse::<usize>() {
                self.framing.nonce_length = length;
            }
        }

        if let Ok(value) = std::env::var("SEALKIT_TAG_LENGTH") {
            if let Ok(length) = value.trim().parse::<usize>() {
                self.framing.tag_length = length;
            }
        }

        if let Ok(value) = std::env::var("SEALKIT_KEY_SIZE") {
            if let Ok(Ok(size)) = value.trim().parse::<u32>().map(KeySize::from_bits) {
                self.key_size = size;
            }
        }

        if let Ok(value) = std::env::var("SEALKIT_LOG_LEVEL") {
            let level = value.trim().to_string();
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Substitute environment variables in config content
    /// Supports ${VAR_NAME} syntax
    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns
        let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| Error::Internal(e.to_string()))?;

        for cap in re.captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];

            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(full_match, &value);
            }
        }

        Ok(result)
    }

    fn is_yaml(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        )
    }

    /// Save configuration to a file (format determined by extension)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        let content = if Self::is_yaml(path_ref) {
            serde_yaml::to_string(self)
                .map_err(|e| Error::Config(format!("Failed to serialize config to YAML: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| Error::Config(format!("Failed to serialize config to JSON: {}", e)))?
        };

        std::fs::write(path_ref, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_NONCE_LENGTHS.contains(&self.framing.nonce_length) {
            return Err(Error::InvalidConfig(format!(
                "Nonce length must be within {:?} bytes, got {}",
                SUPPORTED_NONCE_LENGTHS, self.framing.nonce_length
            )));
        }

        if !SUPPORTED_TAG_LENGTHS.contains(&self.framing.tag_length) {
            return Err(Error::InvalidConfig(format!(
                "Tag length must be one of {:?} bytes, got {}",
                SUPPORTED_TAG_LENGTHS, self.framing.tag_length
            )));
        }

        if !matches!(
            self.logging.level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(Error::InvalidConfig(format!(
                "Unknown log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }
}
