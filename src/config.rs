//! Configuration file management for certstatus.
//!
//! This module handles loading, parsing, and merging configuration from TOML files
//! and command-line arguments. Settings can be specified in multiple places with
//! clear precedence rules.
//!
//! # Configuration Precedence
//!
//! 1. Default values (lowest priority)
//! 2. Configuration file (certstatus.toml or specified with --config)
//! 3. Command-line arguments (highest priority)
//!
//! # Example Configuration File
//!
//! ```toml
//! timeout = 10
//! max_response_bytes = 1048576
//! user_agent = "certstatus"
//! output = "text"
//! exit_code = 2
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::transport::{DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_TIMEOUT};

/// Output formats understood by the command line.
pub const OUTPUT_FORMATS: [&str; 2] = ["text", "json"];

/// Main configuration structure for certstatus.
///
/// All fields are optional to support partial configuration and merging.
/// Missing values will be filled in by defaults or overridden by CLI arguments.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// HTTP timeout in seconds for every request
    pub timeout: Option<u64>,
    /// Largest response body accepted from any endpoint
    pub max_response_bytes: Option<usize>,
    /// User-Agent header sent with every request
    pub user_agent: Option<String>,
    /// Output format: text, json
    pub output: Option<String>,
    /// Exit code to use when the certificate is reported revoked
    pub exit_code: Option<i32>,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully parsed configuration
    /// * `Err(ConfigError::Io)` - File could not be read
    /// * `Err(ConfigError::Parse)` - File contains invalid TOML
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use certstatus::config::Config;
    /// let config = Config::from_file("certstatus.toml")?;
    /// # Ok::<(), certstatus::config::ConfigError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// Creates a default configuration.
    ///
    /// # Default Values
    ///
    /// - `timeout`: 30 seconds
    /// - `max_response_bytes`: 10 MiB
    /// - `user_agent`: "certstatus/<version>"
    /// - `output`: "text"
    /// - `exit_code`: 0 (a revoked certificate is not a process failure)
    pub fn default() -> Self {
        Config {
            timeout: Some(DEFAULT_TIMEOUT),
            max_response_bytes: Some(DEFAULT_MAX_RESPONSE_BYTES),
            user_agent: Some(concat!("certstatus/", env!("CARGO_PKG_VERSION")).to_string()),
            output: Some("text".to_string()),
            exit_code: Some(0),
        }
    }

    /// Merges this configuration with another, prioritizing the other's values.
    ///
    /// For each field, if the `other` config has a value (Some), it overrides
    /// this config's value. If the `other` value is None, keeps the current value.
    ///
    /// # Example
    ///
    /// ```
    /// # use certstatus::config::Config;
    /// let defaults = Config::default();
    /// let cli = Config::from_cli_args(Some(5), None, None);
    /// let merged = defaults.merge_with(cli);
    /// assert_eq!(merged.timeout, Some(5));
    /// ```
    pub fn merge_with(mut self, other: Config) -> Self {
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        if other.max_response_bytes.is_some() {
            self.max_response_bytes = other.max_response_bytes;
        }
        if other.user_agent.is_some() {
            self.user_agent = other.user_agent;
        }
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.exit_code.is_some() {
            self.exit_code = other.exit_code;
        }
        self
    }

    /// Creates a Config from command-line arguments for merging.
    ///
    /// Only provided arguments (Some values) will override other configurations.
    pub fn from_cli_args(
        timeout: Option<u64>,
        output: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Config {
            timeout,
            max_response_bytes: None,
            user_agent: None,
            output,
            exit_code,
        }
    }

    /// Checks values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout == Some(0) {
            return Err(ConfigError::Validation(
                "timeout must be at least 1 second".to_string(),
            ));
        }
        if self.max_response_bytes == Some(0) {
            return Err(ConfigError::Validation(
                "max_response_bytes must be greater than zero".to_string(),
            ));
        }
        if let Some(output) = &self.output {
            if !OUTPUT_FORMATS.contains(&output.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "unknown output format '{}', expected one of: {}",
                    output,
                    OUTPUT_FORMATS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Generates an example configuration file in TOML format.
    ///
    /// # Example
    ///
    /// ```
    /// # use certstatus::config::Config;
    /// let example = Config::example_toml();
    /// assert!(example.contains("timeout"));
    /// ```
    pub fn example_toml() -> String {
        let example = Config {
            timeout: Some(10),
            max_response_bytes: Some(DEFAULT_MAX_RESPONSE_BYTES),
            user_agent: Some("certstatus".to_string()),
            output: Some("text".to_string()),
            exit_code: Some(2),
        };

        toml::to_string_pretty(&example)
            .unwrap_or_else(|_| "# Error generating example".to_string())
    }
}

/// Errors that can occur during configuration loading and parsing.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    Io(String),
    /// TOML parsing error (invalid syntax, type mismatch, etc.)
    Parse(String),
    /// Validation error (invalid values)
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO Error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse Error: {}", msg),
            ConfigError::Validation(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
