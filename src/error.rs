//! Configuration loading and validation errors

use thiserror::Error;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required string field is missing or blank
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// sleepTime was given as zero
    #[error("sleepTime must be at least 1 minute, got 0")]
    InvalidSleepTime,

    /// An URL-valued field does not parse as an http(s) URL
    #[error("{field} must be an http(s) URL, got: {value}")]
    InvalidUrl { field: &'static str, value: String },

    /// Failed to parse the YAML document
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to read the configuration file
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error with path context
    pub fn parse(path: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
