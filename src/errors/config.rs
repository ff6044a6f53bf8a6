// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// A single problem found while validating a loaded configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssue {
    /// A duration setting was configured as zero
    ZeroDuration {
        /// Dotted path of the offending setting
        setting: &'static str,
    },
    /// A counter setting was configured as zero
    ZeroLimit {
        /// Dotted path of the offending setting
        setting: &'static str,
    },
    /// The remote worker base URL is not an absolute http(s) URL
    InvalidBaseUrl {
        /// The configured value
        value: String,
        /// Why it was rejected
        reason: String,
    },
    /// Progress increments are inverted or zero
    InvalidIncrementRange {
        min: u8,
        max: u8,
    },
    /// Progress ceiling must stay below 100 so only completion reaches it
    CeilingTooHigh {
        ceiling: u8,
    },
    /// The size threshold was configured as zero bytes
    ZeroSizeThreshold,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::ZeroDuration { setting } => {
                write!(f, "'{}' must be greater than zero", setting)
            }
            ConfigIssue::ZeroLimit { setting } => {
                write!(f, "'{}' must allow at least one attempt", setting)
            }
            ConfigIssue::InvalidBaseUrl { value, reason } => {
                write!(f, "Invalid remote base_url '{}': {}", value, reason)
            }
            ConfigIssue::InvalidIncrementRange { min, max } => {
                write!(
                    f,
                    "Progress increments must satisfy 0 < min_increment <= max_increment (got {}..={})",
                    min, max
                )
            }
            ConfigIssue::CeilingTooHigh { ceiling } => {
                write!(f, "Progress ceiling must be below 100 (got {})", ceiling)
            }
            ConfigIssue::ZeroSizeThreshold => {
                write!(f, "'routing.size_threshold_bytes' must be greater than zero")
            }
        }
    }
}

/// Errors raised while loading configuration or building runtime components from it
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// YAML syntax or shape error.
    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML syntax or shape error.
    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// One or more semantic problems.
    #[error("Configuration validation failed:\n{}", join_issues(.0))]
    Invalid(Vec<ConfigIssue>),

    /// HTTP client for the remote worker could not be constructed.
    #[error("Failed to build remote worker client: {0}")]
    RemoteClient(String),
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {}", issue))
        .collect::<Vec<_>>()
        .join("\n")
}
