// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_ENGINE_MODULE, DEFAULT_MAX_CONSECUTIVE_POLL_ERRORS, DEFAULT_MAX_INCREMENT,
    DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_MIN_INCREMENT, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_PROGRESS_CEILING, DEFAULT_REMOTE_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SIZE_THRESHOLD_BYTES, DEFAULT_TICK_INTERVAL_MS,
};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for the dispatcher.
///
/// Every section is optional; anything left out falls back to the built-in
/// defaults in [`crate::config::consts`].
///
/// # Example
/// ```yaml
/// routing:
///   size_threshold_bytes: 52428800
/// remote:
///   enabled: true
///   base_url: "http://127.0.0.1:5000"
///   poll_interval_ms: 2000
/// local:
///   module: engines/ffmpeg.wasm
///   fuel: 50000000000
/// progress:
///   tick_interval_ms: 1500
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub routing: RoutingConfig,
    pub remote: RemoteConfig,
    pub local: LocalConfig,
    pub progress: ProgressConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingConfig {
    /// Jobs strictly larger than this run locally without a remote attempt.
    pub size_threshold_bytes: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            size_threshold_bytes: DEFAULT_SIZE_THRESHOLD_BYTES,
        }
    }
}

/// Remote worker connection and polling settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    /// When false every job runs on the local engine.
    pub enabled: bool,
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub max_consecutive_poll_errors: u32,
    pub request_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            max_consecutive_poll_errors: DEFAULT_MAX_CONSECUTIVE_POLL_ERRORS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl RemoteConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Local engine settings.
///
/// `fuel` is an instruction budget per transform; unset means unbounded.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LocalConfig {
    pub module: PathBuf,
    pub fuel: Option<u64>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            module: PathBuf::from(DEFAULT_ENGINE_MODULE),
            fuel: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProgressConfig {
    pub tick_interval_ms: u64,
    pub min_increment: u8,
    pub max_increment: u8,
    pub ceiling: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            min_increment: DEFAULT_MIN_INCREMENT,
            max_increment: DEFAULT_MAX_INCREMENT,
            ceiling: DEFAULT_PROGRESS_CEILING,
        }
    }
}

impl ProgressConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Supported configuration file formats, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Parse configuration text in the given format without validating it.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    let cfg = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    Ok(cfg)
}

/// Load a config from a YAML or TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content, ConfigFormat::from_path(path))
}

/// Load a config file and reject semantically invalid settings.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_empty_config_uses_defaults() {
        let cfg = parse_config("{}", ConfigFormat::Yaml).unwrap();

        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.routing.size_threshold_bytes, 50 * 1024 * 1024);
        assert!(cfg.remote.enabled);
        assert_eq!(cfg.remote.poll_interval(), Duration::from_millis(2000));
        assert_eq!(cfg.remote.request_timeout(), Duration::from_secs(300));
        assert_eq!(cfg.remote.max_poll_attempts, 150);
        assert_eq!(cfg.local.fuel, None);
        assert_eq!(cfg.progress.ceiling, 90);
    }

    #[test]
    fn parse_partial_yaml_override() {
        let yaml = r#"
remote:
  base_url: "http://worker:8080/api"
  poll_interval_ms: 500
local:
  fuel: 1000000
"#;

        let cfg = parse_config(yaml, ConfigFormat::Yaml).unwrap();

        assert_eq!(cfg.remote.base_url, "http://worker:8080/api");
        assert_eq!(cfg.remote.poll_interval_ms, 500);
        // Untouched fields keep their defaults
        assert_eq!(cfg.remote.max_consecutive_poll_errors, 3);
        assert_eq!(cfg.local.module, PathBuf::from("engines/ffmpeg.wasm"));
        assert_eq!(cfg.local.fuel, Some(1_000_000));
    }

    #[test]
    fn parse_toml_config() {
        let toml = r#"
[routing]
size_threshold_bytes = 1024

[remote]
enabled = false
"#;

        let cfg = parse_config(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(cfg.routing.size_threshold_bytes, 1024);
        assert!(!cfg.remote.enabled);
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        let result = parse_config("remote:\n  pol_interval_ms: 10\n", ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/b.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a/b.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a/b.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a/b")), ConfigFormat::Yaml);
    }

    #[test]
    fn test_load_and_validate_rejects_invalid_settings() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "progress:\n  ceiling: 100\n  tick_interval_ms: 0").unwrap();

        let error = load_and_validate_config(file.path()).unwrap_err();
        match error {
            ConfigError::Invalid(issues) => assert_eq!(issues.len(), 2),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let error = load_config("does/not/exist.yaml").unwrap_err();
        assert!(error.to_string().contains("does/not/exist.yaml"));
    }
}
