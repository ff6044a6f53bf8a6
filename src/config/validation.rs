// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Semantic validation of a parsed [`Config`].
//!
//! Parsing only guarantees the shape of the file. The checks here reject
//! settings that would make the dispatcher misbehave at runtime: zero
//! intervals that turn the poll loop or progress timer into a busy loop,
//! progress bounds that could report 100% before completion, and base URLs
//! the HTTP client cannot join endpoints onto.
//!
//! All issues are collected rather than stopping at the first one, so a
//! broken file can be fixed in a single pass.

use crate::config::Config;
use crate::errors::ConfigIssue;
use url::Url;

pub fn validate_config(config: &Config) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    if config.routing.size_threshold_bytes == 0 {
        issues.push(ConfigIssue::ZeroSizeThreshold);
    }

    let remote = &config.remote;
    if remote.enabled {
        validate_base_url(&remote.base_url, &mut issues);
    }
    if remote.poll_interval_ms == 0 {
        issues.push(ConfigIssue::ZeroDuration {
            setting: "remote.poll_interval_ms",
        });
    }
    if remote.request_timeout_secs == 0 {
        issues.push(ConfigIssue::ZeroDuration {
            setting: "remote.request_timeout_secs",
        });
    }
    if remote.max_poll_attempts == 0 {
        issues.push(ConfigIssue::ZeroLimit {
            setting: "remote.max_poll_attempts",
        });
    }
    if remote.max_consecutive_poll_errors == 0 {
        issues.push(ConfigIssue::ZeroLimit {
            setting: "remote.max_consecutive_poll_errors",
        });
    }

    let progress = &config.progress;
    if progress.tick_interval_ms == 0 {
        issues.push(ConfigIssue::ZeroDuration {
            setting: "progress.tick_interval_ms",
        });
    }
    if progress.min_increment == 0 || progress.min_increment > progress.max_increment {
        issues.push(ConfigIssue::InvalidIncrementRange {
            min: progress.min_increment,
            max: progress.max_increment,
        });
    }
    if progress.ceiling >= 100 {
        issues.push(ConfigIssue::CeilingTooHigh {
            ceiling: progress.ceiling,
        });
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn validate_base_url(value: &str, issues: &mut Vec<ConfigIssue>) {
    let reason = match Url::parse(value) {
        Ok(url) if !matches!(url.scheme(), "http" | "https") => {
            format!("unsupported scheme '{}'", url.scheme())
        }
        Ok(url) if url.cannot_be_a_base() => "URL cannot be used as a base".to_string(),
        Ok(_) => return,
        Err(e) => e.to_string(),
    };

    issues.push(ConfigIssue::InvalidBaseUrl {
        value: value.to_string(),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&Config::default()), Ok(()));
    }

    #[test]
    fn test_rejects_zero_intervals_and_limits() {
        let mut config = Config::default();
        config.remote.poll_interval_ms = 0;
        config.remote.max_poll_attempts = 0;
        config.progress.tick_interval_ms = 0;

        let issues = validate_config(&config).unwrap_err();
        assert_eq!(
            issues,
            vec![
                ConfigIssue::ZeroDuration {
                    setting: "remote.poll_interval_ms"
                },
                ConfigIssue::ZeroLimit {
                    setting: "remote.max_poll_attempts"
                },
                ConfigIssue::ZeroDuration {
                    setting: "progress.tick_interval_ms"
                },
            ]
        );
    }

    #[test]
    fn test_rejects_inverted_increments() {
        let mut config = Config::default();
        config.progress.min_increment = 12;
        config.progress.max_increment = 4;

        let issues = validate_config(&config).unwrap_err();
        assert_eq!(issues, vec![ConfigIssue::InvalidIncrementRange { min: 12, max: 4 }]);
    }

    #[test]
    fn test_rejects_bad_base_urls() {
        for bad in ["not a url", "ftp://worker", "mailto:ops@example.com"] {
            let mut config = Config::default();
            config.remote.base_url = bad.to_string();

            let issues = validate_config(&config).unwrap_err();
            assert!(
                matches!(&issues[..], [ConfigIssue::InvalidBaseUrl { value, .. }] if value == bad),
                "{bad} should be rejected, got {issues:?}"
            );
        }
    }

    #[test]
    fn test_base_url_ignored_when_remote_disabled() {
        let mut config = Config::default();
        config.remote.enabled = false;
        config.remote.base_url = String::new();

        assert_eq!(validate_config(&config), Ok(()));
    }
}
