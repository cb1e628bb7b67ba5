// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// Every field has a default so a config file only needs the values it wants
// to change. Durations are stored as integer milliseconds/seconds to keep the
// JSON format plain.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AutoprintError, Result};

/// Top-level settings for one watcher process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoprintConfig {
    /// Root of the directory tree to watch (recursively).
    pub watch_path: PathBuf,
    /// Printer to use. `None` selects the system default printer.
    pub printer_name: Option<String>,
    /// Supervisor tick; also drives the periodic debounce sweep.
    pub poll_interval_ms: u64,
    /// Console log level (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
    /// Optional log file, truncated at startup and always written at debug.
    pub log_file: Option<PathBuf>,
    /// Record submissions instead of printing them.
    pub dry_run: bool,
    pub debounce: DebounceConfig,
    pub readiness: ReadinessConfig,
    pub dispatch: DispatchConfig,
}

impl Default for AutoprintConfig {
    fn default() -> Self {
        Self {
            watch_path: PathBuf::new(),
            printer_name: None,
            poll_interval_ms: 1000,
            log_level: "info".to_string(),
            log_file: None,
            dry_run: false,
            debounce: DebounceConfig::default(),
            readiness: ReadinessConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl AutoprintConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Parse a config from its JSON representation.
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Reject settings that would make the pipeline unable to ever succeed.
    pub fn validate(&self) -> Result<()> {
        if self.watch_path.as_os_str().is_empty() {
            return Err(AutoprintError::Config(
                "a watch path is required (--watch or \"watch_path\")".into(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(AutoprintError::Config(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.readiness.max_attempts == 0 {
            return Err(AutoprintError::Config(
                "readiness.max_attempts must be at least 1".into(),
            ));
        }
        if self.readiness.required_stable_polls == 0 {
            return Err(AutoprintError::Config(
                "readiness.required_stable_polls must be at least 1".into(),
            ));
        }
        if self.dispatch.lock_retries == 0 {
            return Err(AutoprintError::Config(
                "dispatch.lock_retries must be at least 1".into(),
            ));
        }
        if let Some(name) = &self.printer_name
            && name.trim().is_empty()
        {
            return Err(AutoprintError::Config("printer name is empty".into()));
        }
        Ok(())
    }
}

/// What the debouncer does with its table after a successful print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveredPolicy {
    /// Restamp only the delivered path so late duplicates stay suppressed.
    #[default]
    RefreshPath,
    /// Forget every tracked path.
    ClearAll,
}

/// Duplicate-notification suppression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    pub cooldown_ms: u64,
    pub retention_secs: u64,
    pub on_delivered: DeliveredPolicy,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 5_000,
            retention_secs: 3_600,
            on_delivered: DeliveredPolicy::RefreshPath,
        }
    }
}

impl DebounceConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

/// Polling budget for "is this file completely written yet".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    /// Consecutive polls with an unchanged, non-zero size before content is
    /// inspected.
    pub required_stable_polls: u32,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            retry_delay_ms: 500,
            required_stable_polls: 2,
        }
    }
}

impl ReadinessConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Print dispatch behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Refuse to submit when the printer reports offline/paper-out/error.
    pub check_printer_status: bool,
    pub lock_retries: u32,
    pub lock_retry_delay_ms: u64,
    /// Pause between a successful lock check and submission.
    pub settle_delay_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            check_printer_status: true,
            lock_retries: 10,
            lock_retry_delay_ms: 500,
            settle_delay_ms: 200,
        }
    }
}

impl DispatchConfig {
    pub fn lock_retry_delay(&self) -> Duration {
        Duration::from_millis(self.lock_retry_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AutoprintConfig::default();
        assert_eq!(config.debounce.cooldown(), Duration::from_secs(5));
        assert_eq!(config.debounce.retention(), Duration::from_secs(3600));
        assert_eq!(config.debounce.on_delivered, DeliveredPolicy::RefreshPath);
        assert!(config.dispatch.check_printer_status);
        assert_eq!(config.dispatch.lock_retries, 10);
        assert_eq!(config.dispatch.lock_retry_delay(), Duration::from_millis(500));
        assert_eq!(config.dispatch.settle_delay(), Duration::from_millis(200));
        assert_eq!(config.readiness.required_stable_polls, 2);
        assert!(config.printer_name.is_none());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config = AutoprintConfig::from_json(
            r#"{
                "watch_path": "/srv/hotfolder",
                "printer_name": "Office",
                "debounce": { "on_delivered": "clear_all" },
                "dispatch": { "check_printer_status": false }
            }"#,
        )
        .expect("parse config");

        assert_eq!(config.watch_path, PathBuf::from("/srv/hotfolder"));
        assert_eq!(config.printer_name.as_deref(), Some("Office"));
        assert_eq!(config.debounce.on_delivered, DeliveredPolicy::ClearAll);
        assert_eq!(config.debounce.cooldown_ms, 5_000);
        assert!(!config.dispatch.check_printer_status);
        assert_eq!(config.dispatch.lock_retries, 10);
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = AutoprintConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, AutoprintError::Serialization(_)));
    }

    #[test]
    fn validate_requires_watch_path() {
        let err = AutoprintConfig::default().validate().unwrap_err();
        assert!(matches!(err, AutoprintError::Config(_)));
    }

    #[test]
    fn validate_rejects_zero_budgets() {
        let mut config = AutoprintConfig {
            watch_path: PathBuf::from("/tmp"),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.readiness.max_attempts = 0;
        assert!(config.validate().is_err());

        config.readiness.max_attempts = 5;
        config.dispatch.lock_retries = 0;
        assert!(config.validate().is_err());

        config.dispatch.lock_retries = 3;
        config.printer_name = Some("  ".into());
        assert!(config.validate().is_err());
    }
}
