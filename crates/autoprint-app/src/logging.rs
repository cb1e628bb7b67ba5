// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Logging setup.
//
// Console: `RUST_LOG` if set, otherwise the configured level.
// File (optional): truncated at startup, always at debug, with source
// locations and no colour codes.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use autoprint_core::config::AutoprintConfig;
use autoprint_core::error::{AutoprintError, Result};

/// Install the global subscriber. Call once, before anything logs.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<()> {
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => console_filter(level)?,
    };
    let console = fmt::layer().with_target(false).with_filter(console_filter);

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                AutoprintError::Config(format!("cannot create log file {}: {e}", path.display()))
            })?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| AutoprintError::Config(format!("cannot install logger: {e}")))
}

fn console_filter(level: &str) -> Result<EnvFilter> {
    match level.trim().to_ascii_lowercase().as_str() {
        lvl @ ("error" | "warn" | "info" | "debug" | "trace" | "off") => Ok(EnvFilter::new(lvl)),
        other => Err(AutoprintError::Config(format!(
            "unknown log level '{other}' (expected error, warn, info, debug or trace)"
        ))),
    }
}

/// One-time summary of the effective settings.
pub fn banner(config: &AutoprintConfig) {
    info!(version = env!("CARGO_PKG_VERSION"), "autoprint starting");
    info!(root = %config.watch_path.display(), "watch root");
    match &config.printer_name {
        Some(name) => info!(printer = %name, "configured printer"),
        None => info!("printer: system default"),
    }
    info!(
        interval_ms = config.poll_interval_ms,
        cooldown_ms = config.debounce.cooldown_ms,
        status_check = config.dispatch.check_printer_status,
        dry_run = config.dry_run,
        "settings"
    );
    if let Some(file) = &config.log_file {
        info!(file = %file.display(), "logging to file");
    }
}
