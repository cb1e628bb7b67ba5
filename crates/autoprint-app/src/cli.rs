// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line interface and config file loading.
//
// Precedence: CLI flag > config file > built-in default.

use std::path::{Path, PathBuf};

use clap::Parser;

use autoprint_core::config::AutoprintConfig;
use autoprint_core::error::{AutoprintError, Result};

/// Autoprint: watch a folder and print every completed PDF exactly once
#[derive(Debug, Parser)]
#[command(name = "autoprint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory tree to watch for new PDF files
    #[arg(short, long, value_name = "DIR")]
    pub watch: Option<PathBuf>,

    /// Printer to use (default: the system default printer)
    #[arg(short, long, value_name = "NAME")]
    pub printer: Option<String>,

    /// JSON config file; flags given on the command line take precedence
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Supervisor tick in milliseconds
    #[arg(short, long, value_name = "MS")]
    pub interval: Option<u64>,

    /// Console log level (error, warn, info, debug, trace)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Also log at debug level to this file (truncated on start)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Submit even when the printer reports offline, out of paper or error
    #[arg(long)]
    pub no_status_check: bool,

    /// Validate and log documents without sending them to a printer
    #[arg(long)]
    pub dry_run: bool,

    /// List known printers and exit
    #[arg(long)]
    pub list_printers: bool,

    /// Write a one-page blank PDF to FILE and exit
    #[arg(long, value_name = "FILE")]
    pub emit_test_page: Option<PathBuf>,
}

impl Cli {
    /// Build the effective configuration: config file (if any), then flags.
    ///
    /// The result is not validated; one-shot commands do not need a watch
    /// path.
    pub fn into_config(self) -> Result<AutoprintConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AutoprintConfig::default(),
        };

        if let Some(watch) = self.watch {
            config.watch_path = watch;
        }
        if let Some(printer) = self.printer {
            config.printer_name = Some(printer);
        }
        if let Some(interval) = self.interval {
            config.poll_interval_ms = interval;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(file) = self.log_file {
            config.log_file = Some(file);
        }
        if self.no_status_check {
            config.dispatch.check_printer_status = false;
        }
        if self.dry_run {
            config.dry_run = true;
        }
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<AutoprintConfig> {
    let data = std::fs::read_to_string(path).map_err(|e| {
        AutoprintError::Config(format!("cannot read config file {}: {e}", path.display()))
    })?;
    AutoprintConfig::from_json(&data).map_err(|e| {
        AutoprintError::Config(format!("invalid config file {}: {e}", path.display()))
    })
}
