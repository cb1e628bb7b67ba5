// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS backend: drives the standard `lpstat` / `lp` command-line tools.
//
// The tools are run with `LC_ALL=C` so their output can be parsed. Parsing
// lives in free functions so it can be tested without a CUPS server.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info, warn};

use autoprint_core::error::{AutoprintError, Result};
use autoprint_core::types::PrinterStatus;

use super::PrintBackend;

/// Print backend for Unix systems with CUPS installed.
#[derive(Debug, Clone)]
pub struct CupsBackend {
    lpstat: String,
    lp: String,
}

impl Default for CupsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CupsBackend {
    pub fn new() -> Self {
        Self {
            lpstat: "lpstat".into(),
            lp: "lp".into(),
        }
    }

    #[cfg(test)]
    fn with_programs(lpstat: impl Into<String>, lp: impl Into<String>) -> Self {
        Self {
            lpstat: lpstat.into(),
            lp: lp.into(),
        }
    }

    /// Run a tool and return its stdout, or a description of why it failed.
    fn run(&self, program: &str, args: &[&str]) -> std::result::Result<String, String> {
        debug!(program, ?args, "running print tool");
        let output = Command::new(program)
            .args(args)
            .env("LC_ALL", "C")
            .output()
            .map_err(|e| format!("cannot run {program}: {e}"))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            ))
        }
    }
}

impl PrintBackend for CupsBackend {
    fn name(&self) -> &str {
        "cups"
    }

    fn enumerate_printers(&self) -> Result<Vec<String>> {
        let stdout = self
            .run(&self.lpstat, &["-e"])
            .map_err(AutoprintError::PrinterEnumeration)?;
        Ok(parse_destinations(&stdout))
    }

    fn default_printer(&self) -> Result<Option<String>> {
        let stdout = self
            .run(&self.lpstat, &["-d"])
            .map_err(AutoprintError::PrinterEnumeration)?;
        Ok(parse_default_destination(&stdout))
    }

    fn query_status(&self, printer: &str) -> Result<PrinterStatus> {
        match self.run(&self.lpstat, &["-p", printer]) {
            Ok(stdout) => Ok(parse_printer_status(&stdout)),
            Err(detail) => {
                warn!(printer, %detail, "could not query printer status");
                Err(AutoprintError::PrinterOffline {
                    printer: printer.to_string(),
                    reason: detail,
                })
            }
        }
    }

    fn submit(&self, path: &Path, printer: &str) -> Result<()> {
        let path_str = path.to_str().ok_or_else(|| {
            AutoprintError::Dispatch(format!("path is not valid UTF-8: {}", path.display()))
        })?;

        let stdout = self
            .run(&self.lp, &["-d", printer, "--", path_str])
            .map_err(AutoprintError::Dispatch)?;

        match parse_request_id(&stdout) {
            Some(request) => info!(printer, request, "CUPS accepted job"),
            None => info!(printer, "CUPS accepted job"),
        }
        Ok(())
    }
}

/// `lpstat -e`: one destination name per line.
pub fn parse_destinations(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// `lpstat -d`: "system default destination: NAME" or
/// "no system default destination".
pub fn parse_default_destination(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        line.trim()
            .strip_prefix("system default destination:")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
    })
}

/// `lpstat -p NAME`: a state line followed by indented state-message lines.
///
/// ```text
/// printer Office disabled since Mon 19 Oct 2026 09:12:01 -
///         Paused - media-empty
/// ```
pub fn parse_printer_status(stdout: &str) -> PrinterStatus {
    let mut status = PrinterStatus::ready();

    for line in stdout.lines() {
        let lower = line.trim().to_ascii_lowercase();
        if lower.is_empty() {
            continue;
        }

        if lower.starts_with("printer ") {
            if lower.contains(" disabled") {
                status.offline = true;
            }
            continue;
        }

        // State message / reasons.
        if lower.contains("offline") || lower.contains("not connected") {
            status.offline = true;
        }
        if lower.contains("media-empty")
            || lower.contains("media empty")
            || lower.contains("out of paper")
            || lower.contains("paper out")
            || lower.contains("media-needed")
        {
            status.paper_out = true;
        }
        if lower.contains("error") || lower.contains("fault") || lower.contains("jam") {
            status.error = true;
        }
    }

    status
}

/// `lp`: "request id is Office-42 (1 file(s))".
pub fn parse_request_id(stdout: &str) -> Option<String> {
    let rest = stdout.trim().strip_prefix("request id is ")?;
    rest.split_whitespace().next().map(String::from)
}
