// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub backend for targets that are neither Unix nor Windows.
//
// Every method returns `PlatformUnavailable`, which is fatal at startup, so
// the watcher refuses to run rather than silently dropping documents. Use
// `--dry-run` to exercise the pipeline on such platforms.

use std::path::Path;

use autoprint_core::error::{AutoprintError, Result};
use autoprint_core::types::PrinterStatus;

use super::PrintBackend;

/// No-op backend returned on unsupported platforms.
pub struct StubBackend;

impl PrintBackend for StubBackend {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn enumerate_printers(&self) -> Result<Vec<String>> {
        tracing::warn!("PrintBackend::enumerate_printers called on stub backend");
        Err(AutoprintError::PlatformUnavailable)
    }

    fn default_printer(&self) -> Result<Option<String>> {
        tracing::warn!("PrintBackend::default_printer called on stub backend");
        Err(AutoprintError::PlatformUnavailable)
    }

    fn query_status(&self, _printer: &str) -> Result<PrinterStatus> {
        Err(AutoprintError::PlatformUnavailable)
    }

    fn submit(&self, _path: &Path, _printer: &str) -> Result<()> {
        Err(AutoprintError::PlatformUnavailable)
    }
}
