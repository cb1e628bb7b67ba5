// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print backend abstraction.
//
// The pipeline never talks to an OS print API directly. Enumeration, default
// lookup, status and submission all go through `PrintBackend`, so the
// dispatcher is testable against `memory::MemoryBackend` and portable to any
// spooler.

use std::path::Path;
use std::sync::Arc;

use autoprint_core::error::Result;
use autoprint_core::types::PrinterStatus;

#[cfg(unix)]
pub mod cups;

pub mod memory;

#[cfg(not(any(unix, windows)))]
pub mod stub;

// Parsers are platform-neutral, so the module is also built for tests.
#[cfg(any(windows, test))]
pub mod windows;

/// Capability interface over the OS print subsystem.
///
/// Methods are blocking; async callers run them on the blocking pool.
pub trait PrintBackend: Send + Sync {
    /// Short backend name for logs (e.g. "cups").
    fn name(&self) -> &str;

    /// Names of every printer the print subsystem knows about.
    fn enumerate_printers(&self) -> Result<Vec<String>>;

    /// The system default printer, if one is configured.
    fn default_printer(&self) -> Result<Option<String>>;

    /// Current readiness flags for `printer`.
    fn query_status(&self, printer: &str) -> Result<PrinterStatus>;

    /// Hand the file at `path` (absolute) to `printer`.
    ///
    /// Returns once the print subsystem has accepted the job; physical
    /// completion is not awaited.
    fn submit(&self, path: &Path, printer: &str) -> Result<()>;
}

/// The backend for the platform this binary was built for.
pub fn system_backend() -> Arc<dyn PrintBackend> {
    #[cfg(unix)]
    {
        // CUPS command-line tools (`lpstat`, `lp`).
        Arc::new(cups::CupsBackend::new())
    }
    #[cfg(windows)]
    {
        // PrintManagement cmdlets via PowerShell.
        Arc::new(windows::WindowsSpoolerBackend::new())
    }
    #[cfg(not(any(unix, windows)))]
    {
        Arc::new(stub::StubBackend)
    }
}
