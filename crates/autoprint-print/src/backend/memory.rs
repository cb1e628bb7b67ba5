// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory backend: a configurable set of printers that records every
// submission instead of printing it.
//
// Backs `--dry-run` and the pipeline tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::info;

use autoprint_core::error::{AutoprintError, Result};
use autoprint_core::types::PrinterStatus;

use super::PrintBackend;

/// One accepted call to [`PrintBackend::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub path: PathBuf,
    pub printer: String,
}

/// Recording backend with scripted printer state.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    printers: Vec<String>,
    default: Option<String>,
    statuses: Mutex<HashMap<String, PrinterStatus>>,
    submissions: Mutex<Vec<Submission>>,
    /// When set, every submission fails with this message.
    submit_failure: Mutex<Option<String>>,
    /// When set, enumeration fails with this message.
    enumerate_failure: Option<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend with a single ready printer that is also the default.
    pub fn single(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new().with_printer(name.clone()).with_default(name)
    }

    pub fn with_printer(mut self, name: impl Into<String>) -> Self {
        self.printers.push(name.into());
        self
    }

    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    pub fn with_enumeration_failure(mut self, detail: impl Into<String>) -> Self {
        self.enumerate_failure = Some(detail.into());
        self
    }

    pub fn set_status(&self, printer: &str, status: PrinterStatus) {
        self.statuses
            .lock()
            .expect("status lock poisoned")
            .insert(printer.to_string(), status);
    }

    pub fn fail_submissions(&self, detail: impl Into<String>) {
        *self.submit_failure.lock().expect("failure lock poisoned") = Some(detail.into());
    }

    /// Snapshot of every accepted submission, oldest first.
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions
            .lock()
            .expect("submission lock poisoned")
            .clone()
    }
}

impl PrintBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn enumerate_printers(&self) -> Result<Vec<String>> {
        if let Some(detail) = &self.enumerate_failure {
            return Err(AutoprintError::PrinterEnumeration(detail.clone()));
        }
        Ok(self.printers.clone())
    }

    fn default_printer(&self) -> Result<Option<String>> {
        Ok(self.default.clone())
    }

    fn query_status(&self, printer: &str) -> Result<PrinterStatus> {
        if !self.printers.iter().any(|p| p == printer) {
            return Err(AutoprintError::PrinterNotFound(printer.to_string()));
        }
        Ok(self
            .statuses
            .lock()
            .expect("status lock poisoned")
            .get(printer)
            .copied()
            .unwrap_or_default())
    }

    fn submit(&self, path: &Path, printer: &str) -> Result<()> {
        if let Some(detail) = self
            .submit_failure
            .lock()
            .expect("failure lock poisoned")
            .clone()
        {
            return Err(AutoprintError::Dispatch(detail));
        }

        info!(path = %path.display(), printer, "recorded submission (not printed)");
        self.submissions
            .lock()
            .expect("submission lock poisoned")
            .push(Submission {
                path: path.to_path_buf(),
                printer: printer.to_string(),
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_printer_is_default_and_ready() {
        let backend = MemoryBackend::single("Office");
        assert_eq!(backend.enumerate_printers().unwrap(), vec!["Office"]);
        assert_eq!(backend.default_printer().unwrap().as_deref(), Some("Office"));
        assert!(backend.query_status("Office").unwrap().is_ready());
    }

    #[test]
    fn records_submissions_in_order() {
        let backend = MemoryBackend::single("Office");
        backend.submit(Path::new("/in/a.pdf"), "Office").unwrap();
        backend.submit(Path::new("/in/b.pdf"), "Office").unwrap();

        let subs = backend.submissions();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].path, PathBuf::from("/in/a.pdf"));
        assert_eq!(subs[1].path, PathBuf::from("/in/b.pdf"));
    }

    #[test]
    fn forced_failure_records_nothing() {
        let backend = MemoryBackend::single("Office");
        backend.fail_submissions("spooler stopped");
        let err = backend.submit(Path::new("/in/a.pdf"), "Office").unwrap_err();
        assert!(matches!(err, AutoprintError::Dispatch(_)));
        assert!(backend.submissions().is_empty());
    }

    #[test]
    fn scripted_status_is_reported() {
        let backend = MemoryBackend::single("Office");
        backend.set_status("Office", PrinterStatus::offline());
        assert!(!backend.query_status("Office").unwrap().is_ready());
    }
}
