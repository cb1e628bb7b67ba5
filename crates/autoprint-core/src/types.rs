// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the autoprint hot-folder pipeline.

use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Watch events -------------------------------------------------------------

/// Kind of filesystem change reported by the watch source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Created,
    Modified,
    Deleted,
    Moved,
}

/// A single raw filesystem notification. Consumed once by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub is_directory: bool,
    pub kind: EventKind,
    /// Destination of a move/rename, when the platform reports both ends.
    pub dest_path: Option<PathBuf>,
}

impl WatchEvent {
    /// A "file created" event, the only kind that can start a print.
    pub fn file_created(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_directory: false,
            kind: EventKind::Created,
            dest_path: None,
        }
    }

    pub fn new(path: impl Into<PathBuf>, kind: EventKind, is_directory: bool) -> Self {
        Self {
            path: path.into(),
            is_directory,
            kind,
            dest_path: None,
        }
    }

    pub fn with_dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest_path = Some(dest.into());
        self
    }
}

// -- Debounce tracking --------------------------------------------------------

/// Debounce state for one path currently inside the cooldown window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTrackingRecord {
    pub path: PathBuf,
    pub last_processed_at: Instant,
    /// On-disk modification time observed when the record was written.
    pub last_mod_time: SystemTime,
}

impl FileTrackingRecord {
    pub fn new(path: &Path, now: Instant, mtime: SystemTime) -> Self {
        Self {
            path: path.to_path_buf(),
            last_processed_at: now,
            last_mod_time: mtime,
        }
    }
}

// -- Printers -----------------------------------------------------------------

/// A concrete printer the dispatcher submits to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrinterTarget {
    pub name: String,
    /// Whether this printer was chosen because it is the system default.
    pub is_default: bool,
}

impl std::fmt::Display for PrinterTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_default {
            write!(f, "{} (system default)", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Readiness flags reported by the print subsystem for one printer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterStatus {
    pub offline: bool,
    pub paper_out: bool,
    pub error: bool,
}

impl PrinterStatus {
    /// Spooler status bit: printer is in an error state.
    pub const FLAG_ERROR: u32 = 0x0000_0002;
    /// Spooler status bit: printer is out of paper.
    pub const FLAG_PAPER_OUT: u32 = 0x0000_0040;
    /// Spooler status bit: printer is offline.
    pub const FLAG_OFFLINE: u32 = 0x0000_0080;

    pub fn ready() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Decode a spooler status word. Unrelated bits (busy, printing, ...) are
    /// ignored.
    pub fn from_spooler_flags(flags: u32) -> Self {
        Self {
            offline: flags & Self::FLAG_OFFLINE != 0,
            paper_out: flags & Self::FLAG_PAPER_OUT != 0,
            error: flags & Self::FLAG_ERROR != 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        !(self.offline || self.paper_out || self.error)
    }

    /// Short human-readable list of the raised flags.
    pub fn describe(&self) -> String {
        let mut reasons = Vec::new();
        if self.offline {
            reasons.push("offline");
        }
        if self.paper_out {
            reasons.push("out of paper");
        }
        if self.error {
            reasons.push("error");
        }
        if reasons.is_empty() {
            "ready".to_string()
        } else {
            reasons.join(", ")
        }
    }
}

// -- Print jobs ---------------------------------------------------------------

/// Unique identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states of a print job.
///
/// `Delivered` and `Failed` are terminal. A failed job is never retried
/// automatically; a fresh watch event has to start a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Created, not yet handed to the print subsystem.
    Pending,
    /// The OS accepted the job. Says nothing about physical output.
    Delivered,
    /// Dispatch failed. The job's error message says why.
    Failed,
}

/// One validated document on its way to a printer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: JobId,
    pub source_path: PathBuf,
    pub target_printer: PrinterTarget,
    pub status: JobStatus,
    /// SHA-256 of the content that passed validation.
    pub fingerprint: Option<String>,
    pub page_count: Option<usize>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub error_message: Option<String>,
}

impl PrintJob {
    pub fn new(source_path: PathBuf, target_printer: PrinterTarget) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            source_path,
            target_printer,
            status: JobStatus::Pending,
            fingerprint: None,
            page_count: None,
            created_at: now,
            updated_at: now,
            error_message: None,
        }
    }

    pub fn mark_delivered(&mut self) {
        self.status = JobStatus::Delivered;
        self.error_message = None;
        self.updated_at = Utc::now();
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error_message = Some(reason.into());
        self.updated_at = Utc::now();
    }
}

/// Classification of errors for logging and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Lock held or file still being written. A later event may succeed.
    Transient,
    /// Someone has to act (printer offline, out of paper, bad config).
    UserAction,
    /// The input itself is unusable.
    Permanent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spooler_flags_decode_offline_paper_and_error() {
        let status = PrinterStatus::from_spooler_flags(0x80 | 0x40 | 0x02);
        assert!(status.offline);
        assert!(status.paper_out);
        assert!(status.error);
        assert!(!status.is_ready());
        assert_eq!(status.describe(), "offline, out of paper, error");
    }

    #[test]
    fn unrelated_spooler_bits_keep_printer_ready() {
        // 0x400 = printing, 0x200 = busy
        let status = PrinterStatus::from_spooler_flags(0x400 | 0x200);
        assert!(status.is_ready());
        assert_eq!(status.describe(), "ready");
    }

    #[test]
    fn job_lifecycle() {
        let target = PrinterTarget {
            name: "Office".into(),
            is_default: false,
        };
        let mut job = PrintJob::new(PathBuf::from("/in/report.pdf"), target);
        assert_eq!(job.status, JobStatus::Pending);

        job.mark_failed("printer 'Office' is offline");
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(
            job.error_message.as_deref(),
            Some("printer 'Office' is offline")
        );
    }

    #[test]
    fn default_printer_display_is_marked() {
        let target = PrinterTarget {
            name: "HP_LaserJet".into(),
            is_default: true,
        };
        assert_eq!(target.to_string(), "HP_LaserJet (system default)");
    }
}
