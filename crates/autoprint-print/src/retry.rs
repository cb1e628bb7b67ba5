// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixed-delay retry support and error classification.
//
// Classifies errors into Transient (a later event may succeed), UserAction
// (someone has to fix the printer or config), and Permanent (the input is
// unusable). The pipeline uses the class to pick a log level; nothing is
// retried automatically once a job has failed.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use autoprint_core::error::{AutoprintError, Result};
use autoprint_core::types::ErrorClass;

/// Classify an `AutoprintError` for reporting.
pub fn classify_error(err: &AutoprintError) -> ErrorClass {
    match err {
        // Transient: a later event for the same file may succeed
        AutoprintError::ReadinessTimeout { .. } => ErrorClass::Transient,
        AutoprintError::FileLocked { .. } => ErrorClass::Transient,
        AutoprintError::Cancelled => ErrorClass::Transient,
        AutoprintError::Dispatch(detail) => classify_dispatch_detail(detail),

        // User action needed
        AutoprintError::PrinterOffline { .. } => ErrorClass::UserAction,
        AutoprintError::PrinterNotFound(_) => ErrorClass::UserAction,
        AutoprintError::NoDefaultPrinter => ErrorClass::UserAction,
        AutoprintError::PrinterEnumeration(_) => ErrorClass::UserAction,
        AutoprintError::Config(_) => ErrorClass::UserAction,
        AutoprintError::Watch(_) => ErrorClass::UserAction,

        // Permanent: the input or platform is unusable
        AutoprintError::InvalidDocument(_) => ErrorClass::Permanent,
        AutoprintError::SourceMissing(_) => ErrorClass::Permanent,
        AutoprintError::PlatformUnavailable => ErrorClass::Permanent,
        AutoprintError::Serialization(_) => ErrorClass::Permanent,

        // IO errors depend on the kind
        AutoprintError::Io(io_err) => classify_io_error(io_err),
    }
}

/// Classify a raw I/O error raised while touching a candidate file.
pub fn classify_io_error(err: &std::io::Error) -> ErrorClass {
    match err.kind() {
        std::io::ErrorKind::NotFound => ErrorClass::Permanent,
        std::io::ErrorKind::PermissionDenied
        | std::io::ErrorKind::WouldBlock
        | std::io::ErrorKind::Interrupted
        | std::io::ErrorKind::TimedOut => ErrorClass::Transient,
        _ => {
            // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
            if cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33)) {
                ErrorClass::Transient
            } else {
                ErrorClass::Permanent
            }
        }
    }
}

/// Classify the detail text of a failed submission.
fn classify_dispatch_detail(detail: &str) -> ErrorClass {
    let lower = detail.to_ascii_lowercase();

    // Queue or printer refusing work
    if lower.contains("not accepting")
        || lower.contains("disabled")
        || lower.contains("paused")
        || lower.contains("unable to connect")
    {
        return ErrorClass::UserAction;
    }

    // Destination or file does not exist
    if lower.contains("does not exist")
        || lower.contains("unknown destination")
        || lower.contains("no such file")
        || lower.contains("not valid utf-8")
    {
        return ErrorClass::Permanent;
    }

    ErrorClass::Transient
}

/// Sleep for `delay`, or return `Cancelled` as soon as `cancel` fires.
///
/// Every retry loop waits through this so shutdown is observed within one
/// delay interval.
pub async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("retry wait interrupted by shutdown");
            Err(AutoprintError::Cancelled)
        }
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
