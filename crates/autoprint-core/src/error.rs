// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for autoprint.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all autoprint operations.
#[derive(Debug, Error)]
pub enum AutoprintError {
    // -- Startup / configuration --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file watcher error: {0}")]
    Watch(String),

    // -- Printer resolution --
    #[error("could not find printer name '{0}'")]
    PrinterNotFound(String),

    #[error("no system default printer is configured")]
    NoDefaultPrinter,

    #[error("printer enumeration failed: {0}")]
    PrinterEnumeration(String),

    // -- Per-file pipeline --
    #[error("printer '{printer}' is offline or not ready: {reason}")]
    PrinterOffline { printer: String, reason: String },

    #[error("'{}' did not become a complete document after {attempts} attempts", path.display())]
    ReadinessTimeout { path: PathBuf, attempts: u32 },

    #[error("'{}' is locked or inaccessible after {attempts} attempts", path.display())]
    FileLocked { path: PathBuf, attempts: u32 },

    #[error("'{}' does not exist", .0.display())]
    SourceMissing(PathBuf),

    #[error("print submission failed: {0}")]
    Dispatch(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("operation cancelled by shutdown")]
    Cancelled,

    // -- Platform --
    #[error("printing is not available on this platform")]
    PlatformUnavailable,

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AutoprintError {
    /// Whether this error must abort the process.
    ///
    /// Only startup-time errors qualify; every per-file error is logged at the
    /// pipeline boundary and the watcher keeps running.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Watch(_)
                | Self::PrinterNotFound(_)
                | Self::NoDefaultPrinter
                | Self::PrinterEnumeration(_)
                | Self::PlatformUnavailable
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AutoprintError>;
