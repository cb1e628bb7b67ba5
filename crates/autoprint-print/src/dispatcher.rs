// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print dispatch: the last hop between a validated document and the OS
// print subsystem.
//
// Sequence per job:
// 1. Printer status check (optional, on by default).
// 2. Wait until the source file can be opened exclusively (lock retries).
// 3. Short settle delay.
// 4. Submit the absolute path to the backend.
//
// Once the backend has been called the submission is never aborted, even on
// shutdown. A failed job is reported, not retried.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use autoprint_core::config::DispatchConfig;
use autoprint_core::error::{AutoprintError, Result};
use autoprint_core::types::PrintJob;

use crate::backend::PrintBackend;
use crate::retry::sleep_or_cancel;

/// Submits validated jobs to a print backend.
pub struct Dispatcher {
    backend: Arc<dyn PrintBackend>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn PrintBackend>, config: DispatchConfig) -> Self {
        Self { backend, config }
    }

    /// Dispatch `job`, moving it to `Delivered` or `Failed`.
    ///
    /// On success the job's `source_path` is replaced with the absolute path
    /// that was submitted.
    #[instrument(skip_all, fields(job_id = %job.id, path = %job.source_path.display(), printer = %job.target_printer.name))]
    pub async fn dispatch(&self, job: &mut PrintJob, cancel: &CancellationToken) -> Result<()> {
        match self.try_dispatch(job, cancel).await {
            Ok(submitted) => {
                job.source_path = submitted;
                job.mark_delivered();
                info!(
                    path = %job.source_path.display(),
                    printer = %job.target_printer,
                    "sent to printer"
                );
                Ok(())
            }
            Err(err) => {
                job.mark_failed(err.to_string());
                Err(err)
            }
        }
    }

    async fn try_dispatch(&self, job: &PrintJob, cancel: &CancellationToken) -> Result<PathBuf> {
        let printer = job.target_printer.name.clone();

        if self.config.check_printer_status {
            self.ensure_printer_ready(&printer).await?;
        } else {
            debug!("printer status check disabled");
        }

        self.wait_until_unlocked(&job.source_path, cancel).await?;

        // Writers sometimes flush just after releasing their handle.
        tokio::time::sleep(self.config.settle_delay()).await;

        let absolute = std::path::absolute(&job.source_path)?;
        let backend = Arc::clone(&self.backend);
        let submit_path = absolute.clone();

        tokio::task::spawn_blocking(move || backend.submit(&submit_path, &printer))
            .await
            .map_err(|e| AutoprintError::Dispatch(format!("submission task failed: {e}")))?
            .map_err(|e| match e {
                AutoprintError::Dispatch(_) => e,
                other => AutoprintError::Dispatch(other.to_string()),
            })?;

        Ok(absolute)
    }

    /// Fail with `PrinterOffline` unless the backend reports the printer
    /// ready. A status query that itself fails counts as not ready.
    async fn ensure_printer_ready(&self, printer: &str) -> Result<()> {
        let backend = Arc::clone(&self.backend);
        let name = printer.to_string();
        let status = tokio::task::spawn_blocking(move || backend.query_status(&name))
            .await
            .map_err(|e| AutoprintError::PrinterOffline {
                printer: printer.to_string(),
                reason: format!("status task failed: {e}"),
            })?;

        match status {
            Ok(status) if status.is_ready() => {
                debug!(printer, "printer ready");
                Ok(())
            }
            Ok(status) => Err(AutoprintError::PrinterOffline {
                printer: printer.to_string(),
                reason: status.describe(),
            }),
            Err(AutoprintError::PrinterOffline { reason, .. }) => {
                Err(AutoprintError::PrinterOffline {
                    printer: printer.to_string(),
                    reason,
                })
            }
            Err(other) => Err(AutoprintError::PrinterOffline {
                printer: printer.to_string(),
                reason: format!("could not check printer status: {other}"),
            }),
        }
    }

    /// Retry an exclusive open until it succeeds or the budget runs out.
    async fn wait_until_unlocked(&self, path: &Path, cancel: &CancellationToken) -> Result<()> {
        let attempts = self.config.lock_retries;
        let mut missing = false;

        for attempt in 1..=attempts {
            let probe_path = path.to_path_buf();
            let probed = tokio::task::spawn_blocking(move || probe_exclusive(&probe_path))
                .await
                .map_err(|e| AutoprintError::Dispatch(format!("lock probe task failed: {e}")))?;
            match probed {
                Ok(()) => {
                    debug!(attempt, "source file unlocked");
                    return Ok(());
                }
                Err(err) => {
                    missing = err.kind() == std::io::ErrorKind::NotFound;
                    debug!(attempt, max = attempts, error = %err, "source file not accessible yet");
                }
            }

            if attempt < attempts {
                sleep_or_cancel(self.config.lock_retry_delay(), cancel).await?;
            }
        }

        if missing {
            Err(AutoprintError::SourceMissing(path.to_path_buf()))
        } else {
            Err(AutoprintError::FileLocked {
                path: path.to_path_buf(),
                attempts,
            })
        }
    }
}

/// Open `path` without sharing and read one byte.
fn probe_exclusive(path: &Path) -> std::io::Result<()> {
    let mut file = open_exclusive(path)?;
    let mut byte = [0u8; 1];
    let _ = file.read(&mut byte)?;
    Ok(())
}

#[cfg(windows)]
fn open_exclusive(path: &Path) -> std::io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;
    // share_mode(0): fails with a sharing violation while anyone else has
    // the file open.
    std::fs::OpenOptions::new()
        .read(true)
        .share_mode(0)
        .open(path)
}

#[cfg(not(windows))]
fn open_exclusive(path: &Path) -> std::io::Result<File> {
    // Unix locks are advisory; a successful open is the best signal we get.
    File::open(path)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use autoprint_core::types::{JobStatus, PrinterStatus, PrinterTarget};

    use super::*;
    use crate::backend::memory::MemoryBackend;

    fn fast_config() -> DispatchConfig {
        DispatchConfig {
            check_printer_status: true,
            lock_retries: 3,
            lock_retry_delay_ms: 10,
            settle_delay_ms: 1,
        }
    }

    fn job_for(path: PathBuf) -> PrintJob {
        PrintJob::new(
            path,
            PrinterTarget {
                name: "Office".into(),
                is_default: false,
            },
        )
    }

    fn scratch_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"%PDF-1.5 test").expect("write");
        path
    }

    #[tokio::test]
    async fn delivers_absolute_path_to_resolved_printer() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = scratch_file(&dir, "report.pdf");
        let backend = Arc::new(MemoryBackend::single("Office"));
        let dispatcher = Dispatcher::new(backend.clone(), fast_config());

        let mut job = job_for(path.clone());
        dispatcher
            .dispatch(&mut job, &CancellationToken::new())
            .await
            .expect("dispatch");

        assert_eq!(job.status, JobStatus::Delivered);
        let subs = backend.submissions();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].printer, "Office");
        assert!(subs[0].path.is_absolute());
        assert!(subs[0].path.ends_with("report.pdf"));
    }

    #[tokio::test]
    async fn offline_printer_is_never_submitted_to() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = scratch_file(&dir, "report.pdf");
        let backend = Arc::new(MemoryBackend::single("Office"));
        backend.set_status("Office", PrinterStatus::offline());
        let dispatcher = Dispatcher::new(backend.clone(), fast_config());

        let mut job = job_for(path);
        let err = dispatcher
            .dispatch(&mut job, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AutoprintError::PrinterOffline { .. }));
        assert_eq!(job.status, JobStatus::Failed);
        assert!(backend.submissions().is_empty());
    }

    #[tokio::test]
    async fn status_check_can_be_disabled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = scratch_file(&dir, "report.pdf");
        let backend = Arc::new(MemoryBackend::single("Office"));
        backend.set_status(
            "Office",
            PrinterStatus {
                paper_out: true,
                ..PrinterStatus::ready()
            },
        );
        let config = DispatchConfig {
            check_printer_status: false,
            ..fast_config()
        };
        let dispatcher = Dispatcher::new(backend.clone(), config);

        let mut job = job_for(path);
        dispatcher
            .dispatch(&mut job, &CancellationToken::new())
            .await
            .expect("dispatch");
        assert_eq!(backend.submissions().len(), 1);
    }

    #[tokio::test]
    async fn missing_source_exhausts_retries_without_submitting() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = Arc::new(MemoryBackend::single("Office"));
        let dispatcher = Dispatcher::new(backend.clone(), fast_config());

        let mut job = job_for(dir.path().join("vanished.pdf"));
        let err = dispatcher
            .dispatch(&mut job, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AutoprintError::SourceMissing(_)));
        assert!(backend.submissions().is_empty());
    }

    #[tokio::test]
    async fn unreadable_source_exhausts_retries_as_locked() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Present but never readable as a file.
        let path = dir.path().join("report.pdf");
        std::fs::create_dir(&path).expect("mkdir");
        let backend = Arc::new(MemoryBackend::single("Office"));
        let config = fast_config();
        let retries = config.lock_retries;
        let dispatcher = Dispatcher::new(backend.clone(), config);

        let mut job = job_for(path.clone());
        let err = dispatcher
            .dispatch(&mut job, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            AutoprintError::FileLocked { path: p, attempts } => {
                assert_eq!(p, path);
                assert_eq!(attempts, retries);
            }
            other => panic!("expected FileLocked, got {other}"),
        }
        assert_eq!(job.status, JobStatus::Failed);
        assert!(backend.submissions().is_empty());
    }

    #[tokio::test]
    async fn backend_failure_is_reported_as_dispatch_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = scratch_file(&dir, "report.pdf");
        let backend = Arc::new(MemoryBackend::single("Office"));
        backend.fail_submissions("spooler stopped");
        let dispatcher = Dispatcher::new(backend.clone(), fast_config());

        let mut job = job_for(path);
        let err = dispatcher
            .dispatch(&mut job, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AutoprintError::Dispatch(_)));
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error_message.unwrap().contains("spooler stopped"));
    }

    #[tokio::test]
    async fn shutdown_interrupts_lock_wait() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = Arc::new(MemoryBackend::single("Office"));
        let config = DispatchConfig {
            lock_retries: 100,
            lock_retry_delay_ms: 10_000,
            ..fast_config()
        };
        let dispatcher = Dispatcher::new(backend.clone(), config);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let started = Instant::now();
        let mut job = job_for(dir.path().join("never.pdf"));
        let err = dispatcher.dispatch(&mut job, &cancel).await.unwrap_err();

        assert!(matches!(err, AutoprintError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(backend.submissions().is_empty());
    }
}
