// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Readiness validator: waits until a freshly created file is completely
// written before anything is allowed to print it.
//
// Each attempt runs the checks cheapest-first:
// 1. the file exists
// 2. its size has been unchanged (and non-zero) for N consecutive polls
// 3. it starts with the magic header
// 4. it carries the trailer marker
// 5. it parses structurally
//
// Any failure, including I/O errors, means "not yet". Only running out of
// attempts is terminal.

use std::path::{Path, PathBuf};

use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use autoprint_core::config::ReadinessConfig;
use autoprint_core::error::{AutoprintError, Result};
use autoprint_document::{DocumentFormat, DocumentSummary};
use autoprint_print::retry::sleep_or_cancel;

/// A file that passed every readiness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyDocument {
    /// Absolute path of the validated file.
    pub path: PathBuf,
    pub summary: DocumentSummary,
}

/// Size-stability bookkeeping across polls.
#[derive(Debug, Default)]
struct Stability {
    last_size: u64,
    stable_count: u32,
}

impl Stability {
    fn observe(&mut self, size: u64) -> u32 {
        if size == self.last_size && size > 0 {
            self.stable_count += 1;
        } else {
            self.stable_count = 0;
            self.last_size = size;
        }
        self.stable_count
    }
}

pub struct ReadinessValidator {
    format: DocumentFormat,
    config: ReadinessConfig,
}

impl ReadinessValidator {
    pub fn new(format: DocumentFormat, config: ReadinessConfig) -> Self {
        Self { format, config }
    }

    /// Poll `path` until it is a complete document.
    ///
    /// Bounded by `max_attempts` polls with `retry_delay` between them.
    /// Returns `ReadinessTimeout` when the budget runs out and `Cancelled`
    /// if `cancel` fires during a wait.
    #[instrument(skip(self, cancel), fields(path = %path.display()))]
    pub async fn await_ready(&self, path: &Path, cancel: &CancellationToken) -> Result<ReadyDocument> {
        let max = self.config.max_attempts;
        let mut stability = Stability::default();

        for attempt in 1..=max {
            match self.poll(path, &mut stability).await {
                Ok(summary) => {
                    let path = std::path::absolute(path)?;
                    info!(
                        attempt,
                        pages = summary.page_count,
                        bytes = summary.size,
                        "file ready"
                    );
                    return Ok(ReadyDocument { path, summary });
                }
                Err(reason) => debug!(attempt, max, %reason, "file not ready"),
            }

            if attempt < max {
                sleep_or_cancel(self.config.retry_delay(), cancel).await?;
            }
        }

        Err(AutoprintError::ReadinessTimeout {
            path: path.to_path_buf(),
            attempts: max,
        })
    }

    /// One readiness check. The error string says why the file is not ready.
    async fn poll(&self, path: &Path, stability: &mut Stability) -> std::result::Result<DocumentSummary, String> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err("does not exist".into());
            }
            Err(e) => return Err(format!("cannot stat: {e}")),
        };

        let size = metadata.len();
        let stable = stability.observe(size);
        if stable < self.config.required_stable_polls {
            return Err(format!(
                "size {size} stable for {stable}/{} polls",
                self.config.required_stable_polls
            ));
        }

        let head = read_head(path, self.format.magic.len())
            .await
            .map_err(|e| format!("cannot read header: {e}"))?;
        if !self.format.has_magic(&head) {
            return Err("missing header".into());
        }

        let content = tokio::fs::read(path)
            .await
            .map_err(|e| format!("cannot read content: {e}"))?;
        if !self.format.has_trailer(&content) {
            return Err("missing trailer".into());
        }

        let format = self.format;
        tokio::task::spawn_blocking(move || format.inspect(&content))
            .await
            .map_err(|e| format!("inspection task failed: {e}"))?
            .map_err(|e| e.to_string())
    }
}

async fn read_head(path: &Path, len: usize) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut head = Vec::with_capacity(len);
    file.take(len as u64).read_to_end(&mut head).await?;
    Ok(head)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use autoprint_document::{PDF, blank_pdf};

    use super::*;

    fn fast(max_attempts: u32) -> ReadinessValidator {
        ReadinessValidator::new(
            PDF,
            ReadinessConfig {
                max_attempts,
                retry_delay_ms: 10,
                required_stable_polls: 2,
            },
        )
    }

    #[test]
    fn stability_needs_unchanged_non_zero_size() {
        let mut s = Stability::default();
        assert_eq!(s.observe(0), 0);
        assert_eq!(s.observe(0), 0);
        assert_eq!(s.observe(100), 0);
        assert_eq!(s.observe(100), 1);
        assert_eq!(s.observe(100), 2);
        assert_eq!(s.observe(150), 0);
        assert_eq!(s.observe(150), 1);
    }

    #[tokio::test]
    async fn complete_pdf_becomes_ready() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, blank_pdf(2).expect("pdf")).expect("write");

        let ready = fast(10)
            .await_ready(&path, &CancellationToken::new())
            .await
            .expect("ready");
        assert!(ready.path.is_absolute());
        assert!(ready.path.ends_with("report.pdf"));
        assert_eq!(ready.summary.page_count, 2);
    }

    #[tokio::test]
    async fn single_stable_reading_is_not_enough() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, blank_pdf(1).expect("pdf")).expect("write");

        // Two polls can only observe one repeat of the size.
        let err = fast(2)
            .await_ready(&path, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AutoprintError::ReadinessTimeout { attempts: 2, .. }));
    }

    #[tokio::test]
    async fn missing_file_times_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("never.pdf");
        let err = fast(3)
            .await_ready(&path, &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            AutoprintError::ReadinessTimeout { path: p, attempts } => {
                assert_eq!(p, path);
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_header_never_ready() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fake.pdf");
        let mut content = b"GIF89a".to_vec();
        content.extend(blank_pdf(1).expect("pdf"));
        std::fs::write(&path, content).expect("write");

        let err = fast(5)
            .await_ready(&path, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AutoprintError::ReadinessTimeout { .. }));
    }

    #[tokio::test]
    async fn missing_trailer_never_ready() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("truncated.pdf");
        let full = blank_pdf(1).expect("pdf");
        let cut = full.len() - 16;
        std::fs::write(&path, &full[..cut]).expect("write");

        let err = fast(5)
            .await_ready(&path, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AutoprintError::ReadinessTimeout { .. }));
    }

    #[tokio::test]
    async fn unparsable_body_never_ready() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("garbage.pdf");
        std::fs::write(&path, b"%PDF-1.5\nthis is not a pdf body\n%%EOF\n").expect("write");

        let err = fast(5)
            .await_ready(&path, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AutoprintError::ReadinessTimeout { .. }));
    }

    #[tokio::test]
    async fn slow_writer_is_waited_for() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("slow.pdf");
        let full = blank_pdf(1).expect("pdf");
        std::fs::write(&path, &full[..full.len() / 2]).expect("write half");

        let writer_path = path.clone();
        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(40)).await;
            tokio::fs::write(&writer_path, &full).await.expect("write full");
        });

        let ready = fast(50)
            .await_ready(&path, &CancellationToken::new())
            .await
            .expect("ready");
        writer.await.expect("writer");
        assert_eq!(ready.summary.page_count, 1);
    }

    #[tokio::test]
    async fn exhaustion_is_bounded_in_time() {
        let dir = tempfile::tempdir().expect("tempdir");
        let started = Instant::now();
        let _ = fast(5)
            .await_ready(&dir.path().join("never.pdf"), &CancellationToken::new())
            .await;
        // 4 waits of 10ms plus scheduling slack.
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn cancellation_ends_the_wait() {
        let dir = tempfile::tempdir().expect("tempdir");
        let validator = ReadinessValidator::new(
            PDF,
            ReadinessConfig {
                max_attempts: 100,
                retry_delay_ms: 10_000,
                required_stable_polls: 2,
            },
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = validator
            .await_ready(&dir.path().join("never.pdf"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, AutoprintError::Cancelled));
    }
}
