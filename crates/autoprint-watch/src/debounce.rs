// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Debouncer: suppresses repeat "created" notifications for the same write.
//
// A path is admitted when it has no record, when its cooldown has elapsed, or
// when its on-disk modification time differs from the recorded one. Records
// older than the retention horizon are swept so the table stays bounded.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

use autoprint_core::config::{DebounceConfig, DeliveredPolicy};
use autoprint_core::types::FileTrackingRecord;
use tracing::debug;

/// Owner of the per-path tracking table.
#[derive(Debug)]
pub struct Debouncer {
    config: DebounceConfig,
    records: HashMap<PathBuf, FileTrackingRecord>,
}

impl Debouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            records: HashMap::new(),
        }
    }

    /// Decide whether `path` should be processed now.
    ///
    /// Fails closed: a path whose modification time cannot be read is
    /// rejected.
    pub async fn should_process(&mut self, path: &Path) -> bool {
        match modified_time(path).await {
            Ok(mtime) => self.should_process_at(path, mtime, Instant::now()),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "cannot stat file, skipping");
                false
            }
        }
    }

    /// Core decision with the clock and mtime supplied by the caller.
    pub fn should_process_at(&mut self, path: &Path, mtime: SystemTime, now: Instant) -> bool {
        if let Some(record) = self.records.get(path) {
            let elapsed = now.saturating_duration_since(record.last_processed_at);
            if elapsed < self.config.cooldown() && mtime == record.last_mod_time {
                debug!(
                    path = %path.display(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "duplicate event within cooldown"
                );
                return false;
            }
        }

        self.records
            .insert(path.to_path_buf(), FileTrackingRecord::new(path, now, mtime));
        self.sweep(now);
        true
    }

    /// Drop records older than the retention horizon. Returns how many went.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let retention = self.config.retention();
        let before = self.records.len();
        self.records
            .retain(|_, record| now.saturating_duration_since(record.last_processed_at) <= retention);
        let removed = before - self.records.len();
        if removed > 0 {
            debug!(removed, remaining = self.records.len(), "expired debounce records");
        }
        removed
    }

    /// Apply the delivery policy after `path` was printed.
    pub async fn record_delivered(&mut self, path: &Path) {
        let mtime = modified_time(path).await.ok();
        self.record_delivered_at(path, mtime, Instant::now());
    }

    /// [`record_delivered`](Self::record_delivered) with an explicit clock.
    ///
    /// `mtime` is `None` when the file has already gone; its record is then
    /// dropped since no later event can match it.
    pub fn record_delivered_at(&mut self, path: &Path, mtime: Option<SystemTime>, now: Instant) {
        match self.config.on_delivered {
            DeliveredPolicy::ClearAll => {
                debug!(cleared = self.records.len(), "clearing debounce table");
                self.records.clear();
            }
            DeliveredPolicy::RefreshPath => match mtime {
                Some(mtime) => {
                    self.records
                        .insert(path.to_path_buf(), FileTrackingRecord::new(path, now, mtime));
                }
                None => {
                    self.records.remove(path);
                }
            },
        }
    }

    pub fn get(&self, path: &Path) -> Option<&FileTrackingRecord> {
        self.records.get(path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

async fn modified_time(path: &Path) -> std::io::Result<SystemTime> {
    tokio::fs::metadata(path).await?.modified()
}
