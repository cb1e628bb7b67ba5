// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The event pipeline: filter → debounce → readiness → dispatch.
//
// Events are consumed one at a time, so at most one file is in flight and
// events for the same path are naturally serialised. While a file is waiting
// for readiness or a lock, later events queue up in the channel.
//
// Every per-file error ends at this boundary as a log entry; nothing a single
// file does can stop the loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use autoprint_core::config::AutoprintConfig;
use autoprint_core::error::AutoprintError;
use autoprint_core::types::{ErrorClass, PrintJob, PrinterTarget, WatchEvent};
use autoprint_document::DocumentFormat;
use autoprint_print::backend::PrintBackend;
use autoprint_print::dispatcher::Dispatcher;
use autoprint_print::retry::classify_error;

use crate::debounce::Debouncer;
use crate::filter::EventFilter;
use crate::readiness::ReadinessValidator;

/// What happened to one watch event.
#[derive(Debug)]
pub enum EventOutcome {
    /// Not a created file of the accepted type.
    Filtered,
    /// Duplicate notification inside the cooldown window.
    Debounced,
    Delivered(PrintJob),
    /// Readiness or dispatch failed. The error has already been logged.
    Failed(AutoprintError),
}

/// Counters reported when the pipeline stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub events: u64,
    pub filtered: u64,
    pub debounced: u64,
    pub delivered: u64,
    pub failed: u64,
}

impl PipelineStats {
    fn record(&mut self, outcome: &EventOutcome) {
        self.events += 1;
        match outcome {
            EventOutcome::Filtered => self.filtered += 1,
            EventOutcome::Debounced => self.debounced += 1,
            EventOutcome::Delivered(_) => self.delivered += 1,
            EventOutcome::Failed(_) => self.failed += 1,
        }
    }
}

pub struct Pipeline {
    filter: EventFilter,
    debouncer: Debouncer,
    readiness: ReadinessValidator,
    dispatcher: Dispatcher,
    target: PrinterTarget,
}

impl Pipeline {
    /// Build a pipeline that prints to an already resolved `target`.
    pub fn new(
        config: &AutoprintConfig,
        format: DocumentFormat,
        backend: Arc<dyn PrintBackend>,
        target: PrinterTarget,
    ) -> Self {
        Self {
            filter: EventFilter::new(format),
            debouncer: Debouncer::new(config.debounce.clone()),
            readiness: ReadinessValidator::new(format, config.readiness.clone()),
            dispatcher: Dispatcher::new(backend, config.dispatch.clone()),
            target,
        }
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Run one event through every stage.
    pub async fn handle(&mut self, event: WatchEvent, cancel: &CancellationToken) -> EventOutcome {
        if !self.filter.accept(&event) {
            return EventOutcome::Filtered;
        }
        if !self.debouncer.should_process(&event.path).await {
            return EventOutcome::Debounced;
        }

        let ready = match self.readiness.await_ready(&event.path, cancel).await {
            Ok(ready) => ready,
            Err(err) => return self.fail(&event, err),
        };

        let mut job = PrintJob::new(ready.path, self.target.clone());
        job.fingerprint = Some(ready.summary.fingerprint);
        job.page_count = Some(ready.summary.page_count);

        if let Err(err) = self.dispatcher.dispatch(&mut job, cancel).await {
            return self.fail(&event, err);
        }

        self.debouncer.record_delivered(&event.path).await;
        info!(
            job_id = %job.id,
            path = %job.source_path.display(),
            printer = %job.target_printer.name,
            pages = job.page_count.unwrap_or_default(),
            sha256 = job.fingerprint.as_deref().unwrap_or_default(),
            "print job delivered"
        );
        EventOutcome::Delivered(job)
    }

    fn fail(&self, event: &WatchEvent, err: AutoprintError) -> EventOutcome {
        let path = event.path.display();
        match (&err, classify_error(&err)) {
            (AutoprintError::Cancelled, _) => info!(%path, "processing interrupted by shutdown"),
            (_, ErrorClass::UserAction) => error!(%path, error = %err, "print failed, action required"),
            (_, ErrorClass::Transient) => warn!(%path, error = %err, "print failed, a later event may succeed"),
            (_, ErrorClass::Permanent) => warn!(%path, error = %err, "print failed"),
        }
        EventOutcome::Failed(err)
    }

    /// Consume `events` until the stream ends or `cancel` fires.
    ///
    /// `tick` drives the periodic debounce sweep while the folder is idle.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<WatchEvent>,
        cancel: CancellationToken,
        tick: Duration,
    ) -> PipelineStats {
        let mut stats = PipelineStats::default();
        let mut heartbeat = tokio::time::interval(tick);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(printer = %self.target, "pipeline started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => {
                        let outcome = self.handle(event, &cancel).await;
                        stats.record(&outcome);
                    }
                    None => {
                        debug!("event stream closed");
                        break;
                    }
                },
                _ = heartbeat.tick() => {
                    self.debouncer.sweep(Instant::now());
                }
            }
        }

        // Drain without processing so nothing is left behind in the channel.
        events.close();
        let mut skipped = 0u64;
        while events.recv().await.is_some() {
            skipped += 1;
        }
        if skipped > 0 {
            debug!(skipped, "discarded queued events at shutdown");
        }

        info!(
            events = stats.events,
            delivered = stats.delivered,
            failed = stats.failed,
            "pipeline stopped"
        );
        stats
    }
}
