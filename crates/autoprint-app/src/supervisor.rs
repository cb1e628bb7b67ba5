// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Watch supervisor: owns startup, the running pipeline and shutdown.
//
// Startup order: validate config → check the watch root → resolve the
// printer → start watching. Any failure before watching starts is fatal.
// Shutdown: cancel → drop the watcher → wait for the pipeline to finish.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use autoprint_core::config::AutoprintConfig;
use autoprint_core::error::{AutoprintError, Result};
use autoprint_core::types::PrinterTarget;
use autoprint_document::{PDF, write_blank_pdf};
use autoprint_print::backend::memory::MemoryBackend;
use autoprint_print::backend::{PrintBackend, system_backend};
use autoprint_print::resolver::PrinterResolver;
use autoprint_watch::{Pipeline, PipelineStats, WatchSource};

/// Run until Ctrl-C.
pub async fn run(config: AutoprintConfig) -> Result<()> {
    let backend: Arc<dyn PrintBackend> = if config.dry_run {
        let name = config.printer_name.clone().unwrap_or_else(|| "dry-run".to_string());
        warn!(printer = %name, "dry run: documents will be validated but not printed");
        Arc::new(MemoryBackend::single(name))
    } else {
        system_backend()
    };

    let stats = watch(config, backend, shutdown_signal()).await?;
    info!(
        delivered = stats.delivered,
        failed = stats.failed,
        "autoprint stopped"
    );
    Ok(())
}

/// Watch until `shutdown` completes and return the pipeline's counters.
pub async fn watch<F>(
    config: AutoprintConfig,
    backend: Arc<dyn PrintBackend>,
    shutdown: F,
) -> Result<PipelineStats>
where
    F: Future<Output = ()>,
{
    config.validate()?;
    validate_root(&config.watch_path)?;

    let target = resolve_printer(Arc::clone(&backend), config.printer_name.clone()).await?;
    info!(printer = %target, backend = backend.name(), "printer resolved");

    let (source, events) = WatchSource::start(&config.watch_path)?;
    let cancel = CancellationToken::new();
    let pipeline = Pipeline::new(&config, PDF, backend, target);
    let task = tokio::spawn(pipeline.run(events, cancel.clone(), config.poll_interval()));

    shutdown.await;
    info!("shutdown requested");

    cancel.cancel();
    drop(source);
    task.await
        .map_err(|e| AutoprintError::Watch(format!("pipeline task failed: {e}")))
}

/// The watch root must exist and be a directory.
pub fn validate_root(root: &Path) -> Result<()> {
    let metadata = std::fs::metadata(root).map_err(|e| {
        AutoprintError::Config(format!("watch path {} is not accessible: {e}", root.display()))
    })?;
    if !metadata.is_dir() {
        return Err(AutoprintError::Config(format!(
            "watch path {} is not a directory",
            root.display()
        )));
    }
    Ok(())
}

async fn resolve_printer(
    backend: Arc<dyn PrintBackend>,
    name: Option<String>,
) -> Result<PrinterTarget> {
    tokio::task::spawn_blocking(move || PrinterResolver::new(backend).resolve(name.as_deref()))
        .await
        .map_err(|e| AutoprintError::PrinterEnumeration(format!("resolver task failed: {e}")))?
}

/// Print every known printer to stdout, marking the default.
pub async fn list_printers(backend: Arc<dyn PrintBackend>) -> Result<()> {
    let printers = tokio::task::spawn_blocking(move || PrinterResolver::new(backend).list())
        .await
        .map_err(|e| AutoprintError::PrinterEnumeration(format!("resolver task failed: {e}")))??;

    if printers.is_empty() {
        println!("no printers found");
    }
    for printer in printers {
        println!("{printer}");
    }
    Ok(())
}

/// Write a blank one-page PDF, e.g. into the watched folder.
pub fn emit_test_page(path: &Path) -> Result<()> {
    write_blank_pdf(path, 1)?;
    println!("wrote test page to {}", path.display());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for Ctrl-C; stop the process another way");
        std::future::pending::<()>().await;
    }
}
