// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Watch source: recursive directory monitoring via `notify`.
//
// The notify callback runs on the watcher's own thread. It only translates
// events and pushes them onto an unbounded channel; all pipeline work happens
// on the consumer side. Dropping the `WatchSource` stops the watcher, which
// drops the sender and ends the stream.

use std::path::{Path, PathBuf};

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{info, warn};

use autoprint_core::error::{AutoprintError, Result};
use autoprint_core::types::{EventKind, WatchEvent};

/// A running recursive watch over one directory tree.
pub struct WatchSource {
    root: PathBuf,
    _watcher: RecommendedWatcher,
}

impl std::fmt::Debug for WatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSource").field("root", &self.root).finish()
    }
}

impl WatchSource {
    /// Start watching `root` recursively.
    ///
    /// Returns the source (keep it alive for as long as events are wanted)
    /// and the receiving end of the event stream.
    pub fn start(root: &Path) -> Result<(Self, mpsc::UnboundedReceiver<WatchEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for watch_event in translate(&event) {
                    // Receiver gone means the pipeline has shut down.
                    if tx.send(watch_event).is_err() {
                        return;
                    }
                }
            }
            Err(e) => warn!(error = %e, "watch error"),
        })
        .map_err(|e| AutoprintError::Watch(format!("cannot create watcher: {e}")))?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| AutoprintError::Watch(format!("cannot watch {}: {e}", root.display())))?;

        info!(root = %root.display(), "watching directory tree");

        Ok((
            Self {
                root: root.to_path_buf(),
                _watcher: watcher,
            },
            rx,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Convert one notify event into zero or more watch events.
///
/// Access notifications and unclassified events produce nothing.
pub fn translate(event: &Event) -> Vec<WatchEvent> {
    use notify::EventKind as N;

    match &event.kind {
        N::Create(kind) => event
            .paths
            .iter()
            .map(|path| {
                let is_dir = match kind {
                    CreateKind::Folder => true,
                    CreateKind::File => false,
                    _ => path.is_dir(),
                };
                WatchEvent::new(path.clone(), EventKind::Created, is_dir)
            })
            .collect(),

        N::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() >= 2 => {
            let (from, to) = (&event.paths[0], &event.paths[1]);
            vec![WatchEvent::new(from.clone(), EventKind::Moved, to.is_dir()).with_dest(to.clone())]
        }

        N::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|path| WatchEvent::new(path.clone(), EventKind::Moved, path.is_dir()))
            .collect(),

        N::Modify(_) => event
            .paths
            .iter()
            .map(|path| WatchEvent::new(path.clone(), EventKind::Modified, path.is_dir()))
            .collect(),

        N::Remove(kind) => event
            .paths
            .iter()
            .map(|path| {
                WatchEvent::new(path.clone(), EventKind::Deleted, matches!(kind, RemoveKind::Folder))
            })
            .collect(),

        N::Access(_) | N::Any | N::Other => Vec::new(),
    }
}
