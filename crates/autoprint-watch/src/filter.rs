// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Event filter: the first pipeline stage. Only "file created" events for the
// accepted document extension go any further.

use autoprint_core::types::{EventKind, WatchEvent};
use autoprint_document::DocumentFormat;
use tracing::{debug, info};

/// Stateless predicate over raw watch events.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    format: DocumentFormat,
}

impl EventFilter {
    pub fn new(format: DocumentFormat) -> Self {
        Self { format }
    }

    /// Whether events of `kind` can ever start a pipeline run.
    pub fn handles(&self, kind: EventKind) -> bool {
        kind == EventKind::Created
    }

    /// Admit `event` into the pipeline.
    pub fn accept(&self, event: &WatchEvent) -> bool {
        if event.is_directory {
            debug!(path = %event.path.display(), kind = ?event.kind, "directory event");
            return false;
        }

        if !self.handles(event.kind) {
            match (&event.kind, &event.dest_path) {
                (EventKind::Moved, Some(dest)) => debug!(
                    from = %event.path.display(),
                    to = %dest.display(),
                    "file moved"
                ),
                (kind, _) => debug!(path = %event.path.display(), ?kind, "file event"),
            }
            return false;
        }

        info!(path = %event.path.display(), "file created");

        if !self.format.matches_extension(&event.path) {
            debug!(
                path = %event.path.display(),
                extension = self.format.extension,
                "ignoring file with other extension"
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use autoprint_document::PDF;

    use super::*;

    fn filter() -> EventFilter {
        EventFilter::new(PDF)
    }

    #[test]
    fn created_pdf_is_accepted() {
        assert!(filter().accept(&WatchEvent::file_created("/in/report.pdf")));
        assert!(filter().accept(&WatchEvent::file_created("/in/sub/SCAN.PDF")));
    }

    #[test]
    fn other_extensions_are_rejected() {
        assert!(!filter().accept(&WatchEvent::file_created("/in/notes.txt")));
        assert!(!filter().accept(&WatchEvent::file_created("/in/report.pdf.crdownload")));
        assert!(!filter().accept(&WatchEvent::file_created("/in/README")));
    }

    #[test]
    fn directories_are_rejected() {
        let event = WatchEvent::new("/in/archive.pdf", EventKind::Created, true);
        assert!(!filter().accept(&event));
    }

    #[test]
    fn non_created_kinds_are_rejected() {
        for kind in [EventKind::Modified, EventKind::Deleted, EventKind::Moved] {
            let event = WatchEvent::new("/in/report.pdf", kind, false);
            assert!(!filter().accept(&event), "{kind:?} should be filtered");
        }
        let moved = WatchEvent::new("/in/tmp.pdf", EventKind::Moved, false).with_dest("/in/report.pdf");
        assert!(!filter().accept(&moved));
    }
}
