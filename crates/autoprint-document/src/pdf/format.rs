// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document format contract: which files are accepted and how a complete one
// is recognised.
//
// The cheap checks (extension, magic header, trailer marker) run on every
// readiness poll; the structural parse only runs once those pass.

use std::path::Path;

use autoprint_core::error::{AutoprintError, Result};
use tracing::{debug, instrument};

use crate::integrity::fingerprint;
use crate::pdf::reader::PdfReader;

/// Byte-level description of a printable document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentFormat {
    /// File extension without the dot, compared case-insensitively.
    pub extension: &'static str,
    /// Bytes every complete file starts with.
    pub magic: &'static [u8],
    /// End-of-content marker.
    pub trailer: &'static [u8],
    /// The trailer must appear within this many bytes of the end of the file.
    pub trailer_window: usize,
}

/// PDF: `%PDF-` header, `%%EOF` within the last kilobyte.
pub const PDF: DocumentFormat = DocumentFormat {
    extension: "pdf",
    magic: b"%PDF-",
    trailer: b"%%EOF",
    trailer_window: 1024,
};

/// What a successful inspection learned about the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub page_count: usize,
    pub version: String,
    pub size: u64,
    /// SHA-256 of the inspected bytes, lowercase hex.
    pub fingerprint: String,
}

impl DocumentFormat {
    /// Whether `path` carries this format's extension.
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension))
    }

    /// Whether `head` starts with the magic header.
    pub fn has_magic(&self, head: &[u8]) -> bool {
        head.starts_with(self.magic)
    }

    /// Whether the trailer marker sits near the end of `content`.
    pub fn has_trailer(&self, content: &[u8]) -> bool {
        let start = content.len().saturating_sub(self.trailer_window);
        content[start..]
            .windows(self.trailer.len())
            .any(|window| window == self.trailer)
    }

    /// Run every completeness check over the full file content.
    ///
    /// Magic and trailer are checked first so a truncated file fails fast
    /// without a parse attempt.
    #[instrument(skip_all, fields(bytes_len = content.len()))]
    pub fn inspect(&self, content: &[u8]) -> Result<DocumentSummary> {
        if !self.has_magic(content) {
            return Err(AutoprintError::InvalidDocument(format!(
                "missing {} header",
                String::from_utf8_lossy(self.magic)
            )));
        }
        if !self.has_trailer(content) {
            return Err(AutoprintError::InvalidDocument(format!(
                "missing {} trailer",
                String::from_utf8_lossy(self.trailer)
            )));
        }

        let reader = PdfReader::from_bytes(content)?;
        let page_count = reader.page_count();
        if page_count == 0 {
            return Err(AutoprintError::InvalidDocument(
                "document has no pages".into(),
            ));
        }

        let summary = DocumentSummary {
            page_count,
            version: reader.version().to_string(),
            size: content.len() as u64,
            fingerprint: fingerprint(content),
        };
        debug!(pages = summary.page_count, version = %summary.version, "document complete");
        Ok(summary)
    }
}
