// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: structural validation of a candidate document using the
// `lopdf` crate.

use autoprint_core::error::AutoprintError;
use lopdf::Document;
use tracing::{debug, instrument};

/// A parsed PDF, held only long enough to answer structural questions.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    /// Parse PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, AutoprintError> {
        let document = Document::load_mem(data).map_err(|err| {
            AutoprintError::InvalidDocument(format!("failed to parse PDF: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF parsed from bytes");
        Ok(Self { document })
    }

    /// Number of pages reachable from the page tree.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Header version, e.g. "1.5".
    pub fn version(&self) -> &str {
        &self.document.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::writer::blank_pdf;

    #[test]
    fn counts_pages_from_bytes() {
        let bytes = blank_pdf(2).expect("generate pdf");
        let reader = PdfReader::from_bytes(&bytes).expect("parse");
        assert_eq!(reader.page_count(), 2);
        assert_eq!(reader.version(), "1.5");
    }

    #[test]
    fn rejects_non_pdf_bytes() {
        assert!(PdfReader::from_bytes(b"hello world").is_err());
    }
}
