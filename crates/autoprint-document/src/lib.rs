// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// autoprint-document: Document checks for the autoprint pipeline.
//
// Decides whether a file on disk is a complete, printable PDF (magic header,
// trailer marker, parsable page tree), fingerprints the validated bytes, and
// can generate blank test documents.

pub mod integrity;
pub mod pdf;

// Re-export the primary items so callers can use `autoprint_document::PDF` etc.
pub use integrity::fingerprint;
pub use pdf::{DocumentFormat, DocumentSummary, PDF, PdfReader, blank_pdf, write_blank_pdf};
