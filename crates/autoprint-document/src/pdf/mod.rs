// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: format contract, structural reader, and blank-page writer.

pub mod format;
pub mod reader;
pub mod writer;

pub use format::{DocumentFormat, DocumentSummary, PDF};
pub use reader::PdfReader;
pub use writer::{blank_pdf, write_blank_pdf};
