// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: minimal blank A4 documents built directly with `lopdf`.
//
// Used by `autoprint --emit-test-page` to push a known-good file through a
// live hot folder, and as the fixture generator for tests and benchmarks.

use std::path::Path;

use autoprint_core::error::{AutoprintError, Result};
use lopdf::{Document, Object, Stream, dictionary};
use tracing::{debug, info, instrument};

/// A4 in PDF points (1/72 inch).
const A4_POINTS: (i64, i64) = (595, 842);

/// Build a PDF with `page_count` empty A4 pages and return its bytes.
#[instrument]
pub fn blank_pdf(page_count: usize) -> Result<Vec<u8>> {
    if page_count == 0 {
        return Err(AutoprintError::InvalidDocument(
            "a document needs at least one page".into(),
        ));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(page_count);
    for _ in 0..page_count {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(page_count as i64),
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(A4_POINTS.0),
            Object::Integer(A4_POINTS.1),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut output = Vec::new();
    doc.save_to(&mut output).map_err(|err| {
        AutoprintError::InvalidDocument(format!("failed to serialise blank PDF: {}", err))
    })?;

    debug!(page_count, output_bytes = output.len(), "blank PDF generated");
    Ok(output)
}

/// Write a blank document to `path`.
pub fn write_blank_pdf(path: &Path, page_count: usize) -> Result<()> {
    let bytes = blank_pdf(page_count)?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), page_count, "test page written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::format::PDF;

    #[test]
    fn output_has_header_and_trailer() {
        let bytes = blank_pdf(1).expect("generate pdf");
        assert!(PDF.has_magic(&bytes));
        assert!(PDF.has_trailer(&bytes));
    }

    #[test]
    fn zero_pages_is_rejected() {
        assert!(blank_pdf(0).is_err());
    }

    #[test]
    fn write_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("test-page.pdf");
        write_blank_pdf(&path, 2).expect("write");
        let written = std::fs::read(&path).expect("read back");
        assert_eq!(PDF.inspect(&written).expect("inspect").page_count, 2);
    }
}
