//! PDF text extraction for uploaded SRS documents.
//!
//! `lopdf` loads the document first so that unreadable bytes and page-less
//! documents are told apart from documents that merely contain no text.
//! `pdf-extract` then produces the plain text of every page.

use std::panic::{self, AssertUnwindSafe};

use srsguard_shared::{ExtractionKind, Result, SrsGuardError};
use tracing::{debug, warn};

/// Detail reported for bytes that are not a loadable PDF.
pub const INVALID_PDF: &str = "Invalid PDF file format";

/// Detail reported for a PDF with an empty page tree.
pub const NO_PAGES: &str = "PDF file contains no pages";

/// Detail reported for a PDF whose pages yield only whitespace.
pub const NO_TEXT: &str = "PDF file contains no extractable text";

/// Detail reported when the extractor fails on a loadable document.
pub const EXTRACTION_FAILED: &str = "Failed to extract text from PDF";

/// Extract the full text of a PDF held in memory.
///
/// Errors carry an [`ExtractionKind`]: `Corrupt` for bytes that do not parse,
/// `Empty` for zero pages or whitespace-only text, `Failed` when text
/// extraction breaks on a document that did load.
pub fn extract_text(data: &[u8]) -> Result<String> {
    let page_count = count_pages(data)?;
    if page_count == 0 {
        return Err(SrsGuardError::extraction(ExtractionKind::Empty, NO_PAGES));
    }

    // pdf-extract panics on some malformed font and encoding tables.
    let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(data)
    }));

    let text = match extracted {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!(error = %e, "pdf text extraction failed");
            return Err(SrsGuardError::extraction(
                ExtractionKind::Failed,
                format!("{EXTRACTION_FAILED}: {e}"),
            ));
        }
        Err(_) => {
            warn!("pdf text extraction panicked");
            return Err(SrsGuardError::extraction(
                ExtractionKind::Failed,
                EXTRACTION_FAILED,
            ));
        }
    };

    if text.trim().is_empty() {
        return Err(SrsGuardError::extraction(ExtractionKind::Empty, NO_TEXT));
    }

    debug!(pages = page_count, chars = text.len(), "extracted pdf text");
    Ok(text)
}

/// Number of pages in the document, or a `Corrupt` error if it does not load.
pub fn count_pages(data: &[u8]) -> Result<usize> {
    let doc = lopdf::Document::load_mem(data).map_err(|e| {
        debug!(error = %e, "bytes are not a loadable pdf");
        SrsGuardError::extraction(ExtractionKind::Corrupt, INVALID_PDF)
    })?;
    Ok(doc.get_pages().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    /// Build a PDF with one page per entry; each entry is that page's lines.
    fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for lines in pages {
            let mut operations = Vec::new();
            if !lines.is_empty() {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new("TL", vec![20.into()]));
                operations.push(Operation::new("Td", vec![100.into(), 750.into()]));
                for line in lines.iter() {
                    operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                    operations.push(Operation::new("T*", vec![]));
                }
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encode")));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("save pdf");
        buf
    }

    #[test]
    fn extracts_text_from_srs_pages() {
        let pdf = build_pdf(&[&[
            "1.1 Purpose: The purpose of this project is testing",
            "1.4 Product Scope: Fake SRS scope",
        ]]);
        let text = extract_text(&pdf).expect("extract");
        assert!(text.contains("Purpose"));
        assert!(text.contains("Product Scope"));
    }

    #[test]
    fn counts_pages() {
        let pdf = build_pdf(&[&["one"], &["two"], &["three"]]);
        assert_eq!(count_pages(&pdf).unwrap(), 3);
    }

    #[test]
    fn rejects_non_pdf_bytes() {
        let err = extract_text(b"Not a PDF file").unwrap_err();
        match err {
            SrsGuardError::Extraction { kind, message } => {
                assert_eq!(kind, ExtractionKind::Corrupt);
                assert_eq!(message, INVALID_PDF);
            }
            other => panic!("expected extraction error, got {other:?}"),
        }
    }

    #[test]
    fn blank_page_has_no_extractable_text() {
        let pdf = build_pdf(&[&[]]);
        let err = extract_text(&pdf).unwrap_err();
        match err {
            SrsGuardError::Extraction { kind, message } => {
                assert_eq!(kind, ExtractionKind::Empty);
                assert!(message.contains("no extractable text"));
            }
            other => panic!("expected extraction error, got {other:?}"),
        }
    }

    #[test]
    fn zero_pages_is_empty_document() {
        let pdf = build_pdf(&[]);
        let err = extract_text(&pdf).unwrap_err();
        assert!(matches!(
            err,
            SrsGuardError::Extraction {
                kind: ExtractionKind::Empty,
                ..
            }
        ));
        assert!(err.to_string().contains("no pages"));
    }
}
