//! Page-oriented PDF text extraction.
//!
//! Uploaded bytes are staged in a randomly named file under the upload
//! directory for the duration of the extraction. The file is removed when
//! the guard drops, so every exit path cleans up.

use std::io::Write;
use std::path::Path;

use lopdf::Document;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid PDF: {0}")]
    InvalidPdf(#[from] lopdf::Error),
    #[error("failed to stage upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Extracts the text of every page of the PDF at `path`, in page order.
///
/// Pages without extractable text yield an empty string, so the result
/// always has one entry per page.
pub fn extract_pages(path: &Path) -> Result<Vec<String>, ExtractError> {
    let doc = Document::load(path)?;

    let pages = doc
        .get_pages()
        .into_keys()
        .map(|page_number| match doc.extract_text(&[page_number]) {
            Ok(text) => text.trim_end().to_string(),
            Err(e) => {
                debug!(page = page_number, error = %e, "no extractable text on page");
                String::new()
            }
        })
        .collect();

    Ok(pages)
}

/// Writes `bytes` to a transient file in `upload_dir`, extracts its text and
/// removes the file again. Pages are joined with `\n`.
pub fn extract_pdf_text(bytes: &[u8], upload_dir: &Path) -> Result<String, ExtractError> {
    let mut staged = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(".pdf")
        .tempfile_in(upload_dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;

    let pages = extract_pages(staged.path())?;
    debug!(pages = pages.len(), path = %staged.path().display(), "extracted PDF text");

    if let Err(e) = staged.close() {
        warn!(error = %e, "failed to remove staged upload");
    }

    Ok(pages.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Builds a PDF with one page per entry; `None` produces a page with no
    /// content stream.
    fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in pages {
            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            };
            if let Some(text) = page {
                let content = Content {
                    operations: vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 24.into()]),
                        Operation::new("Td", vec![72.into(), 720.into()]),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ],
                };
                let content_id =
                    doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
                page_dict.set("Contents", content_id);
            }
            kids.push(doc.add_object(page_dict).into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn extracts_one_entry_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, build_pdf(&[Some("Alpha"), None, Some("Gamma")])).unwrap();

        let pages = extract_pages(&path).unwrap();

        assert_eq!(pages.len(), 3);
        assert!(pages[0].contains("Alpha"));
        assert_eq!(pages[1], "");
        assert!(pages[2].contains("Gamma"));
    }

    #[test]
    fn joins_pages_with_newlines_and_removes_staged_file() {
        let dir = tempfile::tempdir().unwrap();

        let text = extract_pdf_text(&build_pdf(&[Some("Alpha"), Some("Beta")]), dir.path())
            .unwrap();

        let alpha = text.find("Alpha").unwrap();
        let beta = text.find("Beta").unwrap();
        assert!(alpha < beta);
        assert!(text[alpha..beta].contains('\n'));
        assert!(dir_is_empty(dir.path()));
    }

    #[test]
    fn blank_page_contributes_empty_line() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = build_pdf(&[Some("Alpha"), None, Some("Gamma")]);

        let text = extract_pdf_text(&pdf, dir.path()).unwrap();

        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 3, "unexpected text: {text:?}");
        assert_eq!(lines[0].trim(), "Alpha");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2].trim(), "Gamma");
    }

    #[test]
    fn invalid_pdf_fails_and_removes_staged_file() {
        let dir = tempfile::tempdir().unwrap();

        let result = extract_pdf_text(b"definitely not a pdf", dir.path());

        assert!(matches!(result, Err(ExtractError::InvalidPdf(_))));
        assert!(dir_is_empty(dir.path()));
    }

    #[test]
    fn missing_upload_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let result = extract_pdf_text(&build_pdf(&[Some("Alpha")]), &missing);

        assert!(matches!(result, Err(ExtractError::Io(_))));
    }
}
