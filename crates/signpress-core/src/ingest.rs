//! Appending source documents to a session.
//!
//! Each valid document contributes one `Page` per non-blank page; every
//! page owns its own copy of the whole document's bytes, because the
//! render and export libraries both operate on whole documents. Invalid
//! inputs are skipped, never fatal to the batch.

use lopdf::Document;

use crate::error::IngestError;
use crate::model::{Page, Session};
use crate::pdf;

/// One uploaded file: display name plus raw bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Parse PDF bytes and return the page count.
pub fn page_count(bytes: &[u8]) -> Result<u32, IngestError> {
    let doc = Document::load_mem(bytes).map_err(|e| IngestError::ParseError(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}

/// Append one document's pages to the session. Blank pages (no content
/// operators) are not listed. Returns how many pages were appended.
pub fn append_document(session: &mut Session, file: &SourceFile) -> Result<usize, IngestError> {
    if file.bytes.is_empty() {
        return Err(IngestError::EmptyFile);
    }
    let doc =
        Document::load_mem(&file.bytes).map_err(|e| IngestError::ParseError(e.to_string()))?;

    let mut appended = 0;
    for (page_number, page_id) in doc.get_pages() {
        if !pdf::page_has_content(&doc, page_id) {
            continue;
        }
        session
            .pages
            .push(Page::new(&file.name, page_number, file.bytes.clone()));
        appended += 1;
    }
    Ok(appended)
}

/// Append a batch of files. A file that fails to decode (empty, corrupt,
/// not a PDF) is skipped with a warning and the rest of the batch still
/// loads. Returns the total number of pages appended.
pub fn append_documents(session: &mut Session, files: &[SourceFile]) -> usize {
    let mut total = 0;
    for file in files {
        match append_document(session, file) {
            Ok(appended) => total += appended,
            Err(e) => {
                tracing::warn!(file = %file.name, error = %e, "skipping file");
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::pdf_with_pages;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_count_of_fixture() {
        let bytes = pdf_with_pages(&[b"q Q", b"q Q", b"q Q"]);
        assert_eq!(page_count(&bytes).unwrap(), 3);
    }

    #[test]
    fn page_count_of_garbage_is_a_parse_error() {
        assert!(matches!(
            page_count(b"not a pdf at all"),
            Err(IngestError::ParseError(_))
        ));
    }

    #[test]
    fn append_fans_out_one_page_per_nonblank_page() {
        let mut session = Session::new("batch");
        let bytes = pdf_with_pages(&[b"q Q", b"", b"BT ET"]);
        let file = SourceFile::new("form.pdf", bytes);

        let appended = append_document(&mut session, &file).unwrap();

        assert_eq!(appended, 2);
        assert_eq!(session.pages.len(), 2);
        assert_eq!(session.pages[0].page_number, 1);
        assert_eq!(session.pages[1].page_number, 3);
        assert!(session
            .pages
            .iter()
            .all(|p| p.file_name == "form.pdf" && p.fields.is_empty()));
    }

    #[test]
    fn pages_each_own_the_whole_document() {
        let mut session = Session::new("batch");
        let bytes = pdf_with_pages(&[b"q Q", b"q Q"]);
        append_document(&mut session, &SourceFile::new("doc.pdf", bytes.clone())).unwrap();

        assert_eq!(session.pages[0].raw_bytes, bytes);
        assert_eq!(session.pages[1].raw_bytes, bytes);
        // Independent copies, not views into one buffer.
        session.pages[0].raw_bytes[0] = b'X';
        assert_eq!(session.pages[1].raw_bytes[0], b'%');
    }

    #[test]
    fn empty_file_is_rejected() {
        let mut session = Session::new("batch");
        let err = append_document(&mut session, &SourceFile::new("empty.pdf", vec![]));
        assert!(matches!(err, Err(IngestError::EmptyFile)));
        assert!(session.pages.is_empty());
    }

    #[test]
    fn batch_skips_bad_files_and_keeps_going() {
        let mut session = Session::new("batch");
        let files = vec![
            SourceFile::new("good.pdf", pdf_with_pages(&[b"q Q"])),
            SourceFile::new("broken.pdf", b"garbage".to_vec()),
            SourceFile::new("empty.pdf", vec![]),
            SourceFile::new("also-good.pdf", pdf_with_pages(&[b"q Q", b"q Q"])),
        ];

        let total = append_documents(&mut session, &files);

        assert_eq!(total, 3);
        let names: Vec<_> = session.pages.iter().map(|p| p.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["good.pdf", "also-good.pdf", "also-good.pdf"]
        );
    }
}
