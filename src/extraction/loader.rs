//! Plain-text loaders for uploaded documents.
//!
//! Both loaders are synchronous and read from a path on disk; callers run
//! them on the blocking pool.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::document_type::DocumentFormat;

const DOCX_BODY_PART: &str = "word/document.xml";

/// Upper bound on the decompressed size of `word/document.xml`.
pub const MAX_DOCX_XML_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File is not a valid Word document: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to parse Word document XML: {0}")]
    Xml(String),

    #[error("Failed to read PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF has no pages")]
    EmptyPdf,

    #[error("Word document body exceeds {0} bytes when decompressed")]
    TooLarge(u64),
}

pub fn load_text(format: DocumentFormat, path: &Path) -> Result<String, LoaderError> {
    match format {
        DocumentFormat::Docx => load_docx(path),
        DocumentFormat::Pdf => load_pdf(path),
    }
}

/// Text of the main document part: runs joined, one line per paragraph.
pub fn load_docx(path: &Path) -> Result<String, LoaderError> {
    load_docx_bounded(path, MAX_DOCX_XML_BYTES)
}

fn load_docx_bounded(path: &Path, limit: u64) -> Result<String, LoaderError> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let xml = read_bounded(archive.by_name(DOCX_BODY_PART)?, limit)?;
    document_xml_to_text(&xml)
}

// The declared size in the zip header is not trusted; the stream is cut off instead.
fn read_bounded<R: Read>(reader: R, limit: u64) -> Result<String, LoaderError> {
    let mut buf = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut buf)?;
    if buf.len() as u64 > limit {
        return Err(LoaderError::TooLarge(limit));
    }
    String::from_utf8(buf).map_err(|e| LoaderError::Xml(e.to_string()))
}

fn document_xml_to_text(xml: &str) -> Result<String, LoaderError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_run_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_run_text => {
                let unescaped = t.unescape().map_err(|e| LoaderError::Xml(e.to_string()))?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(LoaderError::Xml(format!(
                    "at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
        }
    }

    Ok(text)
}

/// Text of every page, in page order.
pub fn load_pdf(path: &Path) -> Result<String, LoaderError> {
    let document = lopdf::Document::load(path)?;
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    if pages.is_empty() {
        return Err(LoaderError::EmptyPdf);
    }

    let mut text = String::new();
    for page in pages {
        let page_text = document.extract_text(&[page])?;
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(page_text.trim_end());
    }
    Ok(text)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    fn escape_xml(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    /// Minimal .docx with one paragraph per entry of `paragraphs`.
    pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| {
                format!(
                    r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                    escape_xml(p)
                )
            })
            .collect();
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
            .unwrap();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(document.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    /// Single-page PDF showing `text` in Helvetica.
    pub fn pdf_bytes(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let content = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
            page.set("Parent", pages_id);
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(bytes: &[u8], suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let file = write_temp(
            &fixtures::docx_bytes(&["PODER GENERAL", "Apoderado: Juan Pérez & Asociados"]),
            ".docx",
        );

        let text = load_text(DocumentFormat::Docx, file.path()).unwrap();
        assert_eq!(text, "PODER GENERAL\nApoderado: Juan Pérez & Asociados\n");
    }

    #[test]
    fn test_docx_tabs_and_breaks() {
        let xml = r#"<w:document xmlns:w="urn:w"><w:body><w:p><w:r><w:t>Notario</w:t><w:tab/><w:t>15</w:t><w:br/><w:t>CDMX</w:t></w:r></w:p></w:body></w:document>"#;
        assert_eq!(document_xml_to_text(xml).unwrap(), "Notario\t15\nCDMX\n");
    }

    #[test]
    fn test_docx_ignores_text_outside_runs() {
        let xml = r#"<w:document xmlns:w="urn:w"><w:body><w:p><w:pPr>ignored</w:pPr><w:r><w:t>kept</w:t></w:r></w:p></w:body></w:document>"#;
        assert_eq!(document_xml_to_text(xml).unwrap(), "kept\n");
    }

    #[test]
    fn test_docx_malformed_xml_is_error() {
        let result = document_xml_to_text("<w:document><w:body></w:p></w:document>");
        assert!(matches!(result, Err(LoaderError::Xml(_))));
    }

    #[test]
    fn test_docx_without_body_part_is_error() {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        zip.start_file("notes.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"not a word document").unwrap();
        let bytes = zip.finish().unwrap().into_inner();
        let file = write_temp(&bytes, ".docx");

        let result = load_docx(file.path());
        assert!(matches!(result, Err(LoaderError::Zip(_))));
    }

    #[test]
    fn test_oversized_docx_body_is_rejected() {
        let padding = " ".repeat(64 * 1024);
        let file = write_temp(&fixtures::docx_bytes(&[&padding]), ".docx");

        let result = load_docx_bounded(file.path(), 4 * 1024);
        assert!(matches!(result, Err(LoaderError::TooLarge(4096))));

        let text = load_docx_bounded(file.path(), MAX_DOCX_XML_BYTES).unwrap();
        assert_eq!(text.len(), padding.len() + 1);
    }

    #[test]
    fn test_read_bounded_accepts_exact_limit() {
        assert_eq!(read_bounded(&b"abcd"[..], 4).unwrap(), "abcd");
        assert!(matches!(read_bounded(&b"abcde"[..], 4), Err(LoaderError::TooLarge(4))));
        assert!(matches!(read_bounded(&[0xff, 0xfe][..], 4), Err(LoaderError::Xml(_))));
    }

    #[test]
    fn test_empty_bytes_fail_for_both_formats() {
        let docx = write_temp(b"", ".docx");
        assert!(load_text(DocumentFormat::Docx, docx.path()).is_err());

        let pdf = write_temp(b"", ".pdf");
        assert!(load_text(DocumentFormat::Pdf, pdf.path()).is_err());
    }

    #[test]
    fn test_pdf_text_is_extracted() {
        let file = write_temp(&fixtures::pdf_bytes("Constancia de Situacion Fiscal"), ".pdf");

        let text = load_pdf(file.path()).unwrap();
        assert!(
            text.contains("Constancia") || text.contains("Fiscal"),
            "unexpected PDF text: {text}"
        );
    }

    #[test]
    fn test_garbage_pdf_is_error() {
        let file = write_temp(b"%PDF-1.4 this is not really a pdf", ".pdf");
        assert!(matches!(load_pdf(file.path()), Err(LoaderError::Pdf(_))));
    }
}
