//! Document probing with lopdf, ahead of rendering.

use std::path::Path;

use lopdf::Document;
use tracing::debug;

use super::Result;
use crate::error::PdfError;

/// What lopdf could tell about a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfProbe {
    /// Number of pages in the page tree.
    pub page_count: u32,
    /// The document was encrypted with an empty user password.
    pub decrypted: bool,
}

/// Open `path` with lopdf and count its pages.
///
/// Encrypted documents are retried with an empty password; anything else
/// fails with [`PdfError::Encrypted`].
pub fn probe(path: &Path) -> Result<PdfProbe> {
    let mut doc = Document::load(path).map_err(|e| PdfError::Parse(e.to_string()))?;

    let mut decrypted = false;
    if doc.is_encrypted() {
        if doc.decrypt("").is_err() {
            return Err(PdfError::Encrypted);
        }
        debug!("Decrypted {} with empty password", path.display());
        decrypted = true;
    }

    let page_count = doc.get_pages().len() as u32;
    debug!("Probed {}: {} pages", path.display(), page_count);

    Ok(PdfProbe {
        page_count,
        decrypted,
    })
}

/// Build an in-memory PDF with `pages` pages, each showing one line of text.
#[cfg(test)]
pub(crate) fn sample_pdf(pages: usize) -> Vec<u8> {
    save(sample_document(pages))
}

/// Like [`sample_pdf`], but with an AES-256 (`/V 5`) encryption dictionary,
/// which no password opens here.
#[cfg(test)]
pub(crate) fn sample_encrypted_pdf(pages: usize) -> Vec<u8> {
    use lopdf::{Object, dictionary};

    let mut doc = sample_document(pages);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => Object::Integer(5),
        "R" => Object::Integer(6),
        "P" => Object::Integer(-4),
    });
    doc.trailer.set("Encrypt", encrypt_id);
    save(doc)
}

#[cfg(test)]
fn save(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[cfg(test)]
fn sample_document(pages: usize) -> Document {
    use lopdf::{Object, Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::with_capacity(pages);
    for n in 0..pages {
        let content = format!("BT /F1 24 Tf 72 700 Td (Page {}) Tj ET", n + 1);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(pages as i64),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}
