//! In-memory deck fixtures.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// How the page font is declared.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum PdfFont {
    /// Helvetica with WinAnsiEncoding.
    Standard,
    /// As `Standard` but without `/Type /Font`; lopdf cannot decode its
    /// text while pdf-extract can.
    Untyped,
    /// Text references a font but the page has no resources.
    Missing,
}

/// Encryption dictionary attached to the document.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum PdfEncryption {
    /// RC4 without a user password check, so the empty password opens it.
    EmptyPassword,
    /// A user password hash the empty password does not match.
    UserPassword,
}

/// Builder for PDF fixtures with one line of text per page.
pub struct PdfFixture<'a> {
    pages: &'a [&'a str],
    font: PdfFont,
    encryption: Option<PdfEncryption>,
}

impl<'a> PdfFixture<'a> {
    pub fn new(pages: &'a [&'a str]) -> Self {
        Self {
            pages,
            font: PdfFont::Standard,
            encryption: None,
        }
    }

    pub fn font(mut self, font: PdfFont) -> Self {
        self.font = font;
        self
    }

    pub fn encryption(mut self, encryption: PdfEncryption) -> Self {
        self.encryption = Some(encryption);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let resources_id = match self.font {
            PdfFont::Missing => None,
            font => {
                let mut font_dict = dictionary! {
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                    "Encoding" => "WinAnsiEncoding",
                };
                if font == PdfFont::Standard {
                    font_dict.set("Type", "Font");
                }
                let font_id = doc.add_object(font_dict);
                Some(doc.add_object(dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                }))
            }
        };

        let mut kids = Vec::new();
        for text in self.pages {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            };
            if let Some(resources_id) = resources_id {
                page.set("Resources", resources_id);
            }
            if !text.is_empty() {
                let content = Content {
                    operations: vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 12.into()]),
                        Operation::new("Td", vec![72.into(), 700.into()]),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ],
                };
                let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
                page.set("Contents", content_id);
            }
            kids.push(Object::from(doc.add_object(page)));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if let Some(encryption) = self.encryption {
            let mut encrypt = dictionary! {
                "Filter" => "Standard",
                "V" => 2,
                "R" => 3,
                "Length" => 128,
                "P" => -4,
                "O" => Object::String(vec![0x5a; 32], StringFormat::Hexadecimal),
                "CF" => dictionary! { "StdCF" => dictionary! { "CFM" => "V2" } },
            };
            if encryption == PdfEncryption::UserPassword {
                encrypt.set("U", Object::String(vec![0; 32], StringFormat::Hexadecimal));
            }
            let encrypt_id = doc.add_object(encrypt);
            doc.trailer.set("Encrypt", encrypt_id);
            doc.trailer.set(
                "ID",
                vec![
                    Object::String(vec![1; 16], StringFormat::Hexadecimal),
                    Object::String(vec![2; 16], StringFormat::Hexadecimal),
                ],
            );
        }

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }
}

/// A PDF with one line of Helvetica text per page. Empty strings give blank pages.
pub fn pdf_deck(pages: &[&str]) -> Vec<u8> {
    PdfFixture::new(pages).build()
}

/// A PPTX whose slides each hold one text shape per entry.
pub fn pptx_deck(slides: &[&[&str]]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#).unwrap();

    let ids: String = (0..slides.len())
        .map(|i| format!("<p:sldId id=\"{}\" r:id=\"rId{}\"/>", 256 + i, i + 2))
        .collect();
    zip.start_file("ppt/presentation.xml", options).unwrap();
    write!(
        zip,
        r#"<?xml version="1.0"?><p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
        ids
    )
    .unwrap();

    let rels: String = (0..slides.len())
        .map(|i| {
            format!(
                "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" Target=\"slides/slide{}.xml\"/>",
                i + 2,
                i + 1
            )
        })
        .collect();
    zip.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
    write!(zip, r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#, rels).unwrap();

    for (i, shapes) in slides.iter().enumerate() {
        let body: String = shapes
            .iter()
            .map(|text| {
                format!(
                    "<p:sp><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>",
                    text
                )
            })
            .collect();
        zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), options).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
            body
        )
        .unwrap();
    }

    zip.finish().unwrap().into_inner()
}
