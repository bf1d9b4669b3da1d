//! PPTX text extraction over the OOXML zip container.
//!
//! Slides are visited in presentation order (the slide id list of the
//! presentation part, resolved through its relationships). Within a slide,
//! every top-level `sp` shape contributes its paragraphs joined by newlines,
//! including shapes with an empty text body. Group contents, pictures,
//! connectors and graphic frames carry no text of their own and are skipped.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, trace};
use zip::result::ZipError;
use zip::ZipArchive;

use super::{DocumentDecoder, DocumentKind, Result};
use crate::error::DecodeError;

const PACKAGE_RELS: &str = "_rels/.rels";
const DEFAULT_PRESENTATION: &str = "ppt/presentation.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// Shape-document decoder.
pub struct SlideDecoder;

impl SlideDecoder {
    /// Create a new PPTX decoder.
    pub fn new() -> Self {
        Self
    }

    /// Extract the text of every text-bearing shape, grouped by slide.
    pub fn slide_texts(&self, data: &[u8]) -> Result<Vec<Vec<String>>> {
        let mut archive =
            ZipArchive::new(Cursor::new(data)).map_err(|e| DecodeError::Archive(e.to_string()))?;

        let presentation = presentation_part(&mut archive)?;
        let presentation_xml = read_part(&mut archive, &presentation)?;
        let slide_ids = slide_relationship_ids(&presentation, &presentation_xml)?;

        let rels_part = rels_path_for(&presentation);
        let targets = match read_optional_part(&mut archive, &rels_part)? {
            Some(xml) => relationship_targets(&rels_part, &xml)?,
            None => HashMap::new(),
        };

        let mut slides = Vec::with_capacity(slide_ids.len());
        for id in slide_ids {
            let Some(target) = targets.get(&id) else {
                debug!("Slide relationship {} has no target, skipping", id);
                continue;
            };
            let part = resolve_target(&presentation, target);
            let xml = read_part(&mut archive, &part)?;
            let shapes = shape_texts(&part, &xml)?;
            trace!("{}: {} text shapes", part, shapes.len());
            slides.push(shapes);
        }

        Ok(slides)
    }
}

impl Default for SlideDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentDecoder for SlideDecoder {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pptx
    }

    fn decode(&self, data: &[u8]) -> Result<String> {
        let slides = self.slide_texts(data)?;
        debug!("PPTX has {} slides", slides.len());
        Ok(slides.into_iter().flatten().collect::<Vec<_>>().join("\n"))
    }
}

fn read_optional_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(DecodeError::Archive(format!("{}: {}", name, e))),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| DecodeError::Archive(format!("{}: {}", name, e)))?;
    Ok(Some(content))
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String> {
    read_optional_part(archive, name)?.ok_or_else(|| DecodeError::MissingPart(name.to_string()))
}

/// Locate the main presentation part through the package relationships.
fn presentation_part(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String> {
    let Some(xml) = read_optional_part(archive, PACKAGE_RELS)? else {
        return Ok(DEFAULT_PRESENTATION.to_string());
    };

    let mut reader = Reader::from_str(&xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Relationship" => {
                let rel_type = attribute(&e, PACKAGE_RELS, b"Type", false)?;
                if rel_type.is_some_and(|t| t.ends_with(OFFICE_DOCUMENT_REL)) {
                    if let Some(target) = attribute(&e, PACKAGE_RELS, b"Target", false)? {
                        return Ok(target.trim_start_matches('/').to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error(PACKAGE_RELS, e)),
        }
    }

    Ok(DEFAULT_PRESENTATION.to_string())
}

/// Relationship ids of the slide id list, in presentation order.
fn slide_relationship_ids(part: &str, xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sldId" => {
                // The numeric `id` attribute is unprefixed; the relationship id is `r:id`.
                if let Some(id) = attribute(&e, part, b"id", true)? {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error(part, e)),
        }
    }
    Ok(ids)
}

/// Map of relationship id to target from a `.rels` part.
fn relationship_targets(part: &str, xml: &str) -> Result<HashMap<String, String>> {
    let mut targets = HashMap::new();
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Relationship" => {
                let id = attribute(&e, part, b"Id", false)?;
                let target = attribute(&e, part, b"Target", false)?;
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error(part, e)),
        }
    }
    Ok(targets)
}

#[derive(Default)]
struct ShapeText {
    paragraphs: Vec<String>,
    paragraph: Option<String>,
    in_run_text: bool,
}

/// Text of each top-level `sp` shape in a slide part.
fn shape_texts(part: &str, xml: &str) -> Result<Vec<String>> {
    let mut shapes = Vec::new();
    let mut group_depth = 0usize;
    let mut current: Option<ShapeText> = None;

    let mut reader = Reader::from_str(xml);
    loop {
        let event = reader.read_event().map_err(|e| xml_error(part, e))?;
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"grpSp" => group_depth += 1,
                b"sp" if group_depth == 0 && current.is_none() => {
                    current = Some(ShapeText::default());
                }
                b"p" => {
                    if let Some(shape) = current.as_mut() {
                        shape.paragraph = Some(String::new());
                    }
                }
                b"t" => {
                    if let Some(shape) = current.as_mut() {
                        shape.in_run_text = true;
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(shape) = current.as_mut() {
                        shape.paragraphs.push(String::new());
                    }
                }
                b"br" => {
                    if let Some(paragraph) = current.as_mut().and_then(|s| s.paragraph.as_mut()) {
                        paragraph.push('\n');
                    }
                }
                b"sp" if group_depth == 0 && current.is_none() => shapes.push(String::new()),
                _ => {}
            },
            Event::Text(t) => {
                if let Some(shape) = current.as_mut().filter(|s| s.in_run_text) {
                    let text = t.unescape().map_err(|e| xml_error(part, e))?;
                    if let Some(paragraph) = shape.paragraph.as_mut() {
                        paragraph.push_str(&text);
                    }
                }
            }
            Event::CData(t) => {
                if let Some(shape) = current.as_mut().filter(|s| s.in_run_text) {
                    if let Some(paragraph) = shape.paragraph.as_mut() {
                        paragraph.push_str(&String::from_utf8_lossy(&t));
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"grpSp" => group_depth = group_depth.saturating_sub(1),
                b"sp" if group_depth == 0 => {
                    if let Some(shape) = current.take() {
                        shapes.push(shape.paragraphs.join("\n"));
                    }
                }
                b"p" => {
                    if let Some(shape) = current.as_mut() {
                        if let Some(paragraph) = shape.paragraph.take() {
                            shape.paragraphs.push(paragraph);
                        }
                    }
                }
                b"t" => {
                    if let Some(shape) = current.as_mut() {
                        shape.in_run_text = false;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

/// Read an attribute by local name. With `prefixed`, only a namespaced
/// attribute matches (distinguishing `r:id` from `id`).
fn attribute(e: &BytesStart<'_>, part: &str, local: &[u8], prefixed: bool) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| DecodeError::Xml {
            part: part.to_string(),
            reason: err.to_string(),
        })?;
        if attr.key.local_name().as_ref() != local || attr.key.prefix().is_some() != prefixed {
            continue;
        }
        let value = attr.unescape_value().map_err(|err| xml_error(part, err))?;
        return Ok(Some(value.into_owned()));
    }
    Ok(None)
}

/// `ppt/presentation.xml` -> `ppt/_rels/presentation.xml.rels`
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_target(source: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn xml_error(part: &str, err: quick_xml::Error) -> DecodeError {
    DecodeError::Xml {
        part: part.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn slide_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
            body
        )
    }

    fn text_shape(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>", p))
            .collect();
        format!("<p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"Title\"/></p:nvSpPr><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>", body)
    }

    /// Slides are listed in presentation order; archive file names are reversed
    /// so archive order and presentation order differ.
    fn build_pptx(slides: &[String]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#).unwrap();

        let ids: String = (0..slides.len())
            .map(|i| format!("<p:sldId id=\"{}\" r:id=\"rId{}\"/>", 256 + i, i + 10))
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
                    i + 10,
                    slides.len() - i
                )
            })
            .collect();
        zip.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
        write!(zip, r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#, rels).unwrap();

        for (i, slide) in slides.iter().enumerate() {
            zip.start_file(format!("ppt/slides/slide{}.xml", slides.len() - i), options)
                .unwrap();
            zip.write_all(slide.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_slides_in_presentation_order() {
        let data = build_pptx(&[
            slide_xml(&text_shape(&["Problem"])),
            slide_xml(&text_shape(&["Solution"])),
            slide_xml(&text_shape(&["Team"])),
        ]);
        let text = SlideDecoder::new().decode(&data).unwrap();
        assert_eq!(text, "Problem\nSolution\nTeam");
    }

    #[test]
    fn test_paragraphs_and_shapes() {
        let body = format!(
            "{}{}",
            text_shape(&["Market", "TAM $4B"]),
            text_shape(&["Pricing &amp; margin"])
        );
        let slides = SlideDecoder::new()
            .slide_texts(&build_pptx(&[slide_xml(&body)]))
            .unwrap();
        assert_eq!(slides, vec![vec!["Market\nTAM $4B".to_string(), "Pricing & margin".to_string()]]);
    }

    #[test]
    fn test_group_and_picture_contents_skipped() {
        let body = format!(
            "<p:grpSp><p:nvGrpSpPr/>{}</p:grpSp><p:pic><p:nvPicPr/></p:pic>{}",
            text_shape(&["Grouped"]),
            text_shape(&["Top level"])
        );
        let slides = SlideDecoder::new()
            .slide_texts(&build_pptx(&[slide_xml(&body)]))
            .unwrap();
        assert_eq!(slides, vec![vec!["Top level".to_string()]]);
    }

    #[test]
    fn test_shape_without_text_body_contributes_empty() {
        let body = format!("<p:sp><p:nvSpPr/></p:sp>{}", text_shape(&["Roadmap"]));
        let text = SlideDecoder::new()
            .decode(&build_pptx(&[slide_xml(&body)]))
            .unwrap();
        assert_eq!(text, "\nRoadmap");
    }

    #[test]
    fn test_line_break_inside_paragraph() {
        let body = "<p:sp><p:txBody><a:p><a:r><a:t>CEO</a:t></a:r><a:br/><a:r><a:t>CTO</a:t></a:r></a:p></p:txBody></p:sp>";
        let text = SlideDecoder::new()
            .decode(&build_pptx(&[slide_xml(body)]))
            .unwrap();
        assert_eq!(text, "CEO\nCTO");
    }

    #[test]
    fn test_empty_deck() {
        let text = SlideDecoder::new().decode(&build_pptx(&[])).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_zip_without_presentation() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"<w:document/>").unwrap();
        let data = zip.finish().unwrap().into_inner();

        let err = SlideDecoder::new().decode(&data).unwrap_err();
        assert!(matches!(err, DecodeError::MissingPart(ref p) if p == "ppt/presentation.xml"));
    }

    #[test]
    fn test_not_a_zip() {
        let err = SlideDecoder::new().decode(b"plain text").unwrap_err();
        assert!(matches!(err, DecodeError::Archive(_)));
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("ppt/presentation.xml", "slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("ppt/presentation.xml", "/ppt/slides/slide2.xml"), "ppt/slides/slide2.xml");
        assert_eq!(resolve_target("ppt/slides/slide1.xml", "../media/image1.png"), "ppt/media/image1.png");
        assert_eq!(rels_path_for("ppt/presentation.xml"), "ppt/_rels/presentation.xml.rels");
    }
}
