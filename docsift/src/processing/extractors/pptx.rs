//! PPTX extractor using zip + quick-xml

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use tracing::warn;

use super::ooxml::{
    attr_value, rels_path_for, resolve_reference, resolve_target, Fragment, Package, Relationship,
};
use super::ExtractedContent;
use crate::error::{DocsiftError, Result};
use crate::models::DocumentType;
use crate::ocr::MistralOcrClient;

const PRESENTATION_PART: &str = "ppt/presentation.xml";

pub struct PptxExtractor;

/// Text collected for the `p:sp` shape currently being read.
#[derive(Default)]
struct ShapeText {
    paragraphs: Vec<String>,
    current: String,
}

impl PptxExtractor {
    /// Extract slide text shape by shape, OCR-ing picture shapes in place.
    pub async fn extract(bytes: &[u8], ocr: &MistralOcrClient) -> Result<ExtractedContent> {
        let mut package = Package::open(bytes, DocumentType::Pptx)?;
        let fragments = Self::fragments(&mut package)?;
        let text = package.render(fragments, ocr).await;

        Ok(ExtractedContent::new(text, DocumentType::Pptx))
    }

    /// Read all slides into ordered fragments without running OCR.
    pub fn extract_fragments(bytes: &[u8]) -> Result<Vec<Fragment>> {
        let mut package = Package::open(bytes, DocumentType::Pptx)?;
        Self::fragments(&mut package)
    }

    fn fragments(package: &mut Package<'_>) -> Result<Vec<Fragment>> {
        let mut fragments = Vec::new();

        for slide_part in Self::slide_parts(package)? {
            let Some(xml) = package.read_optional_string(&slide_part)? else {
                warn!(slide = %slide_part, "Slide listed in presentation but missing from package");
                continue;
            };
            let rels = package.relationships(&rels_path_for(&slide_part))?;
            fragments.extend(Self::parse_slide(&slide_part, &xml, &rels)?);
        }

        Ok(fragments)
    }

    /// Slide part names in presentation order.
    fn slide_parts(package: &mut Package<'_>) -> Result<Vec<String>> {
        let xml = package.read_string(PRESENTATION_PART)?;
        let slide_ids = Self::slide_order(&xml)?;
        let mapping = package.relationships(&rels_path_for(PRESENTATION_PART))?;

        Ok(slide_ids
            .iter()
            .enumerate()
            .map(|(index, r_id)| match mapping.get(r_id) {
                Some(rel) if rel.rel_type.ends_with("/slide") || rel.rel_type.is_empty() => {
                    resolve_target(PRESENTATION_PART, &rel.target)
                }
                _ => format!("ppt/slides/slide{}.xml", index + 1),
            })
            .collect())
    }

    fn slide_order(xml: &str) -> Result<Vec<String>> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut slide_ids = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    if e.name().as_ref() == b"p:sldId" {
                        if let Some(r_id) = attr_value(&e, b"r:id") {
                            slide_ids.push(r_id);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(DocsiftError::extraction(
                        DocumentType::Pptx,
                        format!("Error parsing presentation.xml: {e}"),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(slide_ids)
    }

    fn parse_slide(
        slide_part: &str,
        xml: &str,
        rels: &HashMap<String, Relationship>,
    ) -> Result<Vec<Fragment>> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut fragments = Vec::new();
        let mut shape: Option<ShapeText> = None;
        let mut in_picture = false;
        let mut in_text_element = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"p:sp" => shape = Some(ShapeText::default()),
                    b"p:pic" => in_picture = true,
                    b"a:p" => {
                        if let Some(shape) = shape.as_mut() {
                            shape.current.clear();
                        }
                    }
                    b"a:t" => in_text_element = true,
                    b"a:blip" if in_picture => {
                        if let Some(part) = Self::picture_part(slide_part, &e, rels) {
                            fragments.push(Fragment::Image { part });
                        }
                    }
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"a:br" => {
                        if let Some(shape) = shape.as_mut() {
                            shape.current.push('\n');
                        }
                    }
                    b"a:p" => {
                        if let Some(shape) = shape.as_mut() {
                            shape.paragraphs.push(String::new());
                        }
                    }
                    b"a:blip" if in_picture => {
                        if let Some(part) = Self::picture_part(slide_part, &e, rels) {
                            fragments.push(Fragment::Image { part });
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_text_element {
                        if let (Some(shape), Ok(text)) =
                            (shape.as_mut(), std::str::from_utf8(e.as_ref()))
                        {
                            shape.current.push_str(text);
                        }
                    }
                }
                Ok(Event::GeneralRef(r)) => {
                    if in_text_element {
                        if let (Some(shape), Some(text)) = (shape.as_mut(), resolve_reference(&r)) {
                            shape.current.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"a:t" => in_text_element = false,
                    b"a:p" => {
                        if let Some(shape) = shape.as_mut() {
                            let paragraph = std::mem::take(&mut shape.current);
                            shape.paragraphs.push(paragraph);
                        }
                    }
                    b"p:sp" => {
                        // A shape without text still yields a (blank) line.
                        if let Some(finished) = shape.take() {
                            fragments.push(Fragment::Text(finished.paragraphs.join("\n")));
                        }
                    }
                    b"p:pic" => in_picture = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(DocsiftError::extraction(
                        DocumentType::Pptx,
                        format!("Error parsing {slide_part}: {e}"),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(fragments)
    }

    fn picture_part(
        slide_part: &str,
        blip: &quick_xml::events::BytesStart<'_>,
        rels: &HashMap<String, Relationship>,
    ) -> Option<String> {
        let rel_id = attr_value(blip, b"r:embed")?;
        let rel = rels.get(&rel_id)?;
        if rel.external {
            return None;
        }
        Some(resolve_target(slide_part, &rel.target))
    }
}
