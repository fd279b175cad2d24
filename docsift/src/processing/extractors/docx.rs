//! DOCX extractor using zip + quick-xml

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

use super::ooxml::{attr_value, resolve_reference, resolve_target, Fragment, Package, Relationship};
use super::ExtractedContent;
use crate::error::{DocsiftError, Result};
use crate::models::DocumentType;
use crate::ocr::MistralOcrClient;

const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS: &str = "word/_rels/document.xml.rels";

pub struct DocxExtractor;

#[derive(Default)]
struct OpenParagraph {
    text: String,
    images: Vec<String>,
    /// Fragments of paragraphs nested inside this one (text boxes).
    nested: Vec<Fragment>,
}

impl OpenParagraph {
    fn into_fragments(self) -> impl Iterator<Item = Fragment> {
        std::iter::once(Fragment::Text(self.text))
            .chain(self.images.into_iter().map(|part| Fragment::Image { part }))
            .chain(self.nested)
    }
}

impl DocxExtractor {
    /// Extract paragraph text and OCR every embedded picture.
    ///
    /// Picture text is placed directly after the paragraph that anchors the
    /// picture, so the output follows the reading order of the document.
    pub async fn extract(bytes: &[u8], ocr: &MistralOcrClient) -> Result<ExtractedContent> {
        let mut package = Package::open(bytes, DocumentType::Docx)?;
        let fragments = Self::fragments(&mut package)?;
        let text = package.render(fragments, ocr).await;

        Ok(ExtractedContent::new(text, DocumentType::Docx))
    }

    /// Read the document into ordered fragments without running OCR.
    pub fn extract_fragments(bytes: &[u8]) -> Result<Vec<Fragment>> {
        let mut package = Package::open(bytes, DocumentType::Docx)?;
        Self::fragments(&mut package)
    }

    fn fragments(package: &mut Package<'_>) -> Result<Vec<Fragment>> {
        let rels = package.relationships(DOCUMENT_RELS)?;
        let xml = package.read_string(DOCUMENT_PART)?;
        Self::parse_document(&xml, &rels)
    }

    fn parse_document(xml: &str, rels: &HashMap<String, Relationship>) -> Result<Vec<Fragment>> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut fragments = Vec::new();
        // Paragraphs nest inside text boxes, so keep a stack.
        let mut open: Vec<OpenParagraph> = Vec::new();
        let mut in_text_element = false;
        // Depth inside `mc:Fallback`, which repeats the `mc:Choice` content.
        let mut fallback_depth = 0usize;
        let mut buf = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf);

            if fallback_depth > 0 {
                match event {
                    Ok(Event::Start(_)) => fallback_depth += 1,
                    Ok(Event::End(_)) => fallback_depth -= 1,
                    Ok(Event::Eof) => break,
                    Err(e) => return Err(Self::parse_error(e)),
                    _ => {}
                }
                buf.clear();
                continue;
            }

            match event {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"mc:Fallback" => fallback_depth = 1,
                    b"w:p" => open.push(OpenParagraph::default()),
                    b"w:t" => in_text_element = true,
                    b"a:blip" | b"v:imagedata" => {
                        Self::push_image(&e, rels, &mut open, &mut fragments)
                    }
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"w:p" => Self::close_paragraph(
                        OpenParagraph::default(),
                        &mut open,
                        &mut fragments,
                    ),
                    b"w:tab" => Self::push_char(&mut open, '\t'),
                    b"w:br" | b"w:cr" => Self::push_char(&mut open, '\n'),
                    b"a:blip" | b"v:imagedata" => {
                        Self::push_image(&e, rels, &mut open, &mut fragments)
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_text_element {
                        if let (Some(paragraph), Ok(text)) =
                            (open.last_mut(), std::str::from_utf8(e.as_ref()))
                        {
                            paragraph.text.push_str(text);
                        }
                    }
                }
                Ok(Event::GeneralRef(r)) => {
                    if in_text_element {
                        if let (Some(paragraph), Some(text)) =
                            (open.last_mut(), resolve_reference(&r))
                        {
                            paragraph.text.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"w:t" => in_text_element = false,
                    b"w:p" => {
                        if let Some(paragraph) = open.pop() {
                            Self::close_paragraph(paragraph, &mut open, &mut fragments);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Self::parse_error(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(fragments)
    }

    /// A finished paragraph goes after the text of the paragraph that
    /// anchors it, or straight to the output at body level.
    fn close_paragraph(
        paragraph: OpenParagraph,
        open: &mut [OpenParagraph],
        fragments: &mut Vec<Fragment>,
    ) {
        match open.last_mut() {
            Some(parent) => parent.nested.extend(paragraph.into_fragments()),
            None => fragments.extend(paragraph.into_fragments()),
        }
    }

    fn parse_error(e: quick_xml::Error) -> DocsiftError {
        DocsiftError::extraction(
            DocumentType::Docx,
            format!("Error parsing document.xml: {e}"),
        )
    }

    fn push_char(open: &mut [OpenParagraph], ch: char) {
        if let Some(paragraph) = open.last_mut() {
            paragraph.text.push(ch);
        }
    }

    fn push_image(
        e: &BytesStart<'_>,
        rels: &HashMap<String, Relationship>,
        open: &mut [OpenParagraph],
        fragments: &mut Vec<Fragment>,
    ) {
        let Some(rel_id) = attr_value(e, b"r:embed").or_else(|| attr_value(e, b"r:id")) else {
            return;
        };
        let Some(rel) = rels.get(&rel_id) else {
            return;
        };
        if rel.external || !rel.target.contains("image") {
            return;
        }

        let part = resolve_target(DOCUMENT_PART, &rel.target);
        match open.last_mut() {
            Some(paragraph) => paragraph.images.push(part),
            None => fragments.push(Fragment::Image { part }),
        }
    }
}
