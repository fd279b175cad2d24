//! Shared plumbing for zip-packaged Office documents (docx, pptx)

use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use tracing::{debug, warn};
use zip::ZipArchive;

use super::IMAGE_CONTENT_MARKER;
use crate::error::{DocsiftError, Result};
use crate::models::DocumentType;
use crate::ocr::{MistralOcrClient, OcrInputKind};

/// One unit of document content, in reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    /// An embedded picture, identified by its part name inside the package.
    Image { part: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

pub(crate) struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    format: DocumentType,
}

impl<'a> Package<'a> {
    pub fn open(bytes: &'a [u8], format: DocumentType) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DocsiftError::extraction(format, format!("{format} parse error: {e}")))?;
        Ok(Self { archive, format })
    }

    pub fn read_string(&mut self, path: &str) -> Result<String> {
        let format = self.format;
        let mut file = self.archive.by_name(path).map_err(|e| {
            DocsiftError::extraction(format, format!("Failed to read {path} from {format}: {e}"))
        })?;

        let mut content = String::new();
        file.read_to_string(&mut content).map_err(|e| {
            DocsiftError::extraction(format, format!("Failed to read {path} content: {e}"))
        })?;

        Ok(content)
    }

    /// Like [`Package::read_string`], but a missing part is `None` rather than an error.
    pub fn read_optional_string(&mut self, path: &str) -> Result<Option<String>> {
        if self.archive.index_for_name(path).is_none() {
            return Ok(None);
        }
        self.read_string(path).map(Some)
    }

    pub fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        let format = self.format;
        let mut file = self.archive.by_name(path).map_err(|e| {
            DocsiftError::extraction(format, format!("Failed to read {path} from {format}: {e}"))
        })?;

        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Parse a `.rels` part into a map keyed by relationship id.
    ///
    /// Parts without relationships are common (slides with no pictures), so a
    /// missing rels part yields an empty map.
    pub fn relationships(&mut self, rels_path: &str) -> Result<HashMap<String, Relationship>> {
        let Some(xml) = self.read_optional_string(rels_path)? else {
            return Ok(HashMap::new());
        };

        let mut reader = Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut mapping = HashMap::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    if e.name().as_ref() == b"Relationship" {
                        let id = attr_value(&e, b"Id");
                        let target = attr_value(&e, b"Target");
                        let rel_type = attr_value(&e, b"Type").unwrap_or_default();
                        let external = attr_value(&e, b"TargetMode")
                            .map(|mode| mode.eq_ignore_ascii_case("External"))
                            .unwrap_or(false);

                        if let (Some(id), Some(target)) = (id, target) {
                            mapping.insert(
                                id,
                                Relationship {
                                    rel_type,
                                    target,
                                    external,
                                },
                            );
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(DocsiftError::extraction(
                        self.format,
                        format!("Error parsing {rels_path}: {e}"),
                    ))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(mapping)
    }

    /// Resolve fragments into the final text, OCR-ing every embedded image.
    ///
    /// Fragments are joined with newlines. Recognized image text is emitted in
    /// place as `[IMAGE CONTENT]\n<text>`; an image whose OCR fails or comes
    /// back empty is left out without failing the document. Each image part is
    /// sent to the OCR service at most once.
    pub async fn render(&mut self, fragments: Vec<Fragment>, ocr: &MistralOcrClient) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(fragments.len());
        let mut recognized: HashMap<String, Option<String>> = HashMap::new();

        for fragment in fragments {
            match fragment {
                Fragment::Text(text) => parts.push(text),
                Fragment::Image { part } => {
                    let text = match recognized.get(&part) {
                        Some(cached) => cached.clone(),
                        None => {
                            let result = self.recognize_part(&part, ocr).await;
                            recognized.insert(part, result.clone());
                            result
                        }
                    };

                    if let Some(text) = text.filter(|t| !t.is_empty()) {
                        parts.push(format!("{IMAGE_CONTENT_MARKER}\n{text}"));
                    }
                }
            }
        }

        parts.join("\n")
    }

    async fn recognize_part(&mut self, part: &str, ocr: &MistralOcrClient) -> Option<String> {
        let bytes = match self.read_bytes(part) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(part, "Skipping embedded image: {}", e);
                return None;
            }
        };

        debug!(part, bytes = bytes.len(), "Running OCR on embedded image");
        match ocr.recognize(&bytes, OcrInputKind::Image).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(part, "OCR failed for embedded image, omitting it: {}", e);
                None
            }
        }
    }
}

pub(crate) fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| std::str::from_utf8(&attr.value).ok().map(String::from))
}

/// Text for an entity or character reference (`&amp;`, `&#169;`) inside a text run.
pub(crate) fn resolve_reference(r: &BytesRef<'_>) -> Option<String> {
    if let Ok(Some(ch)) = r.resolve_char_ref() {
        return Some(ch.to_string());
    }
    let name = r.decode().ok()?;
    quick_xml::escape::resolve_predefined_entity(&name).map(String::from)
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
pub(crate) fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target against the part that declares it.
///
/// Targets are relative to the source part's directory unless they start with
/// `/`, in which case they are relative to the package root.
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        match source_part.rsplit_once('/') {
            Some((dir, _)) => dir.split('/').collect(),
            None => Vec::new(),
        }
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
