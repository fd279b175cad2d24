//! Fixture generators and fakes shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use docsift::config::Config;
use docsift::error::{DocsiftError, Result};
use docsift::processing::rasterizer::{collect_page_images, PageRasterizer};
use docsift::processing::DocumentProcessor;
use wiremock::{Match, MockServer, Request};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Write `bytes` to `dir/name` and return the full path
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap_or_else(|e| panic!("Failed to write '{name}': {e}"));
    path
}

/// Processor whose OCR client talks to the mock server
pub fn processor_for(server: &MockServer) -> DocumentProcessor {
    DocumentProcessor::new(&Config::with_ocr("test-api-key", server.uri()))
        .expect("Failed to build processor")
}

/// Matches requests whose raw body contains the given bytes.
///
/// Multipart bodies carry binary image data, so string matchers don't apply.
pub struct BodyContains(pub Vec<u8>);

impl Match for BodyContains {
    fn matches(&self, request: &Request) -> bool {
        !self.0.is_empty()
            && request
                .body
                .windows(self.0.len())
                .any(|window| window == self.0.as_slice())
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// A blank PNG. Different sizes give different bytes.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    use image::{DynamicImage, ImageFormat};

    let img = DynamicImage::new_rgb8(width, height);
    let mut output = Vec::new();
    img.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .expect("Failed to encode PNG");
    output
}

// ---------------------------------------------------------------------------
// Rasterizer fakes
// ---------------------------------------------------------------------------

/// Writes one PNG per page, page `n` being `(n + 1) x (n + 1)` pixels.
pub struct FakeRasterizer {
    pub pages: u32,
    pub out_dirs: Mutex<Vec<PathBuf>>,
}

impl FakeRasterizer {
    pub fn new(pages: u32) -> Self {
        Self {
            pages,
            out_dirs: Mutex::new(Vec::new()),
        }
    }

    /// Bytes of the image written for 1-based page `n`
    pub fn page_image(n: u32) -> Vec<u8> {
        png_bytes(n + 1, n + 1)
    }

    pub fn out_dirs(&self) -> Vec<PathBuf> {
        self.out_dirs.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRasterizer for FakeRasterizer {
    async fn rasterize(&self, _pdf_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
        self.out_dirs.lock().unwrap().push(out_dir.to_path_buf());
        for n in 1..=self.pages {
            std::fs::write(out_dir.join(format!("page-{n}.png")), Self::page_image(n))?;
        }
        collect_page_images(out_dir).await
    }
}

pub struct FailingRasterizer;

#[async_trait]
impl PageRasterizer for FailingRasterizer {
    async fn rasterize(&self, _pdf_path: &Path, _out_dir: &Path) -> Result<Vec<PathBuf>> {
        Err(DocsiftError::Rasterize("pdftoppm exited with 99".to_string()))
    }
}

// ---------------------------------------------------------------------------
// PDF
// ---------------------------------------------------------------------------

/// A minimal PDF with one page per entry, each page showing its string in
/// Helvetica. An empty string gives a page with no text at all.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let page_count = pages.len();
    let font_id = 3 + 2 * page_count;

    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", 3 + 2 * i))
        .collect();

    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            page_count
        ),
    ];

    for (i, text) in pages.iter().enumerate() {
        let content_id = 4 + 2 * i;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Contents {content_id} 0 R /Resources << /Font << /F1 {font_id} 0 R >> >> >>"
        ));

        let stream = if text.is_empty() {
            String::new()
        } else {
            format!("BT /F1 24 Tf 72 700 Td ({text}) Tj ET")
        };
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    out.into_bytes()
}

// ---------------------------------------------------------------------------
// Zip-packaged Office documents
// ---------------------------------------------------------------------------

pub fn zip_package(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buffer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for (name, bytes) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }

        zip.finish().unwrap();
    }
    buffer.into_inner()
}

/// A docx with plain paragraphs, built with docx-rs
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    use docx_rs::*;

    let docx = paragraphs.iter().fold(Docx::new(), |docx, text| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)))
    });

    let mut buffer = Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).expect("Failed to pack DOCX");
    buffer.into_inner()
}

const DOCX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Default Extension="png" ContentType="image/png"/>
    <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const DOCX_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

pub fn docx_drawing(rel_id: &str) -> String {
    format!(
        r#"<w:r><w:drawing><wp:inline><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:blipFill><a:blip r:embed="{rel_id}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#
    )
}

/// A hand-zipped docx. `images[i]` is stored as `word/media/image{i+1}.png`
/// and referenced by relationship id `rId{10+i}`.
pub fn docx_package(body: &str, images: &[&[u8]]) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" xmlns:wps="http://schemas.microsoft.com/office/word/2010/wordprocessingShape" xmlns:v="urn:schemas-microsoft-com:vml">
    <w:body>{body}</w:body>
</w:document>"#
    );

    let relationships: String = (0..images.len())
        .map(|i| {
            format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image{}.png"/>"#,
                10 + i,
                i + 1
            )
        })
        .collect();
    let document_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
    );

    let media_names: Vec<String> = (0..images.len())
        .map(|i| format!("word/media/image{}.png", i + 1))
        .collect();

    let mut entries: Vec<(&str, &[u8])> = vec![
        ("[Content_Types].xml", DOCX_CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", DOCX_RELS.as_bytes()),
        ("word/document.xml", document.as_bytes()),
        ("word/_rels/document.xml.rels", document_rels.as_bytes()),
    ];
    for (name, bytes) in media_names.iter().zip(images) {
        entries.push((name.as_str(), *bytes));
    }

    zip_package(&entries)
}

/// A floating shape the way Word saves it: a DrawingML text box with a
/// picture fill under `mc:Choice`, repeated as VML under `mc:Fallback`.
pub fn docx_text_box(rel_id: &str, text: &str) -> String {
    format!(
        r#"<w:r><mc:AlternateContent><mc:Choice Requires="wps"><w:drawing><wp:anchor><a:graphic><a:graphicData uri="http://schemas.microsoft.com/office/word/2010/wordprocessingShape"><wps:wsp><wps:spPr><a:blipFill><a:blip r:embed="{rel_id}"/></a:blipFill></wps:spPr><wps:txbx><w:txbxContent><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:txbxContent></wps:txbx></wps:wsp></a:graphicData></a:graphic></wp:anchor></w:drawing></mc:Choice><mc:Fallback><w:pict><v:rect><v:fill r:id="{rel_id}"/><v:imagedata r:id="{rel_id}"/><v:textbox><w:txbxContent><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:txbxContent></v:textbox></v:rect></w:pict></mc:Fallback></mc:AlternateContent></w:r>"#
    )
}

/// A docx with two figures:
///
/// ```text
/// Quarterly report
/// Figure 1: revenue   + image1
/// Figure 2: costs     + image2
/// End of report
/// ```
pub fn docx_with_figures(image1: &[u8], image2: &[u8]) -> Vec<u8> {
    let body = format!(
        "<w:p><w:r><w:t>Quarterly report</w:t></w:r></w:p>\
         <w:p><w:r><w:t>Figure 1: revenue</w:t></w:r>{}</w:p>\
         <w:p><w:r><w:t>Figure 2: costs</w:t></w:r>{}</w:p>\
         <w:p><w:r><w:t>End of report</w:t></w:r></w:p>",
        docx_drawing("rId10"),
        docx_drawing("rId11")
    );
    docx_package(&body, &[image1, image2])
}

const PPTX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Default Extension="png" ContentType="image/png"/>
    <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
    <Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
    <Override PartName="/ppt/slides/slide2.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
</Types>"#;

const PPTX_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#;

// Slide 2 is listed first, so it is shown first.
const PRESENTATION_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
    <p:sldIdLst>
        <p:sldId id="256" r:id="rId3"/>
        <p:sldId id="257" r:id="rId2"/>
    </p:sldIdLst>
</p:presentation>"#;

const PRESENTATION_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
</Relationships>"#;

const SLIDE_INTRO: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
    <p:cSld>
        <p:spTree>
            <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
            <p:grpSpPr/>
            <p:sp>
                <p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>
                <p:spPr/>
                <p:txBody><a:bodyPr/><a:p><a:r><a:t>Welcome</a:t></a:r></a:p></p:txBody>
            </p:sp>
        </p:spTree>
    </p:cSld>
</p:sld>"#;

const SLIDE_WITH_PICTURE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
    <p:cSld>
        <p:spTree>
            <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
            <p:grpSpPr/>
            <p:sp>
                <p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>
                <p:spPr/>
                <p:txBody><a:bodyPr/><a:p><a:r><a:t>Sales chart</a:t></a:r></a:p></p:txBody>
            </p:sp>
            <p:pic>
                <p:nvPicPr><p:cNvPr id="3" name="Picture 1"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>
                <p:blipFill><a:blip r:embed="rId2"/></p:blipFill>
                <p:spPr/>
            </p:pic>
            <p:sp>
                <p:nvSpPr><p:cNvPr id="4" name="Notes"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>
                <p:spPr/>
                <p:txBody><a:bodyPr/><a:p><a:r><a:t>Numbers are preliminary</a:t></a:r></a:p></p:txBody>
            </p:sp>
        </p:spTree>
    </p:cSld>
</p:sld>"#;

const SLIDE_PICTURE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
</Relationships>"#;

/// A two-slide deck. Presentation order is "Welcome", then a slide with a
/// title, a picture and a notes box.
pub fn pptx_with_picture(image: &[u8]) -> Vec<u8> {
    zip_package(&[
        ("[Content_Types].xml", PPTX_CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PPTX_RELS.as_bytes()),
        ("ppt/presentation.xml", PRESENTATION_XML.as_bytes()),
        (
            "ppt/_rels/presentation.xml.rels",
            PRESENTATION_RELS.as_bytes(),
        ),
        ("ppt/slides/slide1.xml", SLIDE_WITH_PICTURE.as_bytes()),
        (
            "ppt/slides/_rels/slide1.xml.rels",
            SLIDE_PICTURE_RELS.as_bytes(),
        ),
        ("ppt/slides/slide2.xml", SLIDE_INTRO.as_bytes()),
        ("ppt/media/image1.png", image),
    ])
}

const XLSX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
    <Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
    <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>
</Types>"#;

const XLSX_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="Sheet1" sheetId="1" r:id="rId1"/>
        <sheet name="Sheet2" sheetId="2" r:id="rId2"/>
    </sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#;

const SHEET1_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <sheetData>
        <row r="1">
            <c r="A1" t="s"><v>0</v></c>
            <c r="B1" t="s"><v>1</v></c>
            <c r="C1" t="s"><v>2</v></c>
        </row>
        <row r="2">
            <c r="A2" t="s"><v>3</v></c>
            <c r="B2"><v>100</v></c>
            <c r="C2" t="s"><v>4</v></c>
        </row>
        <row r="3">
            <c r="A3" t="s"><v>5</v></c>
            <c r="B3"><v>200</v></c>
            <c r="C3" t="s"><v>6</v></c>
        </row>
    </sheetData>
</worksheet>"#;

const SHEET2_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <sheetData>
        <row r="1">
            <c r="A1" t="s"><v>7</v></c>
            <c r="B1" t="s"><v>8</v></c>
        </row>
        <row r="2">
            <c r="A2" t="s"><v>9</v></c>
            <c r="B2"><v>2.5</v></c>
        </row>
    </sheetData>
</worksheet>"#;

const SHARED_STRINGS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="10" uniqueCount="10">
    <si><t>Product</t></si>
    <si><t>Price</t></si>
    <si><t>Category</t></si>
    <si><t>Widget A</t></si>
    <si><t>Electronics</t></si>
    <si><t>Widget B</t></si>
    <si><t>Tools</t></si>
    <si><t>Region</t></si>
    <si><t>Growth</t></si>
    <si><t>North</t></si>
</sst>"#;

/// Workbook with `Sheet1` (Product/Price/Category) and `Sheet2` (Region/Growth)
pub fn xlsx_two_sheets() -> Vec<u8> {
    zip_package(&[
        ("[Content_Types].xml", XLSX_CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", XLSX_RELS.as_bytes()),
        ("xl/workbook.xml", WORKBOOK_XML.as_bytes()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
        ("xl/worksheets/sheet1.xml", SHEET1_XML.as_bytes()),
        ("xl/worksheets/sheet2.xml", SHEET2_XML.as_bytes()),
        ("xl/sharedStrings.xml", SHARED_STRINGS_XML.as_bytes()),
    ])
}
