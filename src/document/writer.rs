use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::document::assembler::{DocumentStyle, OutputDocument};
use crate::document::package::DOCUMENT_PART;
use crate::errors::DocumentError;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const STYLES_PART: &str = "word/styles.xml";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

/// Thin event writer for one XML part
struct PartWriter {
    part: &'static str,
    writer: Writer<Cursor<Vec<u8>>>,
}

impl PartWriter {
    fn new(part: &'static str) -> Result<Self, DocumentError> {
        let mut out = Self {
            part,
            writer: Writer::new(Cursor::new(Vec::new())),
        };
        out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(out)
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), DocumentError> {
        self.writer.write_event(event).map_err(|e| DocumentError::Xml {
            part: self.part.to_string(),
            message: e.to_string(),
        })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), DocumentError> {
        self.event(Event::Start(BytesStart::new(name).with_attributes(attrs.iter().copied())))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), DocumentError> {
        self.event(Event::Empty(BytesStart::new(name).with_attributes(attrs.iter().copied())))
    }

    fn end(&mut self, name: &str) -> Result<(), DocumentError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<(), DocumentError> {
        self.event(Event::Text(BytesText::new(text)))
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }
}

/// Run properties carrying the base fonts and size
fn write_run_fonts(out: &mut PartWriter, style: &DocumentStyle) -> Result<(), DocumentError> {
    let size = style.half_points().to_string();
    out.start("w:rPr", &[])?;
    out.empty(
        "w:rFonts",
        &[
            ("w:ascii", style.font_name.as_str()),
            ("w:hAnsi", style.font_name.as_str()),
            ("w:eastAsia", style.east_asia_font.as_str()),
        ],
    )?;
    out.empty("w:sz", &[("w:val", size.as_str())])?;
    out.empty("w:szCs", &[("w:val", size.as_str())])?;
    out.end("w:rPr")
}

/// `word/styles.xml` with document defaults and the Normal style
pub fn styles_xml(style: &DocumentStyle) -> Result<Vec<u8>, DocumentError> {
    let mut out = PartWriter::new(STYLES_PART)?;
    out.start("w:styles", &[("xmlns:w", W_NS)])?;

    out.start("w:docDefaults", &[])?;
    out.start("w:rPrDefault", &[])?;
    write_run_fonts(&mut out, style)?;
    out.end("w:rPrDefault")?;
    out.end("w:docDefaults")?;

    out.start(
        "w:style",
        &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")],
    )?;
    out.empty("w:name", &[("w:val", "Normal")])?;
    out.empty("w:qFormat", &[])?;
    write_run_fonts(&mut out, style)?;
    out.end("w:style")?;

    out.end("w:styles")?;
    Ok(out.finish())
}

/// `word/document.xml` holding every paragraph of `doc`
pub fn document_xml(doc: &OutputDocument) -> Result<Vec<u8>, DocumentError> {
    let mut out = PartWriter::new(DOCUMENT_PART)?;
    out.start("w:document", &[("xmlns:w", W_NS), ("xmlns:r", R_NS)])?;
    out.start("w:body", &[])?;

    for paragraph in doc.paragraphs() {
        if paragraph.text.is_empty() && !paragraph.justify {
            out.empty("w:p", &[])?;
            continue;
        }
        out.start("w:p", &[])?;
        if paragraph.justify {
            out.start("w:pPr", &[])?;
            out.empty("w:jc", &[("w:val", "both")])?;
            out.end("w:pPr")?;
        }
        if !paragraph.text.is_empty() {
            out.start("w:r", &[])?;
            out.start("w:t", &[("xml:space", "preserve")])?;
            out.text(&paragraph.text)?;
            out.end("w:t")?;
            out.end("w:r")?;
        }
        out.end("w:p")?;
    }

    out.start("w:sectPr", &[])?;
    // A4 portrait
    out.empty("w:pgSz", &[("w:w", "11906"), ("w:h", "16838")])?;
    out.end("w:sectPr")?;

    out.end("w:body")?;
    out.end("w:document")?;
    Ok(out.finish())
}

/// Serialize an output document into `.docx` bytes
pub fn to_docx_bytes(doc: &OutputDocument) -> Result<Vec<u8>, DocumentError> {
    let parts: [(&str, Vec<u8>); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes().to_vec()),
        ("_rels/.rels", PACKAGE_RELS_XML.as_bytes().to_vec()),
        (DOCUMENT_PART, document_xml(doc)?),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.as_bytes().to_vec()),
        (STYLES_PART, styles_xml(doc.style())?),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in parts {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(name, options)
            .map_err(|e| DocumentError::Package(format!("start zip file {}: {}", name, e)))?;
        zip.write_all(&data)
            .map_err(|e| DocumentError::Package(format!("write zip file {}: {}", name, e)))?;
    }
    let cursor = zip
        .finish()
        .map_err(|e| DocumentError::Package(format!("finish zip: {}", e)))?;
    Ok(cursor.into_inner())
}
