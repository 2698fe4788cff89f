/*!
 * Content extraction from word-processing packages.
 *
 * Walks the body paragraphs of `word/document.xml` in reading order and
 * produces a flat sequence of [`ContentElement`]s: the trimmed paragraph text
 * first, then one figure per run that carries an embedded picture.
 */

use image::{DynamicImage, ImageFormat};
use log::{debug, info, warn};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::Cursor;

use crate::app_config::FigureDecodePolicy;
use crate::document::model::{ContentElement, Figure};
use crate::document::package::{DOCUMENT_PART, DocxPackage, Relationship, attr_value};
use crate::errors::DocumentError;

/// Extracts ordered content elements from a package
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentExtractor {
    decode_policy: FigureDecodePolicy,
}

/// Per-run drawing lookup state
#[derive(Debug)]
struct RunState {
    depth: usize,
    drawing_depth: Option<usize>,
    drawing_done: bool,
    blip_seen: bool,
}

/// Body paragraph being collected
#[derive(Debug)]
struct ParagraphState {
    depth: usize,
    text: String,
    embeds: Vec<String>,
    run: Option<RunState>,
}

impl ParagraphState {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            text: String::new(),
            embeds: Vec::new(),
            run: None,
        }
    }
}

impl ContentExtractor {
    pub fn new(decode_policy: FigureDecodePolicy) -> Self {
        Self { decode_policy }
    }

    /// Extract elements from package bytes
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<Vec<ContentElement>, DocumentError> {
        let package = DocxPackage::from_bytes(bytes)?;
        self.extract(&package)
    }

    /// Extract elements from an opened package
    pub fn extract(&self, package: &DocxPackage) -> Result<Vec<ContentElement>, DocumentError> {
        let document = package.require_part(DOCUMENT_PART)?;
        let rels = package.document_relationships()?;

        let paragraphs = scan_paragraphs(document)?;

        let mut elements = Vec::new();
        let mut decoded: HashMap<String, Option<Figure>> = HashMap::new();
        for (text, embeds) in paragraphs {
            if !text.is_empty() {
                elements.push(ContentElement::Text(text));
            }
            for embed_id in embeds {
                let Some(rel) = rels.get(&embed_id).filter(|r| r.is_image() && !r.external) else {
                    debug!("Ignoring drawing {} without an embedded image relationship", embed_id);
                    continue;
                };
                if !decoded.contains_key(&embed_id) {
                    let figure = self.load_figure(package, rel)?;
                    decoded.insert(embed_id.clone(), figure);
                }
                if let Some(Some(figure)) = decoded.get(&embed_id) {
                    elements.push(ContentElement::Figure(figure.clone()));
                }
            }
        }

        let figures = elements.iter().filter(|e| e.is_figure()).count();
        info!(
            "Extracted {} elements ({} text, {} figures)",
            elements.len(),
            elements.len() - figures,
            figures
        );
        Ok(elements)
    }

    fn load_figure(&self, package: &DocxPackage, rel: &Relationship) -> Result<Option<Figure>, DocumentError> {
        let result = match package.part(&rel.target) {
            Some(bytes) => decode_figure(&rel.id, &rel.target, bytes),
            None => Err(DocumentError::Decode {
                embed_id: rel.id.clone(),
                part: rel.target.clone(),
                reason: "image part is missing from the package".to_string(),
            }),
        };

        match (result, self.decode_policy) {
            (Ok(figure), _) => {
                debug!(
                    "Decoded figure {} ({}, {}x{})",
                    figure.embed_id,
                    figure.mime_type(),
                    figure.width,
                    figure.height
                );
                Ok(Some(figure))
            }
            (Err(e), FigureDecodePolicy::Skip) => {
                warn!("Skipping figure: {}", e);
                Ok(None)
            }
            (Err(e), FigureDecodePolicy::Abort) => Err(e),
        }
    }
}

/// Decode an embedded image, re-encoding formats the service cannot take to PNG
pub fn decode_figure(embed_id: &str, part: &str, bytes: &[u8]) -> Result<Figure, DocumentError> {
    let decode_err = |reason: String| DocumentError::Decode {
        embed_id: embed_id.to_string(),
        part: part.to_string(),
        reason,
    };

    let format = image::guess_format(bytes).map_err(|e| decode_err(e.to_string()))?;
    let image = image::load_from_memory_with_format(bytes, format).map_err(|e| decode_err(e.to_string()))?;

    let (format, bytes) = match format {
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP => (format, bytes.to_vec()),
        _ => (ImageFormat::Png, encode_png(&image).map_err(decode_err)?),
    };

    Ok(Figure {
        embed_id: embed_id.to_string(),
        part_name: part.to_string(),
        format,
        width: image.width(),
        height: image.height(),
        bytes,
    })
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, String> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| format!("re-encode to PNG failed: {}", e))?;
    Ok(buf.into_inner())
}

fn qualified_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Elements between the paragraph and the current node form a direct run
/// (`w:r`) or a run inside a hyperlink (`w:hyperlink/w:r`).
fn is_text_run_path(path: &[String]) -> bool {
    matches!(path, [r] if r == "w:r") || matches!(path, [h, r] if h == "w:hyperlink" && r == "w:r")
}

/// Scan `word/document.xml`, returning each body paragraph's trimmed text and
/// the embed ids of its runs' pictures in run order.
fn scan_paragraphs(xml: &[u8]) -> Result<Vec<(String, Vec<String>)>, DocumentError> {
    let xml_err = |message: String| DocumentError::Xml {
        part: DOCUMENT_PART.to_string(),
        message,
    };

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut out = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut para: Option<ParagraphState> = None;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf).map_err(|e| xml_err(e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) => {
                let name = qualified_name(e);
                if para.is_none() && name == "w:p" && stack.last().is_some_and(|p| p == "w:body") {
                    para = Some(ParagraphState::new(stack.len()));
                } else if let Some(p) = para.as_mut() {
                    visit_in_paragraph(p, &stack, &name, e)?;
                }
                stack.push(name);
            }
            Event::Empty(ref e) => {
                let name = qualified_name(e);
                if let Some(p) = para.as_mut() {
                    // An empty run has no content to track
                    if name != "w:r" {
                        visit_in_paragraph(p, &stack, &name, e)?;
                    }
                    if is_text_run_path(&stack[p.depth + 1..]) {
                        match name.as_str() {
                            "w:tab" => p.text.push('\t'),
                            "w:br" | "w:cr" => p.text.push('\n'),
                            _ => {}
                        }
                    }
                }
            }
            Event::Text(ref t) => {
                if let Some(p) = para.as_mut() {
                    let depth = stack.len();
                    if depth > p.depth + 1
                        && stack[depth - 1] == "w:t"
                        && is_text_run_path(&stack[p.depth + 1..depth - 1])
                    {
                        let text = t.unescape().map_err(|e| xml_err(e.to_string()))?;
                        p.text.push_str(&text);
                    }
                }
            }
            Event::End(_) => {
                let name = stack.pop().unwrap_or_default();
                let depth = stack.len();
                let Some(p) = para.as_mut() else { continue };

                if name == "w:p" && p.depth == depth {
                    if let Some(done) = para.take() {
                        out.push((done.text.trim().to_string(), done.embeds));
                    }
                    continue;
                }
                if let Some(run) = p.run.as_mut() {
                    if name == "w:r" && run.depth == depth {
                        p.run = None;
                    } else if name == "w:drawing" && run.drawing_depth == Some(depth) {
                        run.drawing_depth = None;
                        run.drawing_done = true;
                    }
                }
            }
            _ => {}
        }
    }

    Ok(out)
}

/// Track runs, their first drawing, and the first blip inside that drawing
fn visit_in_paragraph(
    p: &mut ParagraphState,
    stack: &[String],
    name: &str,
    e: &BytesStart<'_>,
) -> Result<(), DocumentError> {
    let depth = stack.len();
    match name {
        "w:r" if depth == p.depth + 1 => {
            p.run = Some(RunState {
                depth,
                drawing_depth: None,
                drawing_done: false,
                blip_seen: false,
            });
        }
        "w:drawing" => {
            if let Some(run) = p.run.as_mut() {
                if !run.drawing_done && run.drawing_depth.is_none() {
                    run.drawing_depth = Some(depth);
                }
            }
        }
        "a:blip" => {
            if let Some(run) = p.run.as_mut() {
                if run.drawing_depth.is_some() && !run.blip_seen {
                    run.blip_seen = true;
                    if let Some(embed) = attr_value(DOCUMENT_PART, e, b"embed")? {
                        p.embeds.push(embed);
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}
