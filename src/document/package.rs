use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::errors::DocumentError;

/// Main document part of a word-processing package
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Relationships of the main document part
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

const IMAGE_REL_TYPE_SUFFIX: &str = "/relationships/image";

/// Relationship entry of the main document part
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    /// Package part name the relationship points to, normalized under `word/`
    pub target: String,
    pub rel_type: String,
    /// Target lives outside the package (linked picture, hyperlink)
    pub external: bool,
}

impl Relationship {
    pub fn is_image(&self) -> bool {
        self.rel_type.ends_with(IMAGE_REL_TYPE_SUFFIX)
    }
}

/// In-memory view of a DOCX container
pub struct DocxPackage {
    entries: Vec<DocxEntry>,
}

struct DocxEntry {
    name: String,
    data: Vec<u8>,
}

impl DocxPackage {
    /// Read every part of a package held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DocumentError::Package(format!("not a zip container: {}", e)))?;

        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip
                .by_index(i)
                .map_err(|e| DocumentError::Package(format!("zip entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| DocumentError::Package(format!("read zip entry {}: {}", file.name(), e)))?;
            entries.push(DocxEntry {
                name: file.name().to_string(),
                data,
            });
        }

        debug!("Opened package with {} parts", entries.len());
        Ok(Self { entries })
    }

    /// Raw bytes of a part, if present
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.data.as_slice())
    }

    /// Raw bytes of a part that must exist
    pub fn require_part(&self, name: &str) -> Result<&[u8], DocumentError> {
        self.part(name)
            .ok_or_else(|| DocumentError::MissingPart(name.to_string()))
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Relationships of the main document part, keyed by id
    ///
    /// A package without a relationships part simply has no relationships.
    pub fn document_relationships(&self) -> Result<HashMap<String, Relationship>, DocumentError> {
        match self.part(DOCUMENT_RELS_PART) {
            Some(bytes) => parse_relationships(DOCUMENT_RELS_PART, bytes),
            None => Ok(HashMap::new()),
        }
    }
}

/// Parse a `.rels` part
pub fn parse_relationships(part: &str, xml: &[u8]) -> Result<HashMap<String, Relationship>, DocumentError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut map = HashMap::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf).map_err(|e| DocumentError::Xml {
            part: part.to_string(),
            message: e.to_string(),
        })?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"Relationship" => {
                let id = attr_value(part, e, b"Id")?.unwrap_or_default();
                let target = attr_value(part, e, b"Target")?.unwrap_or_default();
                if id.trim().is_empty() || target.trim().is_empty() {
                    continue;
                }
                let external = attr_value(part, e, b"TargetMode")?
                    .is_some_and(|mode| mode == "External");
                let rel_type = attr_value(part, e, b"Type")?.unwrap_or_default();
                let target = if external {
                    target.trim().to_string()
                } else {
                    normalize_target("word/", target.trim())
                };
                map.insert(
                    id.trim().to_string(),
                    Relationship {
                        id: id.trim().to_string(),
                        target,
                        rel_type,
                        external,
                    },
                );
            }
            _ => {}
        }
    }
    Ok(map)
}

/// Resolve a relationship target relative to `base`
pub fn normalize_target(base: &str, target: &str) -> String {
    let t = target.replace('\\', "/");
    if let Some(absolute) = t.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut t = t.as_str();
    while let Some(rest) = t.strip_prefix("../") {
        t = rest;
    }
    if base.ends_with('/') && t.starts_with(base) {
        return t.to_string();
    }
    format!("{base}{t}")
}

/// Unescaped value of an attribute matched by local name
pub(crate) fn attr_value(part: &str, e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, DocumentError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| DocumentError::Xml {
            part: part.to_string(),
            message: err.to_string(),
        })?;
        if attr.key.local_name().as_ref() == key {
            let value = attr.unescape_value().map_err(|err| DocumentError::Xml {
                part: part.to_string(),
                message: err.to_string(),
            })?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
