use image::ImageFormat;
use std::fmt;

/// Decoded embedded picture taken from a source document
#[derive(Clone, PartialEq)]
pub struct Figure {
    /// Relationship id referenced by the drawing (e.g. "rId5")
    pub embed_id: String,
    /// Part name inside the package (e.g. "word/media/image1.png")
    pub part_name: String,
    /// Detected encoding of `bytes`
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// Bytes as sent to the translation service
    pub bytes: Vec<u8>,
}

impl Figure {
    /// MIME type of `bytes`
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

// Image payloads are large, keep debug output readable
impl fmt::Debug for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Figure")
            .field("embed_id", &self.embed_id)
            .field("part_name", &self.part_name)
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// One unit of source content, in document order
#[derive(Debug, Clone, PartialEq)]
pub enum ContentElement {
    /// Trimmed text of a body paragraph (may be empty)
    Text(String),
    /// Picture embedded in a paragraph run
    Figure(Figure),
}

impl ContentElement {
    pub fn is_figure(&self) -> bool {
        matches!(self, Self::Figure(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Figure(_) => None,
        }
    }
}
