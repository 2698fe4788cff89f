/*!
 * Output document assembly.
 *
 * Builds the translated document paragraph by paragraph and applies the
 * patent paragraph numbering convention: every content line is preceded by
 * a `【NNNN】` paragraph, except the document title and lines that are
 * already bracketed headings.
 */

use crate::app_config::DocumentConfig;
use crate::translation::schema::ImageTranslationPair;

const OPEN_BRACKET: char = '【';
const CLOSE_BRACKET: char = '】';

/// Base style of the output document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStyle {
    /// Latin font family of the base style
    pub font_name: String,
    /// Font mapped to east-Asian glyphs
    pub east_asia_font: String,
    /// Base size in points
    pub font_size_pt: f32,
}

impl DocumentStyle {
    /// Font size in half-points, the unit used by the document format
    pub fn half_points(&self) -> u32 {
        (self.font_size_pt * 2.0).round() as u32
    }
}

impl From<&DocumentConfig> for DocumentStyle {
    fn from(config: &DocumentConfig) -> Self {
        Self {
            font_name: config.font_name.clone(),
            east_asia_font: config.east_asia_font.clone(),
            font_size_pt: config.font_size_pt,
        }
    }
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self::from(&DocumentConfig::default())
    }
}

/// A single output paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    /// Justified alignment
    pub justify: bool,
}

/// Document under construction
#[derive(Debug, Clone)]
pub struct OutputDocument {
    style: DocumentStyle,
    paragraphs: Vec<Paragraph>,
    /// Last paragraph number handed out
    paragraph_counter: u32,
    /// Whether the title line has been written
    title_written: bool,
}

/// Create an empty document styled for Japanese output
pub fn new_output_document(style: DocumentStyle) -> OutputDocument {
    OutputDocument {
        style,
        paragraphs: Vec::new(),
        paragraph_counter: 0,
        title_written: false,
    }
}

/// Whether a line is wrapped start to end by one `【…】` pair
pub fn is_heading(line: &str) -> bool {
    let trimmed = line.trim();
    let Some(inner) = trimmed
        .strip_prefix(OPEN_BRACKET)
        .and_then(|rest| rest.strip_suffix(CLOSE_BRACKET))
    else {
        return false;
    };
    !inner.contains(OPEN_BRACKET) && !inner.contains(CLOSE_BRACKET)
}

/// Paragraph number label, e.g. `【0001】`
pub fn format_paragraph_number(number: u32) -> String {
    format!("{}{:04}{}", OPEN_BRACKET, number, CLOSE_BRACKET)
}

impl OutputDocument {
    pub fn style(&self) -> &DocumentStyle {
        &self.style
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Last paragraph number allocated (0 when none)
    pub fn paragraph_counter(&self) -> u32 {
        self.paragraph_counter
    }

    pub fn append_paragraph(&mut self, text: impl Into<String>, justify: bool) {
        self.paragraphs.push(Paragraph {
            text: text.into(),
            justify,
        });
    }

    /// Append a translated text chunk, numbering its content lines
    pub fn append_text_chunk(&mut self, translated: &str) {
        for line in translated.lines() {
            if line.trim().is_empty() {
                self.append_paragraph("", false);
                continue;
            }

            if !self.title_written {
                self.title_written = true;
                self.append_paragraph(line.trim(), false);
                continue;
            }

            if is_heading(line) {
                self.append_paragraph(line.trim(), false);
                continue;
            }

            self.paragraph_counter += 1;
            let label = format_paragraph_number(self.paragraph_counter);
            self.append_paragraph(label, false);
            self.append_paragraph(line.trim(), true);
        }
    }

    /// Append a translated figure as `original: translated` lines, unnumbered
    pub fn append_figure_chunk(&mut self, pairs: &[ImageTranslationPair]) {
        for pair in pairs {
            self.append_paragraph(format!("{}: {}", pair.original, pair.translated), false);
        }
    }
}
