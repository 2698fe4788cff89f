/*!
 * Grouping of extracted elements into translation units.
 *
 * Text elements are packed greedily under a word budget; every figure
 * becomes its own unit and closes any open text batch.
 */

use crate::document::model::{ContentElement, Figure};
use crate::translation::schema::ImageTranslationPair;

/// Whitespace-delimited token count
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// One or more text elements joined by newlines
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub content: String,
    pub word_count: usize,
    /// Number of source elements in `content`
    pub element_count: usize,
    translated: Option<String>,
}

impl TextChunk {
    pub fn translated(&self) -> Option<&str> {
        self.translated.as_deref()
    }

    pub fn attach_translation(&mut self, translated: String) {
        debug_assert!(self.translated.is_none(), "text chunk translated twice");
        self.translated = Some(translated);
    }
}

/// Exactly one figure
#[derive(Debug, Clone, PartialEq)]
pub struct FigureChunk {
    pub figure: Figure,
    translated: Option<Vec<ImageTranslationPair>>,
}

impl FigureChunk {
    pub fn translated(&self) -> Option<&[ImageTranslationPair]> {
        self.translated.as_deref()
    }

    pub fn attach_translation(&mut self, pairs: Vec<ImageTranslationPair>) {
        debug_assert!(self.translated.is_none(), "figure chunk translated twice");
        self.translated = Some(pairs);
    }
}

/// Translation unit
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    Text(TextChunk),
    Figure(FigureChunk),
}

impl Chunk {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Figure(_) => "figure",
        }
    }

    pub fn word_count(&self) -> usize {
        match self {
            Self::Text(chunk) => chunk.word_count,
            Self::Figure(_) => 0,
        }
    }

    pub fn is_translated(&self) -> bool {
        match self {
            Self::Text(chunk) => chunk.translated.is_some(),
            Self::Figure(chunk) => chunk.translated.is_some(),
        }
    }
}

/// Accumulates text elements until the budget would overflow
#[derive(Default)]
struct TextBuffer {
    lines: Vec<String>,
    words: usize,
}

impl TextBuffer {
    fn flush_into(&mut self, chunks: &mut Vec<Chunk>) {
        if self.lines.is_empty() {
            return;
        }
        let lines = std::mem::take(&mut self.lines);
        chunks.push(Chunk::Text(TextChunk {
            content: lines.join("\n"),
            word_count: self.words,
            element_count: lines.len(),
            translated: None,
        }));
        self.words = 0;
    }
}

/// Group `elements` into chunks of at most `max_words` words
///
/// A text element that alone exceeds the budget is never split: it becomes
/// the sole content of its chunk.
pub fn chunk_elements(elements: &[ContentElement], max_words: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut buffer = TextBuffer::default();

    for element in elements {
        match element {
            ContentElement::Text(text) => {
                let words = count_words(text);
                if buffer.words + words > max_words && !buffer.lines.is_empty() {
                    buffer.flush_into(&mut chunks);
                }
                buffer.lines.push(text.clone());
                buffer.words += words;
            }
            ContentElement::Figure(figure) => {
                buffer.flush_into(&mut chunks);
                chunks.push(Chunk::Figure(FigureChunk {
                    figure: figure.clone(),
                    translated: None,
                }));
            }
        }
    }
    buffer.flush_into(&mut chunks);

    chunks
}
