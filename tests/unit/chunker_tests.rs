/*!
 * Tests for grouping content elements into translation units
 */

use image::ImageFormat;
use patent_translator::document::{ContentElement, Figure};
use patent_translator::translation::chunker::count_words;
use patent_translator::translation::{Chunk, chunk_elements};

fn text(s: &str) -> ContentElement {
    ContentElement::Text(s.to_string())
}

fn figure(embed_id: &str) -> ContentElement {
    ContentElement::Figure(Figure {
        embed_id: embed_id.to_string(),
        part_name: format!("word/media/{}.png", embed_id),
        format: ImageFormat::Png,
        width: 4,
        height: 3,
        bytes: vec![0x89, b'P', b'N', b'G'],
    })
}

/// Rebuild the element sequence a chunk list was made from
fn flatten(chunks: &[Chunk]) -> Vec<ContentElement> {
    let mut out = Vec::new();
    for chunk in chunks {
        match chunk {
            Chunk::Text(t) => out.extend(t.content.split('\n').map(text)),
            Chunk::Figure(f) => out.push(ContentElement::Figure(f.figure.clone())),
        }
    }
    out
}

fn mixed_elements() -> Vec<ContentElement> {
    vec![
        text("특허 청구 범위"),
        text("청구항 1 은 다음과 같다"),
        figure("rId5"),
        text(&"단어 ".repeat(30)),
        text("짧은 문단"),
        figure("rId6"),
        figure("rId7"),
        text("마지막 문단 입니다"),
        text(&"긴 ".repeat(12)),
    ]
}

#[test]
fn test_chunkElements_withTwoShortParagraphs_shouldJoinIntoOneChunk() {
    let chunks = chunk_elements(&[text("한국어 문단 하나"), text("한국어 문단 둘")], 2000);

    assert_eq!(chunks.len(), 1);
    match &chunks[0] {
        Chunk::Text(t) => {
            assert_eq!(t.content, "한국어 문단 하나\n한국어 문단 둘");
            assert_eq!(t.word_count, 6);
            assert_eq!(t.element_count, 2);
            assert!(t.translated().is_none());
        }
        other => panic!("expected text chunk, got {:?}", other),
    }
}

#[test]
fn test_chunkElements_withOversizedParagraphAndFigure_shouldKeepParagraphIntact() {
    let long = "word ".repeat(150);
    let short = "word ".repeat(10);
    let elements = vec![text(long.trim()), figure("rId1"), text(short.trim())];

    let chunks = chunk_elements(&elements, 100);

    assert_eq!(chunks.len(), 3);
    assert!(matches!(&chunks[0], Chunk::Text(t) if t.word_count == 150 && t.element_count == 1));
    assert!(matches!(&chunks[1], Chunk::Figure(f) if f.figure.embed_id == "rId1"));
    assert!(matches!(&chunks[2], Chunk::Text(t) if t.word_count == 10));
}

#[test]
fn test_chunkElements_withEmptyInput_shouldReturnNoChunks() {
    assert!(chunk_elements(&[], 10).is_empty());
}

#[test]
fn test_chunkElements_withOnlyFigures_shouldEmitOneChunkPerFigure() {
    let chunks = chunk_elements(&[figure("a"), figure("b")], 10);
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| c.kind() == "figure" && c.word_count() == 0));
}

#[test]
fn test_chunkElements_withOversizedAfterBuffered_shouldFlushBufferFirst() {
    let chunks = chunk_elements(&[text("a b"), text("c d e f g")], 3);
    assert_eq!(chunks.len(), 2);
    assert!(matches!(&chunks[0], Chunk::Text(t) if t.content == "a b"));
    assert!(matches!(&chunks[1], Chunk::Text(t) if t.word_count == 5));
}

#[test]
fn test_chunkElements_anyBudget_shouldRespectBudgetUnlessSingleElement() {
    let elements = mixed_elements();
    for max_words in 1..=40 {
        for chunk in chunk_elements(&elements, max_words) {
            if let Chunk::Text(t) = chunk {
                assert!(
                    t.word_count <= max_words || t.element_count == 1,
                    "budget {} violated by {:?}",
                    max_words,
                    t
                );
                assert_eq!(t.word_count, count_words(&t.content));
            }
        }
    }
}

#[test]
fn test_chunkElements_anyBudget_shouldPreserveElementOrder() {
    let elements = mixed_elements();
    for max_words in [1, 3, 7, 30, 2000] {
        let chunks = chunk_elements(&elements, max_words);
        assert_eq!(flatten(&chunks), elements, "order broken for budget {}", max_words);
    }
}

#[test]
fn test_chunkElements_shouldIsolateFigures() {
    let chunks = chunk_elements(&mixed_elements(), 2000);
    let kinds: Vec<&str> = chunks.iter().map(Chunk::kind).collect();
    assert_eq!(kinds, vec!["text", "figure", "text", "figure", "figure", "text"]);
}

#[test]
fn test_chunkElements_calledTwice_shouldBeDeterministic() {
    let elements = mixed_elements();
    assert_eq!(chunk_elements(&elements, 8), chunk_elements(&elements, 8));
}
