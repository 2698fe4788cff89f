/*!
 * Tests for output document assembly and paragraph numbering
 */

use patent_translator::document::assembler::{format_paragraph_number, is_heading};
use patent_translator::document::writer::to_docx_bytes;
use patent_translator::document::{DocumentStyle, DocxPackage, OutputDocument, new_output_document};
use patent_translator::translation::ImageTranslationPair;

fn texts(doc: &OutputDocument) -> Vec<&str> {
    doc.paragraphs().iter().map(|p| p.text.as_str()).collect()
}

#[test]
fn test_appendTextChunk_withHeadingTitle_shouldNumberContentLines() {
    let mut doc = new_output_document(DocumentStyle::default());

    doc.append_text_chunk("【발명의 명칭】\nFirst content line\n\nSecond content line");

    assert_eq!(
        texts(&doc),
        vec![
            "【발명의 명칭】",
            "【0001】",
            "First content line",
            "",
            "【0002】",
            "Second content line",
        ]
    );
    assert_eq!(doc.paragraph_counter(), 2);
    let justified: Vec<bool> = doc.paragraphs().iter().map(|p| p.justify).collect();
    assert_eq!(justified, vec![false, false, true, false, false, true]);
}

#[test]
fn test_appendTextChunk_withLeadingBlankLine_shouldStillTreatFirstTextAsTitle() {
    let mut doc = new_output_document(DocumentStyle::default());

    doc.append_text_chunk("\n半導体装置\n本発明は");

    assert_eq!(texts(&doc), vec!["", "半導体装置", "【0001】", "本発明は"]);
}

#[test]
fn test_appendTextChunk_acrossChunks_shouldContinueNumbering() {
    let mut doc = new_output_document(DocumentStyle::default());

    doc.append_text_chunk("発明の名称\n【技術分野】\n一行目");
    doc.append_figure_chunk(&[ImageTranslationPair {
        original: "도 1".to_string(),
        translated: "図1".to_string(),
    }]);
    doc.append_text_chunk("【背景技術】\n二行目\n三行目");

    assert_eq!(
        texts(&doc),
        vec![
            "発明の名称",
            "【技術分野】",
            "【0001】",
            "一行目",
            "도 1: 図1",
            "【背景技術】",
            "【0002】",
            "二行目",
            "【0003】",
            "三行目",
        ]
    );
}

#[test]
fn test_appendTextChunk_manyChunks_shouldNumberContiguouslyAndSkipHeadings() {
    let mut doc = new_output_document(DocumentStyle::default());
    for i in 0..40 {
        doc.append_text_chunk(&format!("【見出し{}】\n本文{}\n\n続き{}", i, i, i));
    }

    let is_number = |t: &str| {
        t.starts_with('【')
            && t.ends_with('】')
            && t.trim_matches(|c| c == '【' || c == '】').chars().all(|c| c.is_ascii_digit())
    };
    let numbers: Vec<&str> = doc
        .paragraphs()
        .iter()
        .map(|p| p.text.as_str())
        .filter(|t| is_number(*t))
        .collect();
    let expected: Vec<String> = (1..=numbers.len() as u32).map(format_paragraph_number).collect();
    assert_eq!(numbers, expected);
    assert_eq!(doc.paragraph_counter(), 80);

    // A number paragraph is always followed by a justified content line
    let paragraphs = doc.paragraphs();
    for (i, p) in paragraphs.iter().enumerate() {
        if is_number(&p.text) {
            let next = &paragraphs[i + 1];
            assert!(next.justify);
            assert!(!is_heading(&next.text), "heading {:?} was numbered", next.text);
        }
    }
}

#[test]
fn test_appendFigureChunk_shouldRenderPairsInOrderWithoutNumbers() {
    let mut doc = new_output_document(DocumentStyle::default());
    doc.append_figure_chunk(&[
        ImageTranslationPair {
            original: "기판".to_string(),
            translated: "基板".to_string(),
        },
        ImageTranslationPair {
            original: "100".to_string(),
            translated: "100".to_string(),
        },
    ]);

    assert_eq!(texts(&doc), vec!["기판: 基板", "100: 100"]);
    assert_eq!(doc.paragraph_counter(), 0);
}

#[test]
fn test_formatParagraphNumber_shouldZeroPadToFourDigits() {
    assert_eq!(format_paragraph_number(1), "【0001】");
    assert_eq!(format_paragraph_number(123), "【0123】");
    assert_eq!(format_paragraph_number(12345), "【12345】");
}

#[test]
fn test_toDocxBytes_shouldProduceReadablePackage() {
    let mut doc = new_output_document(DocumentStyle::default());
    doc.append_text_chunk("タイトル\n本文 & 記号 <x>");

    let bytes = to_docx_bytes(&doc).unwrap();
    let package = DocxPackage::from_bytes(&bytes).unwrap();

    let document = String::from_utf8(package.require_part("word/document.xml").unwrap().to_vec()).unwrap();
    assert!(document.contains("タイトル"));
    assert!(document.contains("【0001】"));
    assert!(document.contains("本文 &amp; 記号 &lt;x&gt;"));

    let styles = String::from_utf8(package.require_part("word/styles.xml").unwrap().to_vec()).unwrap();
    assert!(styles.contains("ＭＳ 明朝"));
    assert!(package.part("[Content_Types].xml").is_some());
}
