/*!
 * Tests for ordered content extraction from .docx packages
 */

use image::ImageFormat;
use patent_translator::app_config::FigureDecodePolicy;
use patent_translator::document::{ContentElement, ContentExtractor, DocxPackage};
use patent_translator::errors::DocumentError;

use crate::common::{DocxBuilder, init_logging, tiny_image};

fn extract(builder: &DocxBuilder, policy: FigureDecodePolicy) -> Result<Vec<ContentElement>, DocumentError> {
    ContentExtractor::new(policy).extract_bytes(&builder.build())
}

#[test]
fn test_extract_withTextParagraphs_shouldKeepOrderAndSkipBlank() {
    init_logging();
    let builder = DocxBuilder::new()
        .text("【발명의 명칭】")
        .text("   ")
        .text("  반도체 장치  ")
        .text("")
        .text("제조 방법");

    let elements = extract(&builder, FigureDecodePolicy::Abort).unwrap();

    assert_eq!(
        elements,
        vec![
            ContentElement::Text("【발명의 명칭】".to_string()),
            ContentElement::Text("반도체 장치".to_string()),
            ContentElement::Text("제조 방법".to_string()),
        ]
    );
}

#[test]
fn test_extract_withPicture_shouldEmitTextBeforeFigure() {
    let builder = DocxBuilder::new()
        .picture("도 1 은 단면도이다", "rId5", "image1.png", tiny_image(ImageFormat::Png))
        .text("후속 문단");

    let elements = extract(&builder, FigureDecodePolicy::Abort).unwrap();

    assert_eq!(elements.len(), 3);
    assert_eq!(elements[0].as_text(), Some("도 1 은 단면도이다"));
    match &elements[1] {
        ContentElement::Figure(figure) => {
            assert_eq!(figure.embed_id, "rId5");
            assert_eq!(figure.part_name, "word/media/image1.png");
            assert_eq!(figure.mime_type(), "image/png");
            assert_eq!((figure.width, figure.height), (4, 3));
        }
        other => panic!("expected figure, got {:?}", other),
    }
    assert_eq!(elements[2].as_text(), Some("후속 문단"));
}

#[test]
fn test_extract_withPictureOnlyParagraph_shouldEmitOnlyFigure() {
    let builder = DocxBuilder::new().picture("", "rId2", "image2.jpeg", tiny_image(ImageFormat::Jpeg));

    let elements = extract(&builder, FigureDecodePolicy::Abort).unwrap();

    assert_eq!(elements.len(), 1);
    match &elements[0] {
        ContentElement::Figure(figure) => {
            assert_eq!(figure.format, ImageFormat::Jpeg);
            assert_eq!(figure.mime_type(), "image/jpeg");
        }
        other => panic!("expected figure, got {:?}", other),
    }
}

#[test]
fn test_extract_withReusedPicture_shouldEmitFigureEachTime() {
    let builder = DocxBuilder::new()
        .picture("", "rId3", "image3.png", tiny_image(ImageFormat::Png))
        .text("사이")
        .picture_again("rId3");

    let elements = extract(&builder, FigureDecodePolicy::Abort).unwrap();

    let figures: Vec<_> = elements.iter().filter(|e| e.is_figure()).collect();
    assert_eq!(figures.len(), 2);
    assert_eq!(figures[0], figures[1]);
}

#[test]
fn test_extract_withBmpPicture_shouldReencodeAsPng() {
    let builder = DocxBuilder::new().picture("", "rId4", "image4.bmp", tiny_image(ImageFormat::Bmp));

    let elements = extract(&builder, FigureDecodePolicy::Abort).unwrap();

    match &elements[0] {
        ContentElement::Figure(figure) => {
            assert_eq!(figure.format, ImageFormat::Png);
            assert_eq!(image::guess_format(&figure.bytes).unwrap(), ImageFormat::Png);
            assert_eq!(figure.part_name, "word/media/image4.bmp");
        }
        other => panic!("expected figure, got {:?}", other),
    }
}

#[test]
fn test_extract_withCorruptPictureAndAbortPolicy_shouldFailWithDecodeError() {
    let builder = DocxBuilder::new()
        .text("본문")
        .picture("", "rId9", "broken.png", b"not an image at all".to_vec());

    let result = extract(&builder, FigureDecodePolicy::Abort);

    match result {
        Err(DocumentError::Decode { embed_id, part, .. }) => {
            assert_eq!(embed_id, "rId9");
            assert_eq!(part, "word/media/broken.png");
        }
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[test]
fn test_extract_withCorruptPictureAndSkipPolicy_shouldDropOnlyThatFigure() {
    let builder = DocxBuilder::new()
        .text("본문")
        .picture("", "rId9", "broken.png", b"not an image at all".to_vec())
        .picture("", "rId10", "ok.png", tiny_image(ImageFormat::Png));

    let elements = extract(&builder, FigureDecodePolicy::Skip).unwrap();

    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].as_text(), Some("본문"));
    assert!(matches!(&elements[1], ContentElement::Figure(f) if f.embed_id == "rId10"));
}

#[test]
fn test_extract_withMissingImagePart_shouldTreatAsDecodeError() {
    let builder = DocxBuilder::new()
        .dangling_image_rel("rId11", "media/missing.png")
        .picture_again("rId11");

    assert!(matches!(
        extract(&builder, FigureDecodePolicy::Abort),
        Err(DocumentError::Decode { .. })
    ));
    assert!(extract(&builder, FigureDecodePolicy::Skip).unwrap().is_empty());
}

#[test]
fn test_extract_withUnknownEmbedId_shouldIgnoreDrawing() {
    let builder = DocxBuilder::new().text("앞").picture_again("rId404");

    let elements = extract(&builder, FigureDecodePolicy::Abort).unwrap();

    assert_eq!(elements, vec![ContentElement::Text("앞".to_string())]);
}

#[test]
fn test_extract_withTable_shouldOnlyReadBodyParagraphs() {
    let builder = DocxBuilder::new()
        .raw(r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>표 안</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#)
        .text("표 밖");

    let elements = extract(&builder, FigureDecodePolicy::Abort).unwrap();

    assert_eq!(elements, vec![ContentElement::Text("표 밖".to_string())]);
}

#[test]
fn test_extract_withoutDocumentPart_shouldReportMissingPart() {
    let package = DocxPackage::from_bytes(&DocxBuilder::new().build()).unwrap();
    assert!(package.part_names().any(|name| name == "word/document.xml"));

    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file("[Content_Types].xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    let bytes = zip.finish().unwrap().into_inner();

    let result = ContentExtractor::default().extract_bytes(&bytes);
    assert!(matches!(result, Err(DocumentError::MissingPart(part)) if part == "word/document.xml"));
}
