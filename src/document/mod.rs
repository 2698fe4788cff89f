/*!
 * Word-processing document handling.
 *
 * - `package`: read `.docx` containers and their relationships
 * - `extractor`: ordered text and figure extraction
 * - `assembler`: translated output with patent paragraph numbering
 * - `writer`: serialize the output document to `.docx` bytes
 */

pub mod assembler;
pub mod extractor;
pub mod model;
pub mod package;
pub mod writer;

pub use assembler::{DocumentStyle, OutputDocument, Paragraph, new_output_document};
pub use extractor::ContentExtractor;
pub use model::{ContentElement, Figure};
pub use package::DocxPackage;
