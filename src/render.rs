//! Markdown → PDF entry points.

use crate::error::Result;
use crate::pipeline::markdown::Document;
use crate::pipeline::pdf;
use std::path::Path;
use tracing::info;

/// Render Markdown to PDF bytes.
///
/// Understands the line-oriented subset produced by the summarizer: headings
/// `#`..`######`, `-`/`*` bullet lists, paragraphs, `---` section breaks and
/// inline `**bold**`, `*italic*` and `` `code` ``. Everything else is laid out
/// as paragraph text. `title` goes into the document info; it is not printed
/// on the page.
///
/// # Example
///
/// ```rust
/// let pdf = lesson_summarizer::markdown_to_pdf_bytes("# Notes\n\n- one\n- two", "Notes").unwrap();
/// assert!(pdf.starts_with(b"%PDF-"));
/// ```
pub fn markdown_to_pdf_bytes(markdown: &str, title: &str) -> Result<Vec<u8>> {
    let doc = Document::parse(markdown, title);
    let layout = pdf::layout_document(&doc);
    info!(
        "Rendering '{}': {} blocks on {} page(s)",
        doc.title,
        doc.blocks.len(),
        layout.pages.len()
    );
    pdf::write_pdf(&layout, &doc.title)
}

/// Render Markdown and write the PDF atomically to `path`.
pub fn markdown_to_pdf_file(markdown: &str, title: &str, path: impl AsRef<Path>) -> Result<()> {
    let bytes = markdown_to_pdf_bytes(markdown, title)?;
    crate::output::write_atomic(path.as_ref(), &bytes)
}
