//! Stage 5: lay out a parsed [`Document`] on A4 pages and write it as PDF.
//!
//! Layout is a simple top-down flow:
//!
//! ```text
//!  Document ──► blocks ──► words ──► lines ──► PlacedText on pages ──► lopdf objects
//! ```
//!
//! Body text is 10 pt on a 14 pt leading, justified except for the last line
//! of a paragraph. Headings use the bold face at a size that depends on the
//! level. Bullet items are indented 18 pt behind a `•`. A new page starts
//! whenever the next line would cross the bottom margin.
//!
//! The writer only references the standard PDF fonts (see
//! [`crate::pipeline::fonts`]) so no font program is embedded and the output
//! stays small.

use crate::error::{Result, SummarizerError};
use crate::pipeline::fonts::{encode_text_string, encode_win_ansi, Font};
use crate::pipeline::inline::{InlineStyle, Span};
use crate::pipeline::markdown::{Block, Document, Gap};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, Stream};
use tracing::debug;

/// A4 width in points.
pub const PAGE_WIDTH: f32 = 595.28;
/// A4 height in points.
pub const PAGE_HEIGHT: f32 = 841.89;
/// 2 cm on every side.
pub const MARGIN: f32 = 56.69;

const BODY_SIZE: f32 = 10.0;
const BODY_LEADING: f32 = 14.0;
const BODY_SPACE_BEFORE: f32 = 4.0;
const BULLET_INDENT: f32 = 18.0;
const BULLET_SPACE_BEFORE: f32 = 2.0;
const SPACE_AFTER_LIST: f32 = 8.0;
const LINE_GAP: f32 = 10.0;
const SECTION_GAP: f32 = 14.0;

/// One run of text at a fixed position. `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub x: f32,
    pub y: f32,
    pub font: Font,
    pub size: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<PlacedText>,
}

impl Page {
    /// Text on the page in placement order, runs separated by spaces.
    pub fn text(&self) -> String {
        self.items
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of laying out a document; always holds at least one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub pages: Vec<Page>,
}

/// Typographic parameters of a paragraph-like block.
#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    leading: f32,
    bold: bool,
    space_before: f32,
    space_after: f32,
    justify: bool,
}

impl TextStyle {
    fn body() -> Self {
        Self {
            size: BODY_SIZE,
            leading: BODY_LEADING,
            bold: false,
            space_before: BODY_SPACE_BEFORE,
            space_after: 0.0,
            justify: true,
        }
    }

    fn heading(level: u8) -> Self {
        let (size, space_before, space_after) = match level {
            1 => (18.0, 0.0, 12.0),
            2 => (14.0, 12.0, 10.0),
            3 => (12.0, 12.0, 8.0),
            4 => (11.0, 10.0, 6.0),
            5 => (10.0, 8.0, 5.0),
            _ => (9.0, 8.0, 4.0),
        };
        Self {
            size,
            leading: size * 1.2,
            bold: true,
            space_before,
            space_after,
            justify: false,
        }
    }
}

/// Code is always Courier, whatever emphasis surrounds it.
fn font_for(style: InlineStyle, bold: bool) -> Font {
    if style.code {
        return Font::Mono;
    }
    match (style.bold || bold, style.italic) {
        (false, false) => Font::Regular,
        (true, false) => Font::Bold,
        (false, true) => Font::Italic,
        (true, true) => Font::BoldItalic,
    }
}

/// A whitespace-delimited word; may mix fonts (`**bold**,`).
#[derive(Debug, Clone, Default)]
struct Word {
    pieces: Vec<(Font, String)>,
}

impl Word {
    fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    fn push(&mut self, font: Font, ch: char) {
        match self.pieces.last_mut() {
            Some((last, text)) if *last == font => text.push(ch),
            _ => self.pieces.push((font, ch.to_string())),
        }
    }

    fn width(&self, size: f32) -> f32 {
        self.pieces
            .iter()
            .map(|(font, text)| font.text_width(text, size))
            .sum()
    }

    /// Break a word wider than `max` into pieces that fit.
    fn split_to_width(self, size: f32, max: f32) -> Vec<Word> {
        let mut out = Vec::new();
        let mut current = Word::default();
        let mut width = 0.0;
        for (font, text) in self.pieces {
            for ch in text.chars() {
                let w = font.char_width(ch) as f32 * size / 1000.0;
                if width + w > max && !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                    width = 0.0;
                }
                current.push(font, ch);
                width += w;
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
        out
    }
}

fn words(spans: &[Span], bold: bool) -> Vec<Word> {
    let mut out = Vec::new();
    let mut current = Word::default();
    for span in spans {
        let font = font_for(span.style, bold);
        for ch in span.text.chars() {
            if ch.is_whitespace() {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            } else {
                current.push(font, ch);
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Greedy line filling.
fn wrap(words: Vec<Word>, size: f32, max: f32, space: f32) -> Vec<Vec<Word>> {
    let mut lines: Vec<Vec<Word>> = Vec::new();
    let mut line: Vec<Word> = Vec::new();
    let mut width = 0.0;
    for word in words {
        let pieces = if word.width(size) > max {
            word.split_to_width(size, max)
        } else {
            vec![word]
        };
        for piece in pieces {
            let w = piece.width(size);
            let needed = if line.is_empty() { w } else { width + space + w };
            if needed > max && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                width = w;
            } else {
                width = needed;
            }
            line.push(piece);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

struct LayoutEngine {
    pages: Vec<Page>,
    /// Distance of the next line's top from the page bottom.
    cursor: f32,
}

impl LayoutEngine {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            cursor: Self::top(),
        }
    }

    fn top() -> f32 {
        PAGE_HEIGHT - MARGIN
    }

    fn at_page_top(&self) -> bool {
        (self.cursor - Self::top()).abs() < f32::EPSILON
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = Self::top();
    }

    /// Vertical space; clamped at the bottom margin, never starts a page.
    fn space(&mut self, height: f32) {
        if self.at_page_top() {
            return;
        }
        self.cursor = (self.cursor - height).max(MARGIN);
    }

    /// Reserve one line of `leading` and return its baseline.
    fn line(&mut self, leading: f32, size: f32) -> f32 {
        if self.cursor - leading < MARGIN && !self.at_page_top() {
            self.new_page();
        }
        let baseline = self.cursor - size;
        self.cursor -= leading;
        baseline
    }

    fn place(&mut self, item: PlacedText) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    /// Flow `spans` as one paragraph; returns the page index and baseline
    /// of its first line.
    fn paragraph(&mut self, spans: &[Span], style: TextStyle, left: f32) -> Option<(usize, f32)> {
        let max = PAGE_WIDTH - MARGIN - left;
        let space = Font::Regular.char_width(' ') as f32 * style.size / 1000.0;
        let lines = wrap(words(spans, style.bold), style.size, max, space);
        if lines.is_empty() {
            return None;
        }
        self.space(style.space_before);
        let count = lines.len();
        let mut first = None;
        for (i, line) in lines.into_iter().enumerate() {
            let y = self.line(style.leading, style.size);
            first.get_or_insert((self.pages.len() - 1, y));
            let natural: f32 = line.iter().map(|w| w.width(style.size)).sum();
            let gap = if style.justify && i + 1 < count && line.len() > 1 {
                (max - natural) / (line.len() - 1) as f32
            } else {
                space
            };
            let mut x = left;
            for word in line {
                for (font, text) in word.pieces {
                    let width = font.text_width(&text, style.size);
                    self.place(PlacedText {
                        x,
                        y,
                        font,
                        size: style.size,
                        text,
                    });
                    x += width;
                }
                x += gap;
            }
        }
        self.space(style.space_after);
        first
    }

    fn bullets(&mut self, items: &[Vec<Span>]) {
        let style = TextStyle {
            space_before: BULLET_SPACE_BEFORE,
            ..TextStyle::body()
        };
        for item in items {
            let Some((page, y)) = self.paragraph(item, style, MARGIN + BULLET_INDENT) else {
                continue;
            };
            if let Some(page) = self.pages.get_mut(page) {
                page.items.push(PlacedText {
                    x: MARGIN + 4.0,
                    y,
                    font: Font::Regular,
                    size: BODY_SIZE,
                    text: "•".to_string(),
                });
            }
        }
        self.space(SPACE_AFTER_LIST);
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Heading { level, spans } => {
                self.paragraph(spans, TextStyle::heading(*level), MARGIN);
            }
            Block::Paragraph(spans) => {
                self.paragraph(spans, TextStyle::body(), MARGIN);
            }
            Block::BulletList(items) => self.bullets(items),
            Block::Break(Gap::Line) => self.space(LINE_GAP),
            Block::Break(Gap::Section) => self.space(SECTION_GAP),
        }
    }
}

/// Flow every block of `doc` onto pages.
pub fn layout_document(doc: &Document) -> Layout {
    let mut engine = LayoutEngine::new();
    for block in &doc.blocks {
        engine.block(block);
    }
    Layout {
        pages: engine.pages,
    }
}

fn page_content(page: &Page) -> Content {
    let mut operations = Vec::with_capacity(page.items.len() * 5);
    for item in &page.items {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![item.font.resource_name().into(), Object::Real(item.size)],
        ));
        operations.push(Operation::new(
            "Td",
            vec![Object::Real(item.x), Object::Real(item.y)],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(&item.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }
}

/// Serialise a layout to PDF bytes.
pub fn write_pdf(layout: &Layout, title: &str) -> Result<Vec<u8>> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_name(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = page_content(page)
            .encode()
            .map_err(|e| SummarizerError::RenderFailed(format!("encode page content: {e}")))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH),
            Object::Real(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_text_string(title)),
        "Producer" => Object::string_literal(concat!("lesson-summarizer ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| SummarizerError::RenderFailed(format!("write PDF: {e}")))?;
    debug!(pages = layout.pages.len(), bytes = bytes.len(), "PDF written");
    Ok(bytes)
}

/// Lay out and write `doc` in one step.
pub fn render_pdf(doc: &Document) -> Result<Vec<u8>> {
    write_pdf(&layout_document(doc), &doc.title)
}
