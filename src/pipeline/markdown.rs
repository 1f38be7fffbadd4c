//! Line classifier for the Markdown subset the PDF renderer understands.
//!
//! The scan is a single pass over the lines of the document. Each trimmed
//! line is classified in this order:
//!
//! | Line | Block |
//! |------|-------|
//! | blank | flush bullets, [`Block::Break`] (`Gap::Line`) |
//! | `---` | flush bullets, [`Block::Break`] (`Gap::Section`) |
//! | `- x` / `* x` | appended to the pending bullet list |
//! | `#`..`######` + space | flush bullets, [`Block::Heading`] |
//! | anything else | flush bullets, [`Block::Paragraph`] |
//!
//! Bullets accumulate across consecutive lines and are emitted as one
//! [`Block::BulletList`] when any other line (or the end of input) is reached.
//! Alternate bullet glyphs (`•`, `–`, `—` followed by a space) are rewritten
//! to `- ` before classification.

use crate::pipeline::inline::{parse_inline, plain_text, Span};
use serde::Serialize;

/// Vertical gap between sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gap {
    /// Produced by a blank line.
    Line,
    /// Produced by a `---` separator. Larger than `Line`, never a page break.
    Section,
}

/// One structural unit of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Block {
    Heading { level: u8, spans: Vec<Span> },
    Paragraph(Vec<Span>),
    BulletList(Vec<Vec<Span>>),
    Break(Gap),
}

impl Block {
    /// Unstyled text of the block (items joined by newlines).
    pub fn text(&self) -> String {
        match self {
            Block::Heading { spans, .. } | Block::Paragraph(spans) => plain_text(spans),
            Block::BulletList(items) => items
                .iter()
                .map(|item| plain_text(item))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Break(_) => String::new(),
        }
    }
}

/// A titled, parsed study document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Document {
    /// Parse `markdown` into blocks.
    pub fn parse(markdown: &str, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: parse_blocks(markdown),
        }
    }

    /// Blocks other than breaks, in document order.
    pub fn content_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| !matches!(b, Block::Break(_)))
    }
}

const BULLET_GLYPHS: [&str; 3] = ["• ", "– ", "— "];

/// Rewrite a leading alternate bullet glyph to `- `.
///
/// Only the line prefix is touched: a dash inside a sentence ("2010 – 2015",
/// "x — y") is punctuation, not a list marker.
fn normalise_bullet(line: &str) -> String {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];
    for glyph in BULLET_GLYPHS {
        if let Some(rest) = body.strip_prefix(glyph) {
            return format!("{indent}- {rest}");
        }
    }
    line.to_string()
}

/// Heading level and text for `#`..`######` followed by a space.
fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    line[hashes..]
        .strip_prefix(' ')
        .map(|text| (hashes as u8, text.trim()))
}

/// Classify every line of `markdown` into blocks.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut pending: Vec<Vec<Span>> = Vec::new();

    fn flush(blocks: &mut Vec<Block>, pending: &mut Vec<Vec<Span>>) {
        if !pending.is_empty() {
            blocks.push(Block::BulletList(std::mem::take(pending)));
        }
    }

    for raw in markdown.trim().lines() {
        let normalised = normalise_bullet(raw.trim_end());
        let line = normalised.trim();

        if line.is_empty() {
            flush(&mut blocks, &mut pending);
            blocks.push(Block::Break(Gap::Line));
            continue;
        }

        if line == "---" {
            flush(&mut blocks, &mut pending);
            blocks.push(Block::Break(Gap::Section));
            continue;
        }

        if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            pending.push(parse_inline(item.trim()));
            continue;
        }

        flush(&mut blocks, &mut pending);

        if let Some((level, text)) = heading(line) {
            blocks.push(Block::Heading {
                level,
                spans: parse_inline(text),
            });
            continue;
        }

        blocks.push(Block::Paragraph(parse_inline(line)));
    }

    flush(&mut blocks, &mut pending);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::inline::InlineStyle;

    #[test]
    fn test_heading_list_paragraph_sequence() {
        let doc = Document::parse("## Title\n\n- a\n- b\n\nplain text", "t");
        let content: Vec<&Block> = doc.content_blocks().collect();
        assert_eq!(content.len(), 3);
        assert!(matches!(content[0], Block::Heading { level: 2, .. }));
        assert_eq!(content[0].text(), "Title");
        match content[1] {
            Block::BulletList(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(plain_text(&items[0]), "a");
                assert_eq!(plain_text(&items[1]), "b");
            }
            other => panic!("expected bullet list, got {other:?}"),
        }
        assert_eq!(content[2], &Block::Paragraph(vec![Span::new(InlineStyle::PLAIN, "plain text")]));
    }

    #[test]
    fn test_breaks_are_interleaved() {
        let blocks = parse_blocks("# A\n\ntext\n---\nmore");
        assert_eq!(blocks[1], Block::Break(Gap::Line));
        assert_eq!(blocks[3], Block::Break(Gap::Section));
    }

    #[test]
    fn test_all_heading_levels() {
        let md = "# 1\n## 2\n### 3\n#### 4\n##### 5\n###### 6\n####### 7";
        let blocks = parse_blocks(md);
        let levels: Vec<u8> = blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { level, .. } => Some(*level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5, 6]);
        assert!(matches!(blocks[6], Block::Paragraph(_)));
    }

    #[test]
    fn test_hash_without_space_is_paragraph() {
        assert!(matches!(parse_blocks("#hashtag")[0], Block::Paragraph(_)));
    }

    #[test]
    fn test_alternate_bullet_glyphs() {
        let blocks = parse_blocks("• one\n– two\n— three\n* four");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), "one\ntwo\nthree\nfour");
    }

    #[test]
    fn test_dash_inside_sentence_is_not_a_bullet() {
        let blocks = parse_blocks("Ethics — the study of action");
        assert_eq!(blocks[0].text(), "Ethics — the study of action");
    }

    #[test]
    fn test_bullets_flushed_before_heading() {
        let blocks = parse_blocks("- a\n# H\n- b");
        assert!(matches!(blocks[0], Block::BulletList(ref i) if i.len() == 1));
        assert!(matches!(blocks[1], Block::Heading { level: 1, .. }));
        assert!(matches!(blocks[2], Block::BulletList(ref i) if i.len() == 1));
    }

    #[test]
    fn test_indented_bullets_and_inline_in_items() {
        let blocks = parse_blocks("   - **Key**: value");
        match &blocks[0] {
            Block::BulletList(items) => {
                assert_eq!(items[0][0], Span::new(InlineStyle::BOLD, "Key"));
            }
            other => panic!("expected bullet list, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_document_has_no_blocks() {
        assert!(parse_blocks("  \n\n ").is_empty());
    }

    #[test]
    fn test_crlf_lines() {
        let blocks = parse_blocks("# T\r\n\r\nbody\r\n");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2].text(), "body");
    }
}
