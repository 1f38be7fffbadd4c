//! Inline formatting: backtick code, `**bold**` and `*italic*`.
//!
//! A line is split into styled [`Span`]s in three passes:
//!
//! 1. code spans (`` `x` ``) are located first and masked out, so code
//!    containing `*` is never misread as emphasis;
//! 2. `**bold**` is matched over the whole masked line;
//! 3. `*italic*` is matched in what is left, skipping any candidate that
//!    touches another `*` on either side.
//!
//! Emphasis may wrap a code span (`` **`map()`** ``); the code keeps its
//! emphasis flags and is still drawn fixed-width. Unmatched markers stay in
//! the text literally. [`to_markup`] serialises spans to the small tag
//! language used for inspection (`<b>`, `<i>`, `<font face="Courier">`),
//! escaping `&`, `<` and `>` in the text before the tags are inserted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::ops::Range;

static RE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static RE_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());

/// Stands in for every byte of a code span while emphasis is matched.
/// ASCII, so byte offsets in the masked line equal those in the source.
const CODE_MASK: char = '\u{1}';

/// Visual style of a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

impl InlineStyle {
    pub const PLAIN: Self = Self {
        bold: false,
        italic: false,
        code: false,
    };
    pub const BOLD: Self = Self {
        bold: true,
        ..Self::PLAIN
    };
    pub const ITALIC: Self = Self {
        italic: true,
        ..Self::PLAIN
    };
    pub const CODE: Self = Self {
        code: true,
        ..Self::PLAIN
    };

    /// Same emphasis, drawn as code.
    pub const fn with_code(self) -> Self {
        Self { code: true, ..self }
    }
}

/// A run of text with a single style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub style: InlineStyle,
    pub text: String,
}

impl Span {
    pub fn new(style: InlineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

/// Whole match and content range of each code span.
type CodeSpans = Vec<(Range<usize>, Range<usize>)>;

/// Split one line of Markdown into styled spans.
pub fn parse_inline(line: &str) -> Vec<Span> {
    let code: CodeSpans = RE_CODE
        .captures_iter(line)
        .filter_map(|caps| Some((caps.get(0)?.range(), caps.get(1)?.range())))
        .collect();
    let masked = mask(line, &code);

    let mut spans = Vec::new();
    let mut last = 0;
    for caps in RE_BOLD.captures_iter(&masked) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        parse_italic(line, &masked, last..whole.start(), &code, &mut spans);
        emit(line, inner.range(), InlineStyle::BOLD, &code, &mut spans);
        last = whole.end();
    }
    parse_italic(line, &masked, last..masked.len(), &code, &mut spans);
    spans
}

fn mask(line: &str, code: &CodeSpans) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for (whole, _) in code {
        out.push_str(&line[last..whole.start]);
        out.extend(std::iter::repeat(CODE_MASK).take(whole.end - whole.start));
        last = whole.end;
    }
    out.push_str(&line[last..]);
    out
}

fn parse_italic(
    line: &str,
    masked: &str,
    range: Range<usize>,
    code: &CodeSpans,
    spans: &mut Vec<Span>,
) {
    let base = range.start;
    let segment = &masked[range.clone()];
    let bytes = segment.as_bytes();
    let mut last = 0;
    let mut from = 0;
    while let Some(caps) = RE_ITALIC.captures_at(segment, from) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let star_before = whole.start() > 0 && bytes[whole.start() - 1] == b'*';
        let star_after = bytes.get(whole.end()) == Some(&b'*');
        if star_before || star_after {
            // `*` is ASCII, so start + 1 is a char boundary.
            from = whole.start() + 1;
            continue;
        }
        emit(line, base + last..base + whole.start(), InlineStyle::PLAIN, code, spans);
        emit(
            line,
            base + inner.start()..base + inner.end(),
            InlineStyle::ITALIC,
            code,
            spans,
        );
        last = whole.end();
        from = whole.end();
    }
    emit(line, base + last..range.end, InlineStyle::PLAIN, code, spans);
}

/// Push `line[range]` in `style`, restoring the code spans it contains.
fn emit(line: &str, range: Range<usize>, style: InlineStyle, code: &CodeSpans, spans: &mut Vec<Span>) {
    let mut last = range.start;
    for (whole, inner) in code
        .iter()
        .filter(|(whole, _)| whole.start >= range.start && whole.end <= range.end)
    {
        push(spans, style, &line[last..whole.start]);
        push(spans, style.with_code(), &line[inner.clone()]);
        last = whole.end;
    }
    push(spans, style, &line[last..range.end]);
}

/// Append a span, merging adjacent plain text and dropping empty runs.
fn push(spans: &mut Vec<Span>, style: InlineStyle, text: &str) {
    if text.is_empty() {
        return;
    }
    if style == InlineStyle::PLAIN {
        if let Some(prev) = spans.last_mut() {
            if prev.style == InlineStyle::PLAIN {
                prev.text.push_str(text);
                return;
            }
        }
    }
    spans.push(Span::new(style, text));
}

/// Escape the three markup-significant characters.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Serialise spans to tagged markup; text is escaped before tags are added.
pub fn to_markup(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        let style = span.style;
        if style.bold {
            out.push_str("<b>");
        }
        if style.italic {
            out.push_str("<i>");
        }
        if style.code {
            out.push_str("<font face=\"Courier\">");
        }
        out.push_str(&escape(&span.text));
        if style.code {
            out.push_str("</font>");
        }
        if style.italic {
            out.push_str("</i>");
        }
        if style.bold {
            out.push_str("</b>");
        }
    }
    out
}

/// Concatenated text of all spans, without styling.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: InlineStyle = InlineStyle::PLAIN;
    const BOLD: InlineStyle = InlineStyle::BOLD;
    const ITALIC: InlineStyle = InlineStyle::ITALIC;
    const CODE: InlineStyle = InlineStyle::CODE;

    #[test]
    fn test_plain_line_is_one_span() {
        assert_eq!(parse_inline("just text"), vec![Span::new(PLAIN, "just text")]);
    }

    #[test]
    fn test_bold_italic_and_code_precedence() {
        let spans = parse_inline("**bold** and *italic* and `code *not italic*`");
        assert_eq!(
            spans,
            vec![
                Span::new(BOLD, "bold"),
                Span::new(PLAIN, " and "),
                Span::new(ITALIC, "italic"),
                Span::new(PLAIN, " and "),
                Span::new(CODE, "code *not italic*"),
            ]
        );
    }

    #[test]
    fn test_bold_wraps_code() {
        let spans = parse_inline("**`map()`**: applies f");
        assert_eq!(
            spans,
            vec![
                Span::new(BOLD.with_code(), "map()"),
                Span::new(PLAIN, ": applies f"),
            ]
        );
        assert_eq!(
            to_markup(&spans),
            "<b><font face=\"Courier\">map()</font></b>: applies f"
        );
    }

    #[test]
    fn test_italic_wraps_text_around_code() {
        let spans = parse_inline("*see `x` here*");
        assert_eq!(
            spans,
            vec![
                Span::new(ITALIC, "see "),
                Span::new(ITALIC.with_code(), "x"),
                Span::new(ITALIC, " here"),
            ]
        );
    }

    #[test]
    fn test_stars_inside_code_do_not_break_bold() {
        let spans = parse_inline("**a `x*y` b**");
        assert_eq!(
            spans,
            vec![
                Span::new(BOLD, "a "),
                Span::new(BOLD.with_code(), "x*y"),
                Span::new(BOLD, " b"),
            ]
        );
    }

    #[test]
    fn test_double_asterisks_are_not_italic() {
        let spans = parse_inline("**x**");
        assert_eq!(spans, vec![Span::new(BOLD, "x")]);
    }

    #[test]
    fn test_italic_adjacent_to_star_is_skipped() {
        // `*b*` is preceded by another `*`; matching resumes one char later.
        let spans = parse_inline("a ***b* c *d*");
        assert_eq!(
            spans,
            vec![
                Span::new(PLAIN, "a ***b"),
                Span::new(ITALIC, " c "),
                Span::new(PLAIN, "d*"),
            ]
        );
    }

    #[test]
    fn test_unmatched_markers_stay_literal() {
        assert_eq!(parse_inline("2 * 3 = 6"), vec![Span::new(PLAIN, "2 * 3 = 6")]);
        assert_eq!(parse_inline("a `b"), vec![Span::new(PLAIN, "a `b")]);
    }

    #[test]
    fn test_markup_escapes_before_tagging() {
        let spans = parse_inline("if a < b && c > d then **<ok>**");
        let markup = to_markup(&spans);
        assert_eq!(
            markup,
            "if a &lt; b &amp;&amp; c &gt; d then <b>&lt;ok&gt;</b>"
        );
    }

    #[test]
    fn test_markup_has_no_raw_source_markup_chars() {
        let spans = parse_inline("<script>&</script> `<b>`");
        let markup = to_markup(&spans);
        let stripped = markup
            .replace("<font face=\"Courier\">", "")
            .replace("</font>", "");
        assert!(!stripped.contains('<'));
        assert!(!stripped.contains('>'));
        assert!(stripped.contains("&amp;"));
    }

    #[test]
    fn test_code_markup_is_fixed_width_and_unformatted() {
        let markup = to_markup(&parse_inline("`x*y*z`"));
        assert_eq!(markup, "<font face=\"Courier\">x*y*z</font>");
    }

    #[test]
    fn test_plain_text_roundtrip_of_content() {
        let spans = parse_inline("**A** b *c* `d`");
        assert_eq!(plain_text(&spans), "A b c d");
    }
}
