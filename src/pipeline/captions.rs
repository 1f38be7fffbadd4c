//! Caption cleanup: turn SRT / WebVTT subtitle files into running text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RE_TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}:\d{2}:\d{2}[.,]\d{3}").unwrap());
static RE_ARROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-->\s*").unwrap());
static RE_INDEX_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\d+\s*$").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

/// Does `text` look like a WebVTT file?
pub fn is_vtt(text: &str) -> bool {
    text.trim_start_matches('\u{FEFF}').starts_with("WEBVTT")
}

/// Generic subtitle cleanup (SRT or VTT-ish).
///
/// Removes `HH:MM:SS,mmm` timestamps, numeric index lines and `-->` arrows,
/// decodes HTML entities and collapses all whitespace to single spaces.
/// Index lines go before arrows: the arrow pass swallows the surrounding
/// newlines and would glue the index onto the cue text.
pub fn clean_subtitles(raw: &str) -> String {
    let text = RE_TIMESTAMP.replace_all(raw, "");
    let text = RE_INDEX_LINE.replace_all(&text, "");
    let text = RE_ARROW.replace_all(&text, " ");
    let text = unescape_html(&text);
    RE_WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// WebVTT cleanup: keep only cue payload lines, without tags, joined by spaces.
pub fn clean_vtt(vtt: &str) -> String {
    vtt.lines()
        .map(|line| line.trim().trim_start_matches('\u{FEFF}'))
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("WEBVTT"))
        .filter(|line| !line.contains("-->"))
        .filter(|line| !line.bytes().all(|b| b.is_ascii_digit()))
        .map(|line| RE_TAG.replace_all(line, "").into_owned())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Clean caption text, picking the VTT pass when the header is present.
pub fn clean_captions(raw: &str) -> String {
    if is_vtt(raw) {
        clean_subtitles(&clean_vtt(raw))
    } else {
        clean_subtitles(raw)
    }
}

fn unescape_html(text: &str) -> String {
    RE_ENTITY
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            decode_entity(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "hellip" => '…',
        "ndash" => '–',
        "mdash" => '—',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        _ => return None,
    };
    Some(ch.to_string())
}
