//! Result types returned by the summarization entry points, plus the
//! file-naming and atomic-write helpers used when persisting them.

use crate::error::{Result, SummarizerError};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The complete result of summarizing one transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    /// The assembled document: one `## Part i/total` section per chunk,
    /// separated by `---`.
    pub markdown: String,
    /// Per-part results in chunk order.
    pub parts: Vec<PartResult>,
    pub stats: SummaryStats,
}

/// Result of the completion call for a single chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartResult {
    /// 1-indexed part number.
    pub part: usize,
    pub total: usize,
    /// Character range of the chunk in the trimmed source text.
    pub start_char: usize,
    pub end_char: usize,
    /// Cleaned Markdown returned for this part (without the part heading).
    pub markdown: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
}

/// Aggregate numbers for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_parts: usize,
    /// Characters in the trimmed source text.
    pub total_chars: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_duration_ms: u64,
}

impl SummaryStats {
    pub(crate) fn from_parts(parts: &[PartResult], total_chars: usize, total_duration_ms: u64) -> Self {
        Self {
            total_parts: parts.len(),
            total_chars,
            total_input_tokens: parts.iter().map(|p| p.input_tokens as u64).sum(),
            total_output_tokens: parts.iter().map(|p| p.output_tokens as u64).sum(),
            total_duration_ms,
        }
    }
}

/// Paths written by [`crate::summarize_to_files`].
#[derive(Debug, Clone, Serialize)]
pub struct WrittenFiles {
    pub markdown: PathBuf,
    pub pdf: PathBuf,
}

/// Make `name` safe for use as a file name.
///
/// Whitespace runs become `_`, characters outside `[A-Za-z0-9._-]` are
/// dropped, and an empty result falls back to `document`.
pub fn safe_filename(name: &str) -> String {
    let joined = name.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}

/// Short random identifier used to keep default output names unique.
pub fn run_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Write `bytes` to `path` atomically: a temp file in the same directory is
/// persisted over the target, so readers never see a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let fail = |source: std::io::Error| SummarizerError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(fail)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(fail)?;
    tmp.write_all(bytes).map_err(fail)?;
    tmp.flush().map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("Clase 3: Ética / Kant"), "Clase_3_tica__Kant");
        assert_eq!(safe_filename("  notes  v2.final "), "notes_v2.final");
        assert_eq!(safe_filename("¿?"), "document");
        assert_eq!(safe_filename(""), "document");
    }

    #[test]
    fn test_run_id_shape() {
        let id = run_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, run_id());
    }

    #[test]
    fn test_write_atomic_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.md");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_stats_from_parts() {
        let part = |n, i, o| PartResult {
            part: n,
            total: 2,
            start_char: 0,
            end_char: 10,
            markdown: String::new(),
            input_tokens: i,
            output_tokens: o,
            duration_ms: 1,
        };
        let stats = SummaryStats::from_parts(&[part(1, 10, 5), part(2, 20, 7)], 42, 9);
        assert_eq!(stats.total_parts, 2);
        assert_eq!(stats.total_input_tokens, 30);
        assert_eq!(stats.total_output_tokens, 12);
        assert_eq!(stats.total_chars, 42);
    }
}
