//! Input resolution: turn a user-supplied path, URL or `-` into transcript text.
//!
//! Transcripts arrive as plain text files, caption files (`.srt`, `.vtt`),
//! a URL pointing at either, or piped on stdin. Everything is read fully into
//! memory: lecture transcripts are a few hundred kilobytes at most. Caption
//! files are cleaned to running text so that cue numbers and timestamps never
//! reach the model.

use crate::error::{Result, SummarizerError};
use crate::pipeline::captions::{clean_captions, is_vtt};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// How raw input is read and interpreted.
#[derive(Debug, Clone)]
pub struct InputOptions {
    /// Clean the text as captions even without a caption extension.
    pub force_captions: bool,
    /// HTTP download timeout in seconds.
    pub download_timeout_secs: u64,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            force_captions: false,
            download_timeout_secs: 60,
        }
    }
}

/// Where the text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
    Url(String),
}

impl InputSource {
    /// Stem usable for default output names (`None` for stdin).
    pub fn stem(&self) -> Option<String> {
        match self {
            InputSource::Stdin => None,
            InputSource::File(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned()),
            InputSource::Url(url) => url_file_name(url).and_then(|name| {
                Path::new(&name)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            }),
        }
    }
}

/// Transcript text plus its origin.
#[derive(Debug, Clone)]
pub struct ResolvedText {
    pub source: InputSource,
    pub text: String,
    /// Whether caption cleanup was applied.
    pub cleaned_captions: bool,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

fn has_caption_extension(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".srt") || lower.ends_with(".vtt")
}

/// Read `input` and return its text, cleaning captions when appropriate.
///
/// `-` reads stdin, `http(s)://` downloads, anything else is a local path.
pub async fn resolve_text(input: &str, options: &InputOptions) -> Result<ResolvedText> {
    let (source, raw) = if input == "-" {
        (InputSource::Stdin, read_stdin().await?)
    } else if is_url(input) {
        let raw = download_text(input, options.download_timeout_secs).await?;
        (InputSource::Url(input.to_string()), raw)
    } else {
        let path = PathBuf::from(input);
        let raw = read_local(&path).await?;
        (InputSource::File(path), raw)
    };

    let caption_name = match &source {
        InputSource::File(path) => has_caption_extension(&path.to_string_lossy()),
        InputSource::Url(url) => url_file_name(url).is_some_and(|n| has_caption_extension(&n)),
        InputSource::Stdin => false,
    };
    let captions = options.force_captions || caption_name || is_vtt(&raw);
    let text = if captions { clean_captions(&raw) } else { raw };

    debug!(
        chars = text.chars().count(),
        captions, "Resolved input text"
    );
    Ok(ResolvedText {
        source,
        text,
        cleaned_captions: captions,
    })
}

async fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .map_err(|e| SummarizerError::InvalidInput {
            input: "-".into(),
            reason: format!("cannot read stdin: {e}"),
        })?;
    Ok(buf)
}

/// Read a local UTF-8 text file, mapping I/O failures to input errors.
async fn read_local(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(SummarizerError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    if path.is_dir() {
        return Err(SummarizerError::InvalidInput {
            input: path.display().to_string(),
            reason: "is a directory".into(),
        });
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(SummarizerError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(SummarizerError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    debug!("Read local transcript: {}", path.display());
    decode_utf8(bytes, &path.display().to_string())
}

fn decode_utf8(bytes: Vec<u8>, input: &str) -> Result<String> {
    let text = String::from_utf8(bytes).map_err(|e| SummarizerError::InvalidInput {
        input: input.to_string(),
        reason: format!("not valid UTF-8 text ({e})"),
    })?;
    Ok(text.strip_prefix('\u{FEFF}').map(str::to_string).unwrap_or(text))
}

/// Download a URL and return its body as text.
async fn download_text(url: &str, timeout_secs: u64) -> Result<String> {
    info!("Downloading transcript from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SummarizerError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_send = |e: reqwest::Error| {
        if e.is_timeout() {
            SummarizerError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            SummarizerError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_send)?;

    if !response.status().is_success() {
        return Err(SummarizerError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_send)?;
    info!("Downloaded {} bytes", bytes.len());
    decode_utf8(bytes.to_vec(), url)
}

/// Last path segment of a URL, if it looks like a file name.
fn url_file_name(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    (!last.is_empty() && last.contains('.')).then(|| last.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/lesson.txt"));
        assert!(is_url("http://example.com/lesson.srt"));
        assert!(!is_url("/tmp/lesson.txt"));
        assert!(!is_url("lesson.txt"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_url_file_name_and_stem() {
        assert_eq!(
            url_file_name("https://example.com/a/lecture-3.vtt?x=1"),
            Some("lecture-3.vtt".to_string())
        );
        assert_eq!(url_file_name("https://example.com/"), None);
        let src = InputSource::Url("https://example.com/a/lecture-3.vtt".into());
        assert_eq!(src.stem().as_deref(), Some("lecture-3"));
        assert_eq!(InputSource::Stdin.stem(), None);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = resolve_text("/definitely/not/here.txt", &InputOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizerError::InputNotFound { .. }));
    }

    #[tokio::test]
    async fn test_plain_file_is_returned_verbatim() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "\u{FEFF}1\nline two").unwrap();
        let resolved = resolve_text(file.path().to_str().unwrap(), &InputOptions::default())
            .await
            .unwrap();
        assert_eq!(resolved.text, "1\nline two");
        assert!(!resolved.cleaned_captions);
    }

    #[tokio::test]
    async fn test_srt_extension_triggers_cleanup() {
        let mut file = tempfile::Builder::new().suffix(".srt").tempfile().unwrap();
        write!(file, "1\n00:00:01,000 --> 00:00:02,000\nHello there\n").unwrap();
        let resolved = resolve_text(file.path().to_str().unwrap(), &InputOptions::default())
            .await
            .unwrap();
        assert_eq!(resolved.text, "Hello there");
        assert!(resolved.cleaned_captions);
    }

    #[tokio::test]
    async fn test_forced_captions() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "7\n00:01:00,000 --> 00:01:02,000\nForced &amp; clean").unwrap();
        let options = InputOptions {
            force_captions: true,
            ..Default::default()
        };
        let resolved = resolve_text(file.path().to_str().unwrap(), &options)
            .await
            .unwrap();
        assert_eq!(resolved.text, "Forced & clean");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0xfd]).unwrap();
        let err = resolve_text(file.path().to_str().unwrap(), &InputOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizerError::InvalidInput { .. }));
    }
}
