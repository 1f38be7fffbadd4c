//! Error types for the lesson-summarizer library.
//!
//! Two error types reflect two different owners:
//!
//! * [`SummarizerError`] — everything the library itself can fail on (bad
//!   chunking parameters, blank input, unreadable transcript, PDF writing).
//!   Every variant is fatal for the current invocation: no partial Markdown
//!   and no partial PDF is ever returned alongside it.
//!
//! * [`CompletionError`] — the opaque failure of a text-completion
//!   collaborator (transport, quota, auth, timeout). The orchestrator does not
//!   distinguish subtypes; it wraps the message into
//!   [`SummarizerError::CompletionFailure`] together with the part that failed.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the lesson-summarizer library.
#[derive(Debug, Error)]
pub enum SummarizerError {
    // ── Argument errors ───────────────────────────────────────────────────
    /// Chunking parameters are out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The transcript is blank after trimming.
    #[error("Input text is empty.\nPaste a transcript or point to a non-empty file.")]
    EmptyInput,

    // ── Input errors ──────────────────────────────────────────────────────
    /// Transcript file was not found at the given path.
    #[error("Transcript file not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input is neither a readable file, a URL nor `-`.
    #[error("Invalid input '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The completion collaborator failed on one part; the run is aborted.
    #[error("Summarization failed on part {part}/{total}: {detail}")]
    CompletionFailure {
        part: usize,
        total: usize,
        detail: String,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The PDF document could not be assembled or serialised.
    #[error("PDF rendering failed: {0}")]
    RenderFailed(String),

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Opaque failure reported by a [`crate::pipeline::llm::CompletionProvider`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CompletionError {
    pub message: String,
}

impl CompletionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = SummarizerError> = std::result::Result<T, E>;
