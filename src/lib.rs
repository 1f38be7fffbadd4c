//! # lesson-summarizer
//!
//! Turn long lecture transcripts into structured study notes, as Markdown and
//! as a paginated PDF.
//!
//! Transcripts of an hour-long class easily exceed what a model answers well
//! in one call. This crate cuts the text into overlapping character windows,
//! asks the model for notes on each window separately, and stitches the
//! answers together in order under `## Part i/total` headings. The result is
//! then laid out as an A4 PDF using only the standard PDF fonts.
//!
//! ## Pipeline Overview
//!
//! ```text
//! transcript
//!  │
//!  ├─ 1. Input     file, URL or stdin; SRT/VTT captions cleaned to prose
//!  ├─ 2. Chunk     10 000-char windows overlapping by 500
//!  ├─ 3. LLM       one completion per window (gemini / openai / anthropic / …)
//!  ├─ 4. Polish    strip fences, CRLF, invisible characters
//!  ├─ 5. Assemble  "## Part i/total" sections joined by "---"
//!  └─ 6. Render    Markdown subset → A4 PDF
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lesson_summarizer::{summarize, markdown_to_pdf_bytes, SummaryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / …
//!     let config = SummaryConfig::builder()
//!         .language("en")
//!         .topic("Introduction to ethics")
//!         .role_preset("philosophy_expert")
//!         .build()?;
//!     let transcript = std::fs::read_to_string("lesson.txt")?;
//!     let output = summarize(&transcript, &config).await?;
//!     let pdf = markdown_to_pdf_bytes(&output.markdown, "Ethics")?;
//!     std::fs::write("ethics.pdf", pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `lessonsum` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! lesson-summarizer = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod render;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SummaryConfig, SummaryConfigBuilder};
pub use error::{CompletionError, SummarizerError};
pub use output::{safe_filename, PartResult, SummaryOutput, SummaryStats, WrittenFiles};
pub use pipeline::chunk::{chunk_text, split_chunks, Chunk};
pub use pipeline::input::{resolve_text, InputOptions, InputSource, ResolvedText};
pub use pipeline::llm::{Completion, CompletionProvider, CompletionRequest, LlmCompletion};
pub use pipeline::markdown::{Block, Document, Gap};
pub use progress::{NoopProgressCallback, ProgressCallback, SummaryProgressCallback};
pub use render::{markdown_to_pdf_bytes, markdown_to_pdf_file};
pub use summarize::{
    summarize, summarize_long_text_to_markdown, summarize_sync, summarize_text_to_markdown,
    summarize_to_files, summarize_with,
};
