//! Pipeline stages for transcript-to-study-document conversion.
//!
//! Each submodule implements exactly one transformation step, so every
//! stage can be tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ chunk ──▶ llm ──▶ postprocess ──▶ markdown ──▶ pdf
//! (path/URL) (windows) (per part) (cleanup)   (blocks)    (A4 pages)
//! ```
//!
//! 1. [`input`]  — read a path, URL or stdin; [`captions`] turns SRT/VTT
//!    files into running text
//! 2. [`chunk`]  — overlapping character windows over the transcript
//! 3. [`llm`]    — one completion per window; the only stage with network I/O
//! 4. [`postprocess`] — deterministic cleanup of each completion
//! 5. [`markdown`] + [`inline`] — classify lines into blocks and styled spans
//! 6. [`pdf`]    — lay blocks out on pages and write them with the standard
//!    [`fonts`]

pub mod captions;
pub mod chunk;
pub mod fonts;
pub mod inline;
pub mod input;
pub mod llm;
pub mod markdown;
pub mod pdf;
pub mod postprocess;
