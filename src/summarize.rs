//! Summarization entry points.
//!
//! The orchestrator is a map over chunks with no reduce step: each chunk is
//! sent to the completion collaborator once, with the caller's instructions
//! plus a part directive, and the cleaned answers are stitched together in
//! chunk order under `## Part i/total` headings. The first failed part aborts
//! the run, so callers never receive a document with holes in it.

use crate::config::SummaryConfig;
use crate::error::{Result, SummarizerError};
use crate::output::{run_id, safe_filename, write_atomic, PartResult, SummaryOutput, SummaryStats, WrittenFiles};
use crate::pipeline::chunk::{split_chunks, Chunk};
use crate::pipeline::llm::{CompletionProvider, CompletionRequest, LlmCompletion};
use crate::pipeline::postprocess::clean_markdown;
use crate::prompts::{build_instructions, part_heading, per_part_output};
use crate::render::markdown_to_pdf_bytes;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Separator placed between part sections.
pub const PART_SEPARATOR: &str = "\n\n---\n\n";

/// Summarize `text` with the provider described by `config`.
///
/// The provider is resolved from the config / environment (see
/// [`crate::pipeline::llm::resolve_provider`]). Use [`summarize_with`] to
/// supply your own [`CompletionProvider`].
pub async fn summarize(text: &str, config: &SummaryConfig) -> Result<SummaryOutput> {
    if text.trim().is_empty() {
        return Err(SummarizerError::EmptyInput);
    }
    let provider = LlmCompletion::from_config(config)?;
    summarize_with(text, config, &provider).await
}

/// Summarize `text` part by part through `provider`.
///
/// # Errors
/// * [`SummarizerError::EmptyInput`] when `text` is blank after trimming
/// * [`SummarizerError::InvalidArgument`] for bad chunking parameters
/// * [`SummarizerError::CompletionFailure`] for the first part that fails
pub async fn summarize_with(
    text: &str,
    config: &SummaryConfig,
    provider: &dyn CompletionProvider,
) -> Result<SummaryOutput> {
    let started = Instant::now();
    let text = text.trim();
    if text.is_empty() {
        return Err(SummarizerError::EmptyInput);
    }

    let chunks = split_chunks(text, config.chunk_size_chars, config.overlap_chars)?;
    let total = chunks.len();
    let total_chars = chunks.last().map(|c| c.end).unwrap_or(0);
    info!(
        "Summarizing {} chars in {} part(s) (chunk {} / overlap {}, concurrency {})",
        total_chars, total, config.chunk_size_chars, config.overlap_chars, config.concurrency
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_summary_start(total);
    }

    // `buffered` keeps results in chunk order; with concurrency 1 only one
    // call is ever in flight. Dropping the stream on the first error cancels
    // the parts still pending.
    let parts: Vec<PartResult> = stream::iter(chunks.iter().map(|chunk| summarize_part(provider, chunk, config)))
        .buffered(config.concurrency.max(1))
        .try_collect()
        .await?;

    let markdown = assemble_document(&parts);
    let stats = SummaryStats::from_parts(&parts, total_chars, started.elapsed().as_millis() as u64);

    info!(
        "Summary complete: {} part(s), {} tokens in / {} out, {}ms",
        stats.total_parts, stats.total_input_tokens, stats.total_output_tokens, stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_summary_complete(total);
    }

    Ok(SummaryOutput {
        markdown,
        parts,
        stats,
    })
}

/// Summarize and return only the Markdown document.
///
/// `role` and `output_format` are free-form texts; empty strings fall back to
/// the default role / output format.
///
/// # Example
///
/// ```rust,no_run
/// use lesson_summarizer::{summarize_long_text_to_markdown, LlmCompletion, SummaryConfig};
///
/// # async fn run(transcript: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let provider = LlmCompletion::from_config(&SummaryConfig::default())?;
/// let md = summarize_long_text_to_markdown(
///     transcript,
///     "en",
///     "Ethics",
///     "You are a philosophy professor.",
///     "Detailed notes with key concepts.",
///     &provider,
///     10_000,
///     500,
/// )
/// .await?;
/// println!("{md}");
/// # Ok(())
/// # }
/// ```
#[allow(clippy::too_many_arguments)]
pub async fn summarize_long_text_to_markdown(
    text: &str,
    language: &str,
    topic: &str,
    role: &str,
    output_format: &str,
    provider: &dyn CompletionProvider,
    chunk_size_chars: usize,
    overlap_chars: usize,
) -> Result<String> {
    let config = SummaryConfig {
        language: language.to_string(),
        topic: topic.to_string(),
        role_custom: Some(role.to_string()),
        output_custom: Some(output_format.to_string()),
        chunk_size_chars,
        overlap_chars,
        ..SummaryConfig::default()
    };
    Ok(summarize_with(text, &config, provider).await?.markdown)
}

/// One completion over the whole text, without part headings.
pub async fn summarize_text_to_markdown(
    text: &str,
    config: &SummaryConfig,
    provider: &dyn CompletionProvider,
) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SummarizerError::EmptyInput);
    }
    let instructions = build_instructions(
        &config.language,
        &config.topic,
        config.role_text(),
        config.output_text(),
    );
    let completion = provider
        .complete(&CompletionRequest::new(instructions, text))
        .await
        .map_err(|e| SummarizerError::CompletionFailure {
            part: 1,
            total: 1,
            detail: e.message,
        })?;
    Ok(clean_markdown(&completion.text))
}

/// Summarize `text`, render the PDF and write `<stem>.md` and `<stem>.pdf`
/// into `output_dir`.
///
/// Without an explicit `stem` the name is derived from the config title plus
/// a short run id. Both files are written atomically, and only after the PDF
/// rendered successfully.
pub async fn summarize_to_files(
    text: &str,
    config: &SummaryConfig,
    provider: &dyn CompletionProvider,
    output_dir: impl AsRef<Path>,
    stem: Option<&str>,
) -> Result<(SummaryOutput, WrittenFiles)> {
    let output = summarize_with(text, config, provider).await?;

    let markdown = output.markdown.clone();
    let title = config.title.clone();
    let pdf = tokio::task::spawn_blocking(move || markdown_to_pdf_bytes(&markdown, &title))
        .await
        .map_err(|e| SummarizerError::Internal(format!("PDF render task failed: {e}")))??;

    let stem = match stem {
        Some(s) => safe_filename(s),
        None => format!("{}_{}", safe_filename(&config.title), run_id()),
    };
    let dir = output_dir.as_ref();
    let files = WrittenFiles {
        markdown: dir.join(format!("{stem}.md")),
        pdf: dir.join(format!("{stem}.pdf")),
    };
    write_atomic(&files.markdown, output.markdown.as_bytes())?;
    write_atomic(&files.pdf, &pdf)?;
    info!(
        "Wrote {} and {}",
        files.markdown.display(),
        files.pdf.display()
    );

    Ok((output, files))
}

/// Synchronous wrapper around [`summarize`].
///
/// Creates a temporary tokio runtime internally.
pub fn summarize_sync(text: &str, config: &SummaryConfig) -> Result<SummaryOutput> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SummarizerError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(summarize(text, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn summarize_part(
    provider: &dyn CompletionProvider,
    chunk: &Chunk<'_>,
    config: &SummaryConfig,
) -> Result<PartResult> {
    let (part, total) = (chunk.part(), chunk.total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_part_start(part, total);
    }

    let output_format = per_part_output(config.output_text(), part, total);
    let instructions = build_instructions(
        &config.language,
        &config.topic,
        config.role_text(),
        &output_format,
    );
    let request = CompletionRequest::new(instructions, chunk.text);

    let started = Instant::now();
    let completion = match provider.complete(&request).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Part {}/{} failed: {}", part, total, e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_part_error(part, total, &e.message);
            }
            return Err(SummarizerError::CompletionFailure {
                part,
                total,
                detail: e.message,
            });
        }
    };
    let duration_ms = started.elapsed().as_millis() as u64;

    let markdown = clean_markdown(&completion.text);
    debug!(
        "Part {}/{}: {} input tokens, {} output tokens, {}ms",
        part, total, completion.input_tokens, completion.output_tokens, duration_ms
    );
    info!("Part {}/{} done ({} chars of Markdown)", part, total, markdown.len());
    if let Some(ref cb) = config.progress_callback {
        cb.on_part_complete(part, total, markdown.len());
    }

    Ok(PartResult {
        part,
        total,
        start_char: chunk.start,
        end_char: chunk.end,
        markdown,
        input_tokens: completion.input_tokens,
        output_tokens: completion.output_tokens,
        duration_ms,
    })
}

/// Join part sections in order.
fn assemble_document(parts: &[PartResult]) -> String {
    parts
        .iter()
        .map(|p| {
            format!("{}\n\n{}", part_heading(p.part, p.total), p.markdown)
                .trim()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join(PART_SEPARATOR)
        .trim()
        .to_string()
}
