//! CLI binary for lesson-summarizer.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SummaryConfig` and writes the results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use lesson_summarizer::{
    markdown_to_pdf_bytes, output::write_atomic, resolve_text, summarize_with, InputOptions,
    LlmCompletion, ProgressCallback, SummaryConfig, SummaryProgressCallback,
};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per part.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_summary_start` tells us how many parts there are.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Chunking transcript…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} parts  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Summarizing");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, part: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut t| t.remove(&part))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl SummaryProgressCallback for CliProgressCallback {
    fn on_summary_start(&self, total_parts: usize) {
        self.activate_bar(total_parts);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Summarizing {total_parts} part(s)…"))
        ));
    }

    fn on_part_start(&self, part: usize, _total: usize) {
        if let Ok(mut times) = self.start_times.lock() {
            times.insert(part, Instant::now());
        }
        self.bar.set_message(format!("part {part}"));
    }

    fn on_part_complete(&self, part: usize, total: usize, markdown_len: usize) {
        let secs = self.elapsed_secs(part);
        self.bar.println(format!(
            "  {} Part {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            part,
            total,
            dim(&format!("{markdown_len:>5} chars")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_part_error(&self, part: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(part);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Part {:>3}/{:<3}  {}  {}",
            red("✗"),
            part,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.abandon();
    }

    fn on_summary_complete(&self, total_parts: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} part(s) summarized",
            green("✔"),
            bold(&total_parts.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarize a transcript to Markdown on stdout
  lessonsum lesson.txt

  # Markdown + PDF, English, philosophy role
  lessonsum lesson.txt --language en --topic "Kant" --role philosophy-expert \
      -o kant.pdf --markdown-out kant.md

  # Caption file from a URL, review questions
  lessonsum https://example.com/class-3.vtt --format review-questions -o class3.pdf

  # Piped text, smaller parts, two calls in flight
  cat notes.txt | lessonsum - --chunk-size 6000 --overlap 300 --concurrency 2

  # Render existing Markdown to PDF (no LLM call)
  lessonsum --render-only notes.md -o notes.pdf

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (default provider, gemini-2.5-flash)
  GOOGLE_API_KEY          Alternative name for the Gemini key
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (gemini, openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Log filter (overrides -v / -q)
"#;

/// Summarize long lesson transcripts into study notes (Markdown + PDF).
#[derive(Parser, Debug)]
#[command(
    name = "lessonsum",
    version,
    about = "Summarize long lesson transcripts into structured study notes (Markdown + PDF)",
    long_about = "Split a long transcript into overlapping parts, summarize each part with an LLM \
and assemble the answers into one Markdown document, optionally rendered as an A4 PDF. \
Supports Google Gemini, OpenAI, Anthropic and any OpenAI-compatible endpoint.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Transcript file (.txt, .srt, .vtt), HTTP/HTTPS URL, or `-` for stdin.
    input: String,

    /// Write the rendered PDF to this file.
    #[arg(short, long, env = "LESSONSUM_OUTPUT")]
    output: Option<PathBuf>,

    /// Write the Markdown to this file instead of stdout.
    #[arg(long, env = "LESSONSUM_MARKDOWN_OUT")]
    markdown_out: Option<PathBuf>,

    /// Document title (PDF metadata). Defaults to the input file name.
    #[arg(long, env = "LESSONSUM_TITLE")]
    title: Option<String>,

    /// Output language (e.g. es, en).
    #[arg(short, long, env = "LESSONSUM_LANGUAGE", default_value = "es")]
    language: String,

    /// Topic or subject of the lesson.
    #[arg(short, long, env = "LESSONSUM_TOPIC", default_value = "Lesson")]
    topic: String,

    /// Role preset for the assistant.
    #[arg(long, env = "LESSONSUM_ROLE", value_enum)]
    role: Option<RoleArg>,

    /// Free-form role description (overrides --role).
    #[arg(long, env = "LESSONSUM_ROLE_CUSTOM")]
    role_custom: Option<String>,

    /// Output format preset.
    #[arg(long, env = "LESSONSUM_FORMAT", value_enum)]
    format: Option<FormatArg>,

    /// Free-form output format description (overrides --format).
    #[arg(long, env = "LESSONSUM_FORMAT_CUSTOM")]
    format_custom: Option<String>,

    /// LLM model ID (e.g. gemini-2.5-flash, gpt-4.1-mini).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Characters per part.
    #[arg(long, env = "LESSONSUM_CHUNK_SIZE", default_value_t = 10_000)]
    chunk_size: usize,

    /// Characters shared by consecutive parts.
    #[arg(long, env = "LESSONSUM_OVERLAP", default_value_t = 500)]
    overlap: usize,

    /// Completion calls in flight at once.
    #[arg(short, long, env = "LESSONSUM_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "LESSONSUM_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Max LLM output tokens per part.
    #[arg(long, env = "LESSONSUM_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// Per-part LLM call timeout in seconds.
    #[arg(long, env = "LESSONSUM_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "LESSONSUM_DOWNLOAD_TIMEOUT", default_value_t = 60)]
    download_timeout: u64,

    /// Treat the input as SRT/VTT captions regardless of its extension.
    #[arg(long, env = "LESSONSUM_CAPTIONS")]
    captions: bool,

    /// Input is already Markdown: only render it to PDF (requires -o).
    #[arg(long, requires = "output")]
    render_only: bool,

    /// Output structured JSON (SummaryOutput) instead of Markdown.
    #[arg(long, env = "LESSONSUM_JSON", conflicts_with = "markdown_out")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "LESSONSUM_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LESSONSUM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LESSONSUM_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum RoleArg {
    DataScientist,
    PhilosophyExpert,
    HistoryProfessor,
    DataEngineer,
    AiEngineer,
}

impl RoleArg {
    fn key(self) -> &'static str {
        match self {
            RoleArg::DataScientist => "data_scientist",
            RoleArg::PhilosophyExpert => "philosophy_expert",
            RoleArg::HistoryProfessor => "history_professor",
            RoleArg::DataEngineer => "data_engineer",
            RoleArg::AiEngineer => "ai_engineer",
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    DetailedNotes,
    Summary,
    ConceptList,
    ReviewQuestions,
}

impl FormatArg {
    fn key(self) -> &'static str {
        match self {
            FormatArg::DetailedNotes => "detailed_notes",
            FormatArg::Summary => "summary",
            FormatArg::ConceptList => "concept_list",
            FormatArg::ReviewQuestions => "review_questions",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar gives all the feedback that matters, so INFO logs are
    // muted while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.render_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Resolve input ────────────────────────────────────────────────────
    let options = InputOptions {
        force_captions: cli.captions,
        download_timeout_secs: cli.download_timeout,
    };
    let resolved = resolve_text(&cli.input, &options)
        .await
        .context("Failed to read input")?;
    let title = cli
        .title
        .clone()
        .or_else(|| resolved.source.stem())
        .unwrap_or_else(|| lesson_summarizer::config::DEFAULT_TITLE.to_string());

    // ── Render-only mode ─────────────────────────────────────────────────
    if cli.render_only {
        if let Some(ref pdf_path) = cli.output {
            write_pdf(&resolved.text, &title, pdf_path)?;
            if !cli.quiet {
                eprintln!("{}  →  {}", green("✔"), bold(&pdf_path.display().to_string()));
            }
        }
        return Ok(());
    }

    // ── Build config + provider ──────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn SummaryProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, &title, progress_cb)?;
    let provider = LlmCompletion::from_config(&config).context("LLM provider setup failed")?;

    // ── Run summary ──────────────────────────────────────────────────────
    let output = summarize_with(&resolved.text, &config, &provider)
        .await
        .context("Summarization failed")?;

    if let Some(ref md_path) = cli.markdown_out {
        write_atomic(md_path, output.markdown.as_bytes())
            .with_context(|| format!("Failed to write {}", md_path.display()))?;
    } else if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.markdown.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.markdown.ends_with('\n') {
            handle
                .write_all(b"\n")
                .context("Failed to write to stdout")?;
        }
    }

    if let Some(ref pdf_path) = cli.output {
        write_pdf(&output.markdown, &title, pdf_path)?;
    }

    if !cli.quiet && !cli.json {
        let written: Vec<String> = [cli.markdown_out.as_ref(), cli.output.as_ref()]
            .into_iter()
            .flatten()
            .map(|p| bold(&p.display().to_string()))
            .collect();
        eprintln!(
            "{}  {} part(s)  {}ms{}",
            green("✔"),
            output.stats.total_parts,
            output.stats.total_duration_ms,
            if written.is_empty() {
                String::new()
            } else {
                format!("  →  {}", written.join(", "))
            },
        );
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&output.stats.total_input_tokens.to_string()),
            dim(&output.stats.total_output_tokens.to_string()),
        );
    }

    Ok(())
}

fn write_pdf(markdown: &str, title: &str, path: &Path) -> Result<()> {
    let pdf = markdown_to_pdf_bytes(markdown, title).context("PDF rendering failed")?;
    write_atomic(path, &pdf).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Map CLI args to `SummaryConfig`.
fn build_config(cli: &Cli, title: &str, progress: Option<ProgressCallback>) -> Result<SummaryConfig> {
    let mut builder = SummaryConfig::builder()
        .language(&cli.language)
        .topic(&cli.topic)
        .title(title)
        .chunk_size(cli.chunk_size)
        .overlap(cli.overlap)
        .concurrency(cli.concurrency)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(role) = cli.role {
        builder = builder.role_preset(role.key());
    }
    if let Some(ref role) = cli.role_custom {
        builder = builder.role_custom(role);
    }
    if let Some(format) = cli.format {
        builder = builder.output_preset(format.key());
    }
    if let Some(ref format) = cli.format_custom {
        builder = builder.output_custom(format);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_json_conflicts_with_markdown_out() {
        let err = Cli::try_parse_from(["lessonsum", "in.txt", "--json", "--markdown-out", "n.md"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_render_only_requires_output() {
        assert!(Cli::try_parse_from(["lessonsum", "notes.md", "--render-only"]).is_err());
        assert!(Cli::try_parse_from(["lessonsum", "notes.md", "--render-only", "-o", "n.pdf"]).is_ok());
    }
}
