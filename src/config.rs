//! Configuration types for transcript summarization.
//!
//! All pipeline behaviour is controlled through [`SummaryConfig`], built via
//! its [`SummaryConfigBuilder`]. Callers pass the config explicitly on every
//! invocation; the library keeps no settings of its own between runs.

use crate::error::SummarizerError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Default overlap between consecutive windows in characters.
pub const DEFAULT_OVERLAP: usize = 500;

/// Default document title.
pub const DEFAULT_TITLE: &str = "Summary";

/// Configuration for one summarization run.
///
/// # Example
/// ```rust
/// use lesson_summarizer::SummaryConfig;
///
/// let config = SummaryConfig::builder()
///     .language("en")
///     .topic("Moral philosophy")
///     .role_preset("philosophy_expert")
///     .output_preset("summary")
///     .chunk_size(8_000)
///     .overlap(400)
///     .build()
///     .unwrap();
/// assert_eq!(config.chunk_size_chars, 8_000);
/// ```
#[derive(Clone)]
pub struct SummaryConfig {
    /// Output language passed to the prompt (e.g. "es", "en"). Default: "es".
    pub language: String,

    /// Subject or course the transcript belongs to. Default: "Lesson".
    pub topic: String,

    /// Role preset key (see [`crate::prompts::ROLE_PRESETS`]).
    pub role_key: Option<String>,

    /// Free-text role; overrides `role_key` when non-blank.
    pub role_custom: Option<String>,

    /// Output-format preset key (see [`crate::prompts::OUTPUT_PRESETS`]).
    pub output_key: Option<String>,

    /// Free-text output format; overrides `output_key` when non-blank.
    pub output_custom: Option<String>,

    /// LLM model identifier. If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Window size in characters. Default: 10 000.
    ///
    /// One window is one completion call. Large windows mean fewer parts but
    /// each part must fit the model's output budget once summarised.
    pub chunk_size_chars: usize,

    /// Characters repeated from the previous window. Default: 500.
    ///
    /// Keeps sentences cut at a window edge readable in the next part.
    pub overlap_chars: usize,

    /// Completion calls in flight at once. Default: 1 (strictly sequential).
    ///
    /// Values above 1 dispatch parts concurrently; results are still
    /// reassembled in part order and the first failure aborts the run.
    pub concurrency: usize,

    /// Sampling temperature. Default: 0.3.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per part. Default: 8192.
    pub max_tokens: usize,

    /// Per-completion timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 60.
    pub download_timeout_secs: u64,

    /// Title written into the PDF metadata and used for file names.
    pub title: String,

    /// Optional per-part progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            language: "es".to_string(),
            topic: "Lesson".to_string(),
            role_key: None,
            role_custom: None,
            output_key: None,
            output_custom: None,
            model: None,
            provider_name: None,
            provider: None,
            chunk_size_chars: DEFAULT_CHUNK_SIZE,
            overlap_chars: DEFAULT_OVERLAP,
            concurrency: 1,
            temperature: 0.3,
            max_tokens: 8192,
            api_timeout_secs: 120,
            download_timeout_secs: 60,
            title: DEFAULT_TITLE.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("language", &self.language)
            .field("topic", &self.topic)
            .field("role_key", &self.role_key)
            .field("output_key", &self.output_key)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("chunk_size_chars", &self.chunk_size_chars)
            .field("overlap_chars", &self.overlap_chars)
            .field("concurrency", &self.concurrency)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("title", &self.title)
            .finish()
    }
}

impl SummaryConfig {
    /// Create a new builder for `SummaryConfig`.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolved role text for the prompt.
    pub fn role_text(&self) -> &str {
        crate::prompts::role_text(self.role_custom.as_deref(), self.role_key.as_deref())
    }

    /// Resolved output-format text for the prompt.
    pub fn output_text(&self) -> &str {
        crate::prompts::output_text(self.output_custom.as_deref(), self.output_key.as_deref())
    }
}

/// Builder for [`SummaryConfig`].
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl fmt::Debug for SummaryConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl SummaryConfigBuilder {
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.config.topic = topic.into();
        self
    }

    pub fn role_preset(mut self, key: impl Into<String>) -> Self {
        self.config.role_key = Some(key.into());
        self
    }

    pub fn role_custom(mut self, role: impl Into<String>) -> Self {
        self.config.role_custom = Some(role.into());
        self
    }

    pub fn output_preset(mut self, key: impl Into<String>) -> Self {
        self.config.output_key = Some(key.into());
        self
    }

    pub fn output_custom(mut self, output: impl Into<String>) -> Self {
        self.config.output_custom = Some(output.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn chunk_size(mut self, chars: usize) -> Self {
        self.config.chunk_size_chars = chars;
        self
    }

    pub fn overlap(mut self, chars: usize) -> Self {
        self.config.overlap_chars = chars;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummaryConfig, SummarizerError> {
        let c = &self.config;
        if c.chunk_size_chars == 0 {
            return Err(SummarizerError::InvalidConfig(
                "chunk size must be ≥ 1 character".into(),
            ));
        }
        if c.overlap_chars >= c.chunk_size_chars {
            return Err(SummarizerError::InvalidConfig(format!(
                "overlap ({}) must be smaller than chunk size ({})",
                c.overlap_chars, c.chunk_size_chars
            )));
        }
        if c.max_tokens == 0 {
            return Err(SummarizerError::InvalidConfig(
                "max tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
