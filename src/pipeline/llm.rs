//! Text-completion collaborator: the only stage with network I/O.
//!
//! The orchestrator talks to a [`CompletionProvider`], never to an SDK
//! directly, so tests can script responses and callers can put caching or
//! rate-limiting in front of the real provider. [`LlmCompletion`] is the
//! production implementation on top of `edgequake-llm`, which covers OpenAI,
//! Anthropic, Gemini, Ollama and any OpenAI-compatible endpoint.
//!
//! ## Message Layout
//!
//! 1. **System message** — the instruction block for this part
//! 2. **User message** — the chunk wrapped by [`crate::prompts::user_message`]
//!
//! No retries happen here. A per-call timeout is the only guard; anything
//! that goes wrong surfaces as an opaque [`CompletionError`].

use crate::config::SummaryConfig;
use crate::error::{CompletionError, SummarizerError};
use crate::prompts::user_message;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default model when the provider is auto-detected from a Gemini key.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// One completion call: instructions plus the text they apply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Instruction block (system message).
    pub instructions: String,
    /// Raw chunk text; wrapped into the user message by the provider.
    pub text: String,
}

impl CompletionRequest {
    pub fn new(instructions: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            text: text.into(),
        }
    }

    /// The user message sent alongside the instructions.
    pub fn user_prompt(&self) -> String {
        user_message(&self.text)
    }
}

/// Generated text plus token accounting (zero when the provider does not report it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl Completion {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Maps an instruction + text request to generated text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError>;
}

/// [`CompletionProvider`] backed by an `edgequake-llm` provider.
pub struct LlmCompletion {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
    timeout: Duration,
}

impl LlmCompletion {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &SummaryConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
            timeout: Duration::from_secs(config.api_timeout_secs),
        }
    }

    /// Resolve the provider described by `config` and wrap it.
    pub fn from_config(config: &SummaryConfig) -> Result<Self, SummarizerError> {
        Ok(Self::new(resolve_provider(config)?, config))
    }
}

impl std::fmt::Debug for LlmCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmCompletion")
            .field("provider", &"<dyn LLMProvider>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl CompletionProvider for LlmCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        let messages = vec![
            ChatMessage::system(request.instructions.as_str()),
            ChatMessage::user(request.user_prompt()),
        ];

        let call = self.provider.chat(&messages, Some(&self.options));
        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                CompletionError::new(format!(
                    "LLM call timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| CompletionError::new(e.to_string()))?;

        debug!(
            "Completion: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );

        Ok(Completion {
            text: response.content,
            input_tokens: response.prompt_tokens,
            output_tokens: response.completion_tokens,
        })
    }
}

/// Build `CompletionOptions` from the summary config.
fn build_options(config: &SummaryConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model`, or the
///    Gemini default model when none is set.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **Gemini key** (`GEMINI_API_KEY` or `GOOGLE_API_KEY`).
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_provider(config: &SummaryConfig) -> Result<Arc<dyn LLMProvider>, SummarizerError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    let gemini_key = ["GEMINI_API_KEY", "GOOGLE_API_KEY"]
        .iter()
        .any(|var| std::env::var(var).is_ok_and(|v| !v.is_empty()));
    if gemini_key {
        let model = config.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
        return create_provider("gemini", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| SummarizerError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY or ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Instantiate a named provider with the given model.
fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, SummarizerError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        SummarizerError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let config = SummaryConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.3));
        assert_eq!(opts.max_tokens, Some(8192));
    }

    #[test]
    fn request_user_prompt_wraps_text() {
        let req = CompletionRequest::new("be brief", "the lecture");
        assert!(req.user_prompt().contains("\"\"\"the lecture\"\"\""));
        assert_eq!(req.instructions, "be brief");
    }

    struct Echo;

    #[async_trait]
    impl CompletionProvider for Echo {
        async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
            Ok(Completion::from_text(request.text.to_uppercase()))
        }
    }

    #[test]
    fn trait_object_is_callable() {
        let provider: Arc<dyn CompletionProvider> = Arc::new(Echo);
        let out = tokio_test::block_on(provider.complete(&CompletionRequest::new("", "abc")))
            .expect("echo never fails");
        assert_eq!(out.text, "ABC");
        assert_eq!(out.input_tokens, 0);
    }
}
