// providers/mod.rs — Provider adapter trait + env-driven construction

mod gemini;
mod groq;
mod ollama;

pub use gemini::GeminiAdapter;
pub use groq::GroqAdapter;
pub use ollama::OllamaAdapter;

use crate::config::EngineConfig;
use crate::registry::ModelRegistry;
use crate::search::SearchProvider;
use crate::types::{GenerationRequest, Source, SummaryLength, TrendingTopic};
use async_trait::async_trait;
use std::sync::Arc;

/// Adapter errors, uniform across backends
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("No model selected for provider '{0}'")]
    NoModelSelected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Backend returned no usable text")]
    EmptyResult,

    #[error("Invalid response from backend")]
    InvalidResponse,
}

/// Uniform contract over the three heterogeneous AI backends
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Generate a topic summary plus zero or more citation sources
    async fn generate_summary(
        &self,
        request: &GenerationRequest,
    ) -> Result<(String, Vec<Source>), ProviderError>;

    /// Generate up to 3 social posts from a summary. Guaranteed
    /// non-empty: unusable backend output is replaced by placeholders.
    async fn generate_social_posts(&self, summary: &str)
        -> Result<Vec<String>, ProviderError>;

    /// Discover 1-3 trending topics
    async fn list_trending_topics(&self) -> Result<Vec<TrendingTopic>, ProviderError>;

    /// Models this provider can serve. Per-backend policy on listing
    /// failure: fixed fallback set (Groq), empty (Ollama), the single
    /// configured id (Gemini).
    async fn list_models(&self) -> Vec<String>;

    /// Minimal round trip against the backend, for connection testing.
    /// Default: an attempted model listing, which reaches the backend
    /// for listable providers. Backends whose listing never touches
    /// the network override this with a cheap generation call.
    async fn check_connection(&self) -> Result<(), ProviderError> {
        if self.list_models().await.is_empty() {
            return Err(ProviderError::Backend(format!(
                "'{}' listed no models",
                self.name()
            )));
        }
        Ok(())
    }

    /// Cheap credential/config check; deep failures surface lazily
    fn is_available(&self) -> bool;

    /// Whether generation needs an explicitly selected model
    fn requires_model_selection(&self) -> bool;

    /// Stable identifier for logging and the UI
    fn name(&self) -> &str;
}

/// Build the adapter set from configuration. Cloud adapters are only
/// constructed when credentials are present; Ollama is always
/// constructed and probed lazily via its model listing.
pub fn adapters_from_config(
    config: &EngineConfig,
    registry: Arc<ModelRegistry>,
    search: Option<Arc<dyn SearchProvider>>,
) -> Vec<Arc<dyn ProviderAdapter>> {
    let mut adapters: Vec<Arc<dyn ProviderAdapter>> = Vec::new();

    if let Some(key) = config.gemini_api_key.clone() {
        adapters.push(Arc::new(GeminiAdapter::new(key)));
        tracing::info!("Providers: Gemini adapter loaded (search-grounded)");
    }

    if let Some(key) = config.groq_api_key.clone() {
        adapters.push(Arc::new(GroqAdapter::new(key, registry.clone(), search.clone())));
        tracing::info!("Providers: Groq adapter loaded");
    }

    adapters.push(Arc::new(OllamaAdapter::new(
        config.ollama_url.clone(),
        registry,
        search,
    )));
    tracing::info!("Providers: Ollama adapter loaded (local)");

    tracing::info!("Providers: {} adapters constructed", adapters.len());

    adapters
}

// --- Shared prompt builders ---

pub(crate) fn summary_prompt(topic: &str, length: SummaryLength) -> String {
    format!(
        "You are a news briefing assistant. Write a summary of the latest \
         developments about \"{}\" in {}. Stick to factual, recent \
         information and plain prose without headings.",
        topic,
        length.instruction()
    )
}

pub(crate) fn social_posts_prompt(summary: &str) -> String {
    format!(
        "Based on the briefing below, write 3 engaging social media posts, \
         one per line, each under 280 characters, no hashtag spam, no \
         numbering.\n\nBriefing:\n{}",
        summary
    )
}

pub(crate) fn trending_prompt() -> String {
    "List the 3 most significant topics trending in world news right now. \
     Respond with a JSON array of objects with \"title\" and \"description\" \
     fields and nothing else."
        .to_string()
}
