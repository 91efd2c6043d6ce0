//! daybrief — interest briefing engine.
//!
//! Dispatches topic summaries, citation sources and social posts across
//! pluggable AI backends (Gemini with search grounding, Groq, local
//! Ollama), with per-topic failure isolation and graceful fallbacks.

mod config;
mod orchestrator;
mod parser;
mod providers;
mod registry;
mod search;
mod types;

pub use config::EngineConfig;
pub use orchestrator::metrics::Metrics;
pub use orchestrator::{BriefingOrchestrator, OrchestratorError};
pub use providers::{
    GeminiAdapter, GroqAdapter, OllamaAdapter, ProviderAdapter, ProviderError,
};
pub use registry::{ModelRegistry, ProviderState, RegistryError};
pub use search::{HttpSearchClient, SearchError, SearchProvider};
pub use types::{
    BriefingReport, BriefingResult, GenerationRequest, Source, SummaryLength, TrendingTopic,
};

use std::sync::Arc;

/// All provider ids the registry tracks, constructed or not
const PROVIDER_IDS: [&str; 3] = ["gemini", "groq", "ollama"];

/// Facade over the adapter set, model registry and orchestrator. This
/// is the surface the page layer talks to.
pub struct BriefingEngine {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    registry: Arc<ModelRegistry>,
    orchestrator: BriefingOrchestrator,
}

impl BriefingEngine {
    /// Build from environment variables (reads `.env` if present)
    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    pub fn new(config: EngineConfig) -> Self {
        let search: Option<Arc<dyn SearchProvider>> = config
            .search_api_url
            .clone()
            .map(|url| Arc::new(HttpSearchClient::new(url)) as Arc<dyn SearchProvider>);

        let registry = Arc::new(ModelRegistry::new(PROVIDER_IDS));
        let providers = providers::adapters_from_config(&config, registry.clone(), search);

        tracing::info!(
            "BriefingEngine initialized: {} adapters, concurrency={}",
            providers.len(),
            config.max_concurrency
        );

        Self::with_providers(providers, registry, config.max_concurrency)
    }

    /// Wire an explicit adapter set, for embedders bringing their own
    /// backends
    pub fn with_providers(
        providers: Vec<Arc<dyn ProviderAdapter>>,
        registry: Arc<ModelRegistry>,
        max_concurrency: usize,
    ) -> Self {
        let orchestrator =
            BriefingOrchestrator::new(providers.clone(), registry.clone(), max_concurrency);

        Self {
            providers,
            registry,
            orchestrator,
        }
    }

    /// Names of providers currently usable for generation
    pub async fn list_providers(&self) -> Vec<String> {
        self.orchestrator.available_providers().await
    }

    /// Run one briefing pass. Always returns a report: a top-level
    /// abort becomes an empty result list with a single error message.
    pub async fn generate_briefing(
        &self,
        topics: &[String],
        length: SummaryLength,
        provider_id: &str,
    ) -> BriefingReport {
        match self
            .orchestrator
            .generate_briefing(topics, length, provider_id)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Briefing aborted: {}", e);
                BriefingReport::aborted(e.to_string())
            }
        }
    }

    /// Discover trending topics on the resolved provider and brief them
    pub async fn generate_trending_briefing(
        &self,
        length: SummaryLength,
        provider_id: &str,
    ) -> BriefingReport {
        match self
            .orchestrator
            .generate_trending_briefing(length, provider_id)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Trending briefing aborted: {}", e);
                BriefingReport::aborted(e.to_string())
            }
        }
    }

    /// Credential check plus a minimal round trip against the backend
    /// (an attempted model listing, or a tiny generation call for
    /// backends with a fixed model id)
    pub async fn test_provider_connection(
        &self,
        provider_id: &str,
    ) -> Result<(), ProviderError> {
        let provider = self.find_provider(provider_id).ok_or_else(|| {
            ProviderError::Unavailable(format!("unknown provider '{}'", provider_id))
        })?;

        if !provider.is_available() {
            return Err(ProviderError::Unavailable(provider.name().to_string()));
        }

        provider.check_connection().await
    }

    /// Refresh and return the provider's model list
    pub async fn list_models(&self, provider_id: &str) -> Result<Vec<String>, RegistryError> {
        let provider = self
            .find_provider(provider_id)
            .ok_or_else(|| RegistryError::UnknownProvider(provider_id.to_string()))?;

        let models = provider.list_models().await;
        self.registry.store_models(provider.name(), models.clone());
        Ok(models)
    }

    pub fn select_model(&self, provider_id: &str, model_id: &str) -> Result<(), RegistryError> {
        self.registry.select_model(provider_id, model_id)
    }

    pub fn get_selected_model(&self, provider_id: &str) -> Option<String> {
        self.registry.selected_model(provider_id)
    }

    fn find_provider(&self, provider_id: &str) -> Option<Arc<dyn ProviderAdapter>> {
        self.providers
            .iter()
            .find(|p| p.name() == provider_id)
            .cloned()
    }
}
