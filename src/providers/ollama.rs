// providers/ollama.rs — Ollama adapter (locally hosted model server)

use super::{ProviderAdapter, ProviderError};
use crate::parser;
use crate::registry::ModelRegistry;
use crate::search::SearchProvider;
use crate::types::{GenerationRequest, Source, TrendingTopic};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const MAX_SOURCES: usize = 3;

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

/// Local model server adapter. Always "available" at this layer; real
/// unavailability shows up when the listing or a generation call fails
/// against the endpoint.
pub struct OllamaAdapter {
    client: Client,
    base_url: String,
    registry: Arc<ModelRegistry>,
    search: Option<Arc<dyn SearchProvider>>,
}

impl OllamaAdapter {
    pub fn new(
        base_url: String,
        registry: Arc<ModelRegistry>,
        search: Option<Arc<dyn SearchProvider>>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            registry,
            search,
        }
    }

    fn resolve_model(&self, explicit: Option<&str>) -> Result<String, ProviderError> {
        if let Some(model) = explicit {
            return Ok(model.to_string());
        }
        self.registry
            .selected_model(self.name())
            .ok_or_else(|| ProviderError::NoModelSelected(self.name().to_string()))
    }

    async fn call_model(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let request = OllamaRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: 0.4,
                num_predict: 2048,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Backend(format!(
                "Ollama {} ({}): {}",
                model, status, body
            )));
        }

        let ollama: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Backend(format!("Ollama parse: {}", e)))?;

        if ollama.response.trim().is_empty() {
            return Err(ProviderError::EmptyResult);
        }

        Ok(ollama.response)
    }

    async fn supplement_sources(&self, topic: &str) -> Vec<Source> {
        let Some(search) = &self.search else {
            return Vec::new();
        };
        match search.search(topic, MAX_SOURCES).await {
            Ok(sources) => sources,
            Err(e) => {
                tracing::warn!("Ollama: search supplement failed for '{}': {}", topic, e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ProviderAdapter for OllamaAdapter {
    async fn generate_summary(
        &self,
        request: &GenerationRequest,
    ) -> Result<(String, Vec<Source>), ProviderError> {
        let model = self.resolve_model(request.model.as_deref())?;
        let prompt = super::summary_prompt(&request.topic, request.length);

        let text = self.call_model(&model, &prompt).await?;
        let sources = self.supplement_sources(&request.topic).await;

        tracing::info!(
            "Ollama: summary for '{}' via {} ({} chars, {} sources)",
            request.topic,
            model,
            text.len(),
            sources.len()
        );

        Ok((text, sources))
    }

    async fn generate_social_posts(
        &self,
        summary: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let model = self.resolve_model(None)?;
        let text = self
            .call_model(&model, &super::social_posts_prompt(summary))
            .await?;
        Ok(parser::parse_tweets(&text))
    }

    async fn list_trending_topics(&self) -> Result<Vec<TrendingTopic>, ProviderError> {
        let model = self.resolve_model(None)?;
        let text = self.call_model(&model, &super::trending_prompt()).await?;
        Ok(parser::parse_trending(&text))
    }

    /// Empty on failure: no reachable Ollama means no local models, and
    /// the provider is treated as effectively unavailable upstream.
    async fn list_models(&self) -> Vec<String> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await;

        match response {
            Ok(r) if r.status().is_success() => r
                .json::<TagsResponse>()
                .await
                .map(|t| t.models.into_iter().map(|m| m.name).collect())
                .unwrap_or_default(),
            Ok(r) => {
                tracing::warn!("Ollama: tag listing returned {}", r.status());
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Ollama: unreachable at {}: {}", self.base_url, e);
                Vec::new()
            }
        }
    }

    fn is_available(&self) -> bool {
        // Liveness is probed at the model-listing step instead
        true
    }

    fn requires_model_selection(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
