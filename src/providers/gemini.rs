// providers/gemini.rs — Google Gemini adapter (search-grounded cloud)

use super::{ProviderAdapter, ProviderError};
use crate::parser;
use crate::types::{GenerationRequest, Source, TrendingTopic};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MODEL: &str = "gemini-2.5-flash";

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
    #[serde(rename = "groundingMetadata")]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GroundingMetadata {
    #[serde(rename = "groundingChunks", default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Deserialize)]
struct WebChunk {
    uri: String,
    #[serde(default)]
    title: String,
}

/// Search-grounded cloud adapter. Single fixed model; citation sources
/// come back with the answer via grounding metadata, so no external
/// search supplement is needed.
pub struct GeminiAdapter {
    client: Client,
    api_key: String,
}

impl GeminiAdapter {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();

        Self { client, api_key }
    }

    async fn call(&self, prompt: &str, grounded: bool) -> Result<GeminiResponse, ProviderError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            MODEL, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            tools: grounded.then(|| {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            }),
            generation_config: GenerationConfig {
                temperature: 0.4,
                max_output_tokens: 2048,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Gemini: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Backend(format!("Gemini {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Backend(format!("Gemini parse: {}", e)))
    }
}

fn extract_text(response: &GeminiResponse) -> Result<String, ProviderError> {
    let candidate = response
        .candidates
        .first()
        .ok_or(ProviderError::InvalidResponse)?;

    let text = candidate
        .content
        .parts
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(ProviderError::EmptyResult);
    }
    Ok(text)
}

fn extract_sources(response: &GeminiResponse) -> Vec<Source> {
    response
        .candidates
        .first()
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|g| {
            g.grounding_chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref())
                .map(|web| Source {
                    title: web.title.clone(),
                    url: web.uri.clone(),
                    snippet: String::new(),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    async fn generate_summary(
        &self,
        request: &GenerationRequest,
    ) -> Result<(String, Vec<Source>), ProviderError> {
        let prompt = super::summary_prompt(&request.topic, request.length);
        let response = self.call(&prompt, true).await?;

        let text = extract_text(&response)?;
        let sources = extract_sources(&response);

        tracing::info!(
            "Gemini: summary for '{}' ({} chars, {} sources)",
            request.topic,
            text.len(),
            sources.len()
        );

        Ok((text, sources))
    }

    async fn generate_social_posts(
        &self,
        summary: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let prompt = super::social_posts_prompt(summary);
        let response = self.call(&prompt, false).await?;
        let text = extract_text(&response).unwrap_or_default();
        Ok(parser::parse_tweets(&text))
    }

    async fn list_trending_topics(&self) -> Result<Vec<TrendingTopic>, ProviderError> {
        let response = self.call(&super::trending_prompt(), true).await?;
        let text = extract_text(&response).unwrap_or_default();
        Ok(parser::parse_trending(&text))
    }

    async fn list_models(&self) -> Vec<String> {
        // No enumeration endpoint in use; the model id is fixed
        vec![MODEL.to_string()]
    }

    /// The fixed listing never touches the network, so connection
    /// testing issues a minimal ungrounded generation instead
    async fn check_connection(&self) -> Result<(), ProviderError> {
        self.call("Reply with the single word OK.", false)
            .await
            .map(|_| ())
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn requires_model_selection(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
