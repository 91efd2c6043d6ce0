// search.rs — External web-search supplement (citation sources)

use crate::types::Source;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Search backend error: {0}")]
    Backend(String),
}

/// Seam for the external search endpoint. Backends without built-in
/// grounding use this to attach citation sources to a summary.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<Source>, SearchError>;
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

/// Client for a SearxNG-style JSON search endpoint
pub struct HttpSearchClient {
    client: Client,
    endpoint: String,
}

impl HttpSearchClient {
    pub fn new(endpoint: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self { client, endpoint }
    }
}

#[async_trait]
impl SearchProvider for HttpSearchClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Source>, SearchError> {
        let url = format!("{}/search", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(|e| SearchError::Network(format!("search: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Backend(format!("search {}: {}", status, body)));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Backend(format!("search parse: {}", e)))?;

        Ok(map_results(parsed, max_results))
    }
}

fn map_results(response: SearchResponse, max_results: usize) -> Vec<Source> {
    response
        .results
        .into_iter()
        .take(max_results)
        .map(|r| Source {
            title: r.title,
            url: r.url,
            snippet: r.content,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_results_preserves_order_and_caps() {
        let json = r#"{"results": [
            {"title": "First", "url": "https://a.example", "content": "a"},
            {"title": "Second", "url": "https://b.example", "content": "b"},
            {"title": "Third", "url": "https://c.example", "content": "c"},
            {"title": "Fourth", "url": "https://d.example", "content": "d"}
        ]}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let sources = map_results(response, 3);
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].title, "First");
        assert_eq!(sources[2].url, "https://c.example");
    }

    #[test]
    fn test_map_results_tolerates_missing_fields() {
        let json = r#"{"results": [{"url": "https://a.example"}]}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let sources = map_results(response, 5);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "");
        assert_eq!(sources[0].snippet, "");
    }
}
