// orchestrator/mod.rs — Concurrent briefing fan-out with per-topic isolation

pub mod metrics;

use crate::parser;
use crate::providers::{ProviderAdapter, ProviderError};
use crate::registry::ModelRegistry;
use crate::types::{BriefingReport, BriefingResult, GenerationRequest, SummaryLength};
use std::sync::Arc;
use tokio::sync::Semaphore;

use self::metrics::Metrics;

const MAX_TRENDING_TOPICS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("No AI providers are currently available")]
    NoProvidersAvailable,

    #[error("Trending discovery returned no topics")]
    NoTopics,
}

/// Stateless-per-call coordinator: resolves a usable provider, fans out
/// one pipeline per topic, and aggregates results in request order.
pub struct BriefingOrchestrator {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    registry: Arc<ModelRegistry>,
    metrics: Metrics,
    max_concurrency: usize,
}

impl BriefingOrchestrator {
    pub fn new(
        providers: Vec<Arc<dyn ProviderAdapter>>,
        registry: Arc<ModelRegistry>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            providers,
            registry,
            metrics: Metrics::new(),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Names of providers that are currently usable
    pub async fn available_providers(&self) -> Vec<String> {
        let mut names = Vec::new();
        for provider in &self.providers {
            if self.provider_usable(provider).await {
                names.push(provider.name().to_string());
            }
        }
        names
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub async fn generate_briefing(
        &self,
        topics: &[String],
        length: SummaryLength,
        provider_id: &str,
    ) -> Result<BriefingReport, OrchestratorError> {
        let provider = self
            .resolve_provider(provider_id)
            .await
            .ok_or(OrchestratorError::NoProvidersAvailable)?;

        Ok(self.fan_out(provider, topics.to_vec(), length).await)
    }

    /// Discovery flow: trending topics from the resolved provider feed
    /// a regular briefing pass
    pub async fn generate_trending_briefing(
        &self,
        length: SummaryLength,
        provider_id: &str,
    ) -> Result<BriefingReport, OrchestratorError> {
        let provider = self
            .resolve_provider(provider_id)
            .await
            .ok_or(OrchestratorError::NoProvidersAvailable)?;

        let topics: Vec<String> = match provider.list_trending_topics().await {
            Ok(trending) => trending
                .into_iter()
                .take(MAX_TRENDING_TOPICS)
                .map(|t| t.title)
                .filter(|t| !t.trim().is_empty())
                .collect(),
            Err(e) => {
                tracing::warn!(
                    "Orchestrator: trending discovery on '{}' failed: {}",
                    provider.name(),
                    e
                );
                Vec::new()
            }
        };

        if topics.is_empty() {
            return Err(OrchestratorError::NoTopics);
        }

        tracing::info!(
            "Orchestrator: trending discovery yielded {} topics via '{}'",
            topics.len(),
            provider.name()
        );

        Ok(self.fan_out(provider, topics, length).await)
    }

    /// Requested provider if usable, else the first usable one
    async fn resolve_provider(&self, requested: &str) -> Option<Arc<dyn ProviderAdapter>> {
        if let Some(provider) = self.providers.iter().find(|p| p.name() == requested) {
            if self.provider_usable(provider).await {
                return Some(provider.clone());
            }
        }

        for provider in &self.providers {
            if provider.name() == requested {
                continue;
            }
            if self.provider_usable(provider).await {
                tracing::info!(
                    "Orchestrator: provider '{}' not usable, substituting '{}'",
                    requested,
                    provider.name()
                );
                return Some(provider.clone());
            }
        }

        None
    }

    /// Cheap check plus, for model-requiring backends, a non-empty
    /// model list (fetched once and cached in the registry)
    async fn provider_usable(&self, provider: &Arc<dyn ProviderAdapter>) -> bool {
        if !provider.is_available() {
            return false;
        }
        if !provider.requires_model_selection() {
            return true;
        }

        let mut models = self.registry.models(provider.name());
        if models.is_empty() {
            models = provider.list_models().await;
            self.registry.store_models(provider.name(), models.clone());
        }
        !models.is_empty()
    }

    async fn fan_out(
        &self,
        provider: Arc<dyn ProviderAdapter>,
        topics: Vec<String>,
        length: SummaryLength,
    ) -> BriefingReport {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut handles = Vec::with_capacity(topics.len());

        for topic in &topics {
            let provider = provider.clone();
            let topic = topic.clone();
            let semaphore = semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                run_pipeline(provider, topic, length).await
            }));
        }

        // Completion order is arbitrary; request order is re-imposed here
        let mut briefings = Vec::with_capacity(topics.len());
        let mut errors = Vec::new();

        for (topic, handle) in topics.iter().zip(handles) {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Orchestrator: pipeline for '{}' panicked: {}", topic, e);
                    BriefingResult::failed(
                        topic.clone(),
                        "briefing pipeline failed unexpectedly".to_string(),
                    )
                }
            };

            match &result.error {
                Some(error) => {
                    self.metrics.record_failure(provider.name());
                    errors.push(format!("{}: {}", topic, error));
                }
                None => self.metrics.record_success(provider.name()),
            }
            briefings.push(result);
        }

        tracing::info!(
            "Orchestrator: briefing via '{}' done, {} ok / {} failed",
            provider.name(),
            briefings.len() - errors.len(),
            errors.len()
        );

        BriefingReport::new(provider.name().to_string(), briefings, errors)
    }
}

/// One topic's pipeline: summary, then social posts. A post-generation
/// failure is non-fatal and substitutes topic-derived placeholders.
async fn run_pipeline(
    provider: Arc<dyn ProviderAdapter>,
    topic: String,
    length: SummaryLength,
) -> BriefingResult {
    let request = GenerationRequest {
        topic: topic.clone(),
        length,
        model: None,
    };

    let (summary, sources) = match provider.generate_summary(&request).await {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!("Pipeline '{}': summary failed: {}", topic, e);
            return BriefingResult::failed(topic, e.to_string());
        }
    };

    if summary.trim().is_empty() {
        tracing::warn!("Pipeline '{}': summary came back empty", topic);
        return BriefingResult::failed(topic, ProviderError::EmptyResult.to_string());
    }

    let tweets = match provider.generate_social_posts(&summary).await {
        Ok(tweets) => tweets,
        Err(e) => {
            tracing::warn!(
                "Pipeline '{}': post generation failed ({}), substituting placeholders",
                topic,
                e
            );
            parser::placeholder_tweets_for(&topic)
        }
    };

    BriefingResult::success(topic, summary, sources, tweets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Source, TrendingTopic};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockAdapter {
        id: &'static str,
        available: bool,
        failing_topic: Option<&'static str>,
        empty_summary: bool,
        fail_posts: bool,
        fail_trending: bool,
        backend_calls: AtomicUsize,
    }

    impl MockAdapter {
        fn ok(id: &'static str) -> Self {
            Self {
                id,
                available: true,
                failing_topic: None,
                empty_summary: false,
                fail_posts: false,
                fail_trending: false,
                backend_calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.backend_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProviderAdapter for MockAdapter {
        async fn generate_summary(
            &self,
            request: &GenerationRequest,
        ) -> Result<(String, Vec<Source>), ProviderError> {
            self.backend_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_topic == Some(request.topic.as_str()) {
                return Err(ProviderError::Backend("simulated outage".to_string()));
            }
            if self.empty_summary {
                return Ok((String::new(), Vec::new()));
            }
            Ok((
                format!("Summary of {}", request.topic),
                vec![Source {
                    title: "Mock source".to_string(),
                    url: "https://example.test".to_string(),
                    snippet: String::new(),
                }],
            ))
        }

        async fn generate_social_posts(
            &self,
            _summary: &str,
        ) -> Result<Vec<String>, ProviderError> {
            self.backend_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_posts {
                return Err(ProviderError::Backend("posts down".to_string()));
            }
            Ok(vec!["A perfectly reasonable generated post.".to_string()])
        }

        async fn list_trending_topics(&self) -> Result<Vec<TrendingTopic>, ProviderError> {
            self.backend_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_trending {
                return Err(ProviderError::Backend("discovery down".to_string()));
            }
            Ok(vec![
                TrendingTopic {
                    title: "Fusion power".to_string(),
                    description: String::new(),
                },
                TrendingTopic {
                    title: "Chip exports".to_string(),
                    description: String::new(),
                },
                TrendingTopic {
                    title: "Ocean mining".to_string(),
                    description: String::new(),
                },
            ])
        }

        async fn list_models(&self) -> Vec<String> {
            vec!["mock-model".to_string()]
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn requires_model_selection(&self) -> bool {
            false
        }

        fn name(&self) -> &str {
            self.id
        }
    }

    fn orchestrator_with(adapters: Vec<Arc<dyn ProviderAdapter>>) -> BriefingOrchestrator {
        let registry = Arc::new(ModelRegistry::new(
            adapters.iter().map(|a| a.name().to_string()).collect::<Vec<_>>(),
        ));
        BriefingOrchestrator::new(adapters, registry, 4)
    }

    fn topics(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_n_topics_in_n_results_in_order() {
        let orchestrator = orchestrator_with(vec![Arc::new(MockAdapter::ok("mock"))]);
        let requested = topics(&["alpha", "beta", "gamma", "delta"]);

        let report = orchestrator
            .generate_briefing(&requested, SummaryLength::Short, "mock")
            .await
            .unwrap();

        assert_eq!(report.briefings.len(), 4);
        assert!(report.errors.is_empty());
        let interests: Vec<&str> = report.briefings.iter().map(|b| b.interest.as_str()).collect();
        assert_eq!(interests, vec!["alpha", "beta", "gamma", "delta"]);
        assert!(report.briefings.iter().all(|b| b.error.is_none()));
        assert_eq!(report.provider, "mock");
    }

    #[tokio::test]
    async fn test_single_failure_is_isolated() {
        let adapter = Arc::new(MockAdapter {
            failing_topic: Some("beta"),
            ..MockAdapter::ok("mock")
        });
        let orchestrator = orchestrator_with(vec![adapter]);

        let report = orchestrator
            .generate_briefing(&topics(&["alpha", "beta", "gamma"]), SummaryLength::Medium, "mock")
            .await
            .unwrap();

        assert_eq!(report.briefings.len(), 3);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("beta"));

        let failed = &report.briefings[1];
        assert_eq!(failed.interest, "beta");
        assert!(failed.summary.is_empty());
        assert!(failed.error.is_some());

        assert!(report.briefings[0].error.is_none());
        assert!(report.briefings[2].error.is_none());
    }

    #[tokio::test]
    async fn test_no_provider_available_aborts_without_calls() {
        let adapter = Arc::new(MockAdapter {
            available: false,
            ..MockAdapter::ok("mock")
        });
        let probe = adapter.clone();
        let orchestrator = orchestrator_with(vec![adapter]);

        let err = orchestrator
            .generate_briefing(&topics(&["alpha"]), SummaryLength::Short, "mock")
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::NoProvidersAvailable));
        assert_eq!(probe.calls(), 0, "no backend call may be attempted");
    }

    #[tokio::test]
    async fn test_unknown_provider_substituted_with_first_available() {
        let orchestrator = orchestrator_with(vec![Arc::new(MockAdapter::ok("mock"))]);

        let report = orchestrator
            .generate_briefing(&topics(&["alpha"]), SummaryLength::Short, "nonexistent")
            .await
            .unwrap();

        assert_eq!(report.provider, "mock");
        assert_eq!(report.briefings.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_summary_is_hard_failure() {
        let adapter = Arc::new(MockAdapter {
            empty_summary: true,
            ..MockAdapter::ok("mock")
        });
        let orchestrator = orchestrator_with(vec![adapter]);

        let report = orchestrator
            .generate_briefing(&topics(&["alpha"]), SummaryLength::Short, "mock")
            .await
            .unwrap();

        assert_eq!(report.errors.len(), 1);
        assert!(report.briefings[0].error.is_some());
        assert!(report.briefings[0].tweets.is_empty());
    }

    #[tokio::test]
    async fn test_post_failure_substitutes_placeholders() {
        let adapter = Arc::new(MockAdapter {
            fail_posts: true,
            ..MockAdapter::ok("mock")
        });
        let orchestrator = orchestrator_with(vec![adapter]);

        let report = orchestrator
            .generate_briefing(&topics(&["quantum computing"]), SummaryLength::Short, "mock")
            .await
            .unwrap();

        let briefing = &report.briefings[0];
        assert!(briefing.error.is_none(), "post failure must not fail the briefing");
        assert!(report.errors.is_empty());
        assert_eq!(briefing.tweets.len(), 3);
        assert!(briefing.tweets.iter().all(|t| t.contains("quantum computing")));
    }

    #[tokio::test]
    async fn test_failing_summary_end_to_end_shape() {
        let adapter = Arc::new(MockAdapter {
            failing_topic: Some("quantum computing"),
            ..MockAdapter::ok("mock")
        });
        let orchestrator = orchestrator_with(vec![adapter]);

        let report = orchestrator
            .generate_briefing(&topics(&["quantum computing"]), SummaryLength::Short, "mock")
            .await
            .unwrap();

        assert_eq!(report.briefings.len(), 1);
        let briefing = &report.briefings[0];
        assert_eq!(briefing.interest, "quantum computing");
        assert_eq!(briefing.summary, "");
        assert!(briefing.tweets.is_empty());
        assert!(briefing.error.is_some());
        assert_eq!(report.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_trending_discovery_produces_three_briefings() {
        let orchestrator = orchestrator_with(vec![Arc::new(MockAdapter::ok("mock"))]);

        let report = orchestrator
            .generate_trending_briefing(SummaryLength::Short, "mock")
            .await
            .unwrap();

        assert_eq!(report.briefings.len(), 3);
        assert_eq!(report.briefings[0].interest, "Fusion power");
    }

    #[tokio::test]
    async fn test_trending_discovery_failure_aborts() {
        let adapter = Arc::new(MockAdapter {
            fail_trending: true,
            ..MockAdapter::ok("mock")
        });
        let orchestrator = orchestrator_with(vec![adapter]);

        let err = orchestrator
            .generate_trending_briefing(SummaryLength::Short, "mock")
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::NoTopics));
    }

    #[tokio::test]
    async fn test_metrics_track_outcomes() {
        let adapter = Arc::new(MockAdapter {
            failing_topic: Some("beta"),
            ..MockAdapter::ok("mock")
        });
        let orchestrator = orchestrator_with(vec![adapter]);

        orchestrator
            .generate_briefing(&topics(&["alpha", "beta"]), SummaryLength::Short, "mock")
            .await
            .unwrap();

        assert_eq!(orchestrator.metrics().success_count("mock"), 1);
        assert_eq!(orchestrator.metrics().failure_count("mock"), 1);
    }

    #[tokio::test]
    async fn test_available_providers_skips_unavailable() {
        let down = Arc::new(MockAdapter {
            available: false,
            ..MockAdapter::ok("down")
        });
        let up = Arc::new(MockAdapter::ok("up"));
        let orchestrator = orchestrator_with(vec![down, up]);

        assert_eq!(orchestrator.available_providers().await, vec!["up"]);
    }
}
