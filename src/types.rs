// types.rs — Core briefing types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Desired summary depth. Affects prompt phrasing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    Medium,
    Detailed,
}

impl SummaryLength {
    /// Instruction fragment spliced into the summary prompt
    pub fn instruction(&self) -> &'static str {
        match self {
            SummaryLength::Short => "2-3 concise sentences",
            SummaryLength::Medium => "one focused paragraph of 5-6 sentences",
            SummaryLength::Detailed => "3-4 paragraphs covering background, recent developments and outlook",
        }
    }
}

/// One generation call, built per topic by the orchestrator
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: String,
    pub length: SummaryLength,
    /// Selected model id, for providers that require one
    pub model: Option<String>,
}

/// Citation-style source link attached to a summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Per-topic briefing outcome. On error, summary/sources/tweets are
/// empty and `error` is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingResult {
    pub interest: String,
    pub summary: String,
    pub sources: Vec<Source>,
    pub tweets: Vec<String>,
    pub error: Option<String>,
}

impl BriefingResult {
    pub fn success(
        interest: String,
        summary: String,
        sources: Vec<Source>,
        tweets: Vec<String>,
    ) -> Self {
        Self {
            interest,
            summary,
            sources,
            tweets,
            error: None,
        }
    }

    pub fn failed(interest: String, error: String) -> Self {
        Self {
            interest,
            summary: String::new(),
            sources: Vec::new(),
            tweets: Vec::new(),
            error: Some(error),
        }
    }
}

/// Aggregated response for one orchestration call: successes and
/// failures side by side, never an exception
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingReport {
    pub briefings: Vec<BriefingResult>,
    /// Human-readable message per failed topic (or a single top-level one)
    pub errors: Vec<String>,
    /// Provider that served this report ("none" when no provider was usable)
    pub provider: String,
    pub generated_at: DateTime<Utc>,
}

impl BriefingReport {
    pub fn new(provider: String, briefings: Vec<BriefingResult>, errors: Vec<String>) -> Self {
        Self {
            briefings,
            errors,
            provider,
            generated_at: Utc::now(),
        }
    }

    /// Report for a call that aborted before any pipeline ran
    pub fn aborted(message: String) -> Self {
        Self {
            briefings: Vec::new(),
            errors: vec![message],
            provider: "none".to_string(),
            generated_at: Utc::now(),
        }
    }
}

/// Discovered trending topic, consumed as input for a briefing pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingTopic {
    pub title: String,
    #[serde(default)]
    pub description: String,
}
