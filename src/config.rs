// config.rs — Engine configuration from environment

use std::env;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Runtime configuration for the briefing engine.
///
/// Credentials decide which cloud adapters get constructed; the local
/// adapter is always constructed and probed lazily.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub gemini_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub ollama_url: String,
    /// SearxNG-style JSON search endpoint; absent means no citation supplement
    pub search_api_url: Option<String>,
    /// Upper bound on concurrently running topic pipelines
    pub max_concurrency: usize,
}

impl EngineConfig {
    /// Load from environment variables (reads a `.env` file if present)
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());

        // Groq keys always carry the gsk_ prefix; anything else is junk
        let groq_api_key = env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| k.starts_with("gsk_"));

        let ollama_url = env::var("OLLAMA_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let search_api_url = env::var("SEARCH_API_URL").ok().filter(|u| !u.is_empty());

        let max_concurrency = env::var("DAYBRIEF_MAX_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_CONCURRENCY);

        Self {
            gemini_api_key,
            groq_api_key,
            ollama_url,
            search_api_url,
            max_concurrency,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            groq_api_key: None,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            search_api_url: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}
