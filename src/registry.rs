// registry.rs — Per-provider model state (soft cache)

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Model '{model}' is not in the listed set for provider '{provider}'")]
    ModelNotListed { provider: String, model: String },
}

/// Known models and current selection for one provider.
///
/// Soft cache: safe to lose and rebuild from the backend's listing
/// endpoint at any time.
#[derive(Debug, Clone, Default)]
pub struct ProviderState {
    pub models: Vec<String>,
    pub selected: Option<String>,
}

/// Explicitly owned model registry, injected into the orchestrator and
/// the engine facade. Writes happen on listing/selection calls from
/// outside the fan-out; generation pipelines only read a snapshot.
pub struct ModelRegistry {
    states: Mutex<HashMap<String, ProviderState>>,
}

impl ModelRegistry {
    pub fn new<I, S>(provider_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let states = provider_ids
            .into_iter()
            .map(|id| (id.into(), ProviderState::default()))
            .collect();

        Self {
            states: Mutex::new(states),
        }
    }

    /// Replace the cached model list. A selection that survives the
    /// refresh is kept; a stale one is cleared.
    pub fn store_models(&self, provider_id: &str, models: Vec<String>) {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let state = states.entry(provider_id.to_string()).or_default();

        if let Some(selected) = &state.selected {
            if !models.contains(selected) {
                tracing::info!(
                    "Registry: selection '{}' for '{}' dropped after refresh",
                    selected,
                    provider_id
                );
                state.selected = None;
            }
        }
        state.models = models;
    }

    pub fn models(&self, provider_id: &str) -> Vec<String> {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states
            .get(provider_id)
            .map(|s| s.models.clone())
            .unwrap_or_default()
    }

    /// Select a model for a provider. Fails (leaving the previous
    /// selection intact) when the id is unknown or not in the
    /// last-listed set.
    pub fn select_model(&self, provider_id: &str, model_id: &str) -> Result<(), RegistryError> {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let state = states
            .get_mut(provider_id)
            .ok_or_else(|| RegistryError::UnknownProvider(provider_id.to_string()))?;

        if !state.models.iter().any(|m| m == model_id) {
            return Err(RegistryError::ModelNotListed {
                provider: provider_id.to_string(),
                model: model_id.to_string(),
            });
        }

        tracing::info!("Registry: '{}' selected for '{}'", model_id, provider_id);
        state.selected = Some(model_id.to_string());
        Ok(())
    }

    pub fn selected_model(&self, provider_id: &str) -> Option<String> {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.get(provider_id).and_then(|s| s.selected.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_models() -> ModelRegistry {
        let registry = ModelRegistry::new(["groq"]);
        registry.store_models(
            "groq",
            vec!["llama-3.3-70b-versatile".to_string(), "llama-3.1-8b-instant".to_string()],
        );
        registry
    }

    #[test]
    fn test_select_then_get_returns_same_id() {
        let registry = registry_with_models();
        registry
            .select_model("groq", "llama-3.1-8b-instant")
            .unwrap();
        assert_eq!(
            registry.selected_model("groq").as_deref(),
            Some("llama-3.1-8b-instant")
        );
    }

    #[test]
    fn test_invalid_selection_errors_and_keeps_previous() {
        let registry = registry_with_models();
        registry
            .select_model("groq", "llama-3.3-70b-versatile")
            .unwrap();

        let err = registry.select_model("groq", "no-such-model").unwrap_err();
        assert!(matches!(err, RegistryError::ModelNotListed { .. }));
        assert_eq!(
            registry.selected_model("groq").as_deref(),
            Some("llama-3.3-70b-versatile")
        );
    }

    #[test]
    fn test_unknown_provider_errors() {
        let registry = registry_with_models();
        let err = registry.select_model("mystery", "anything").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownProvider(_)));
    }

    #[test]
    fn test_refresh_clears_stale_selection() {
        let registry = registry_with_models();
        registry
            .select_model("groq", "llama-3.1-8b-instant")
            .unwrap();

        registry.store_models("groq", vec!["llama-3.3-70b-versatile".to_string()]);
        assert_eq!(registry.selected_model("groq"), None);

        // A surviving selection is kept
        registry.store_models("groq", vec!["llama-3.3-70b-versatile".to_string()]);
        registry
            .select_model("groq", "llama-3.3-70b-versatile")
            .unwrap();
        registry.store_models(
            "groq",
            vec!["llama-3.3-70b-versatile".to_string(), "extra".to_string()],
        );
        assert_eq!(
            registry.selected_model("groq").as_deref(),
            Some("llama-3.3-70b-versatile")
        );
    }

    #[test]
    fn test_empty_registry_defaults() {
        let registry = ModelRegistry::new(["ollama"]);
        assert!(registry.models("ollama").is_empty());
        assert_eq!(registry.selected_model("ollama"), None);
    }
}
