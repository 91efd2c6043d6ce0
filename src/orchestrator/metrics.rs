// orchestrator/metrics.rs — Per-provider success/failure counters

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct Metrics {
    success_counts: Mutex<HashMap<String, u64>>,
    failure_counts: Mutex<HashMap<String, u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, provider_id: &str) {
        let mut counts = self.success_counts.lock().unwrap_or_else(|e| e.into_inner());
        *counts.entry(provider_id.to_string()).or_insert(0) += 1;
    }

    pub fn record_failure(&self, provider_id: &str) {
        let mut counts = self.failure_counts.lock().unwrap_or_else(|e| e.into_inner());
        *counts.entry(provider_id.to_string()).or_insert(0) += 1;
    }

    pub fn success_count(&self, provider_id: &str) -> u64 {
        let counts = self.success_counts.lock().unwrap_or_else(|e| e.into_inner());
        *counts.get(provider_id).unwrap_or(&0)
    }

    pub fn failure_count(&self, provider_id: &str) -> u64 {
        let counts = self.failure_counts.lock().unwrap_or_else(|e| e.into_inner());
        *counts.get(provider_id).unwrap_or(&0)
    }

    pub fn success_rate(&self, provider_id: &str) -> f32 {
        let success = self.success_count(provider_id) as f32;
        let total = success + self.failure_count(provider_id) as f32;

        if total == 0.0 {
            0.0
        } else {
            success / total
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let metrics = Metrics::new();
        metrics.record_success("groq");
        metrics.record_success("groq");
        metrics.record_failure("groq");

        assert_eq!(metrics.success_count("groq"), 2);
        assert_eq!(metrics.failure_count("groq"), 1);
        assert!((metrics.success_rate("groq") - 2.0 / 3.0).abs() < f32::EPSILON);
        assert_eq!(metrics.success_rate("unknown"), 0.0);
    }
}
