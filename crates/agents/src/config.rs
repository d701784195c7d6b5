use chrono::{Datelike, Utc};

use crate::openrouter::RetryPolicy;

pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

/// Settings shared by every role agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model used for every call
    pub model: String,
    /// Language code all generated text is written in
    pub language: String,
    /// Temperature for search-grounded research calls
    pub research_temperature: f32,
    /// Pins the year used for evidence recency; the wall clock otherwise
    pub current_year: Option<i32>,
    pub retry: RetryPolicy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            language: "en".to_string(),
            research_temperature: 0.1,
            current_year: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl AgentConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn current_year(&self) -> i32 {
        self.current_year.unwrap_or_else(|| Utc::now().year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.language, "en");
        assert_eq!(config.retry.max_retries, 10);
    }

    #[test]
    fn test_pinned_year() {
        let config = AgentConfig::default().with_current_year(2024);
        assert_eq!(config.current_year(), 2024);
    }
}
