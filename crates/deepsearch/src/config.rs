//! Pipeline configuration
//!
//! Credentials and tuning knobs are collected into one explicit struct that is
//! passed to the pipeline at construction. Missing credentials surface here,
//! before any external call is made.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Primary and fallback environment variable names for the OpenAI key
pub const OPENAI_KEY_VARS: [&str; 2] = ["OPENAI_API", "OPENAI_API_KEY"];

/// Primary and fallback environment variable names for the Tavily key
pub const TAVILY_KEY_VARS: [&str; 2] = ["TAVILY_API", "TAVILY_API_KEY"];

/// Configuration for a [`DeepSearch`](crate::pipeline::DeepSearch) pipeline.
#[derive(Debug, Clone)]
pub struct DeepSearchConfig {
    /// OpenAI API key
    pub openai_api_key: String,

    /// Tavily API key
    pub tavily_api_key: String,

    /// Model used for needs-analysis and draft evaluation
    pub researcher_model: String,

    /// Sampling temperature for the researcher model
    pub researcher_temperature: f64,

    /// Model used for drafting and finalizing
    pub drafter_model: String,

    /// Sampling temperature for the drafter model
    pub drafter_temperature: f64,

    /// Results requested per search call
    pub max_search_results: u32,

    /// Result `content` is cut to this many characters on ingestion
    pub content_limit: usize,

    /// Characters of `content` used as the draft dedup fingerprint
    pub fingerprint_len: usize,

    /// Follow-up searches allowed before the loop is forced toward an answer
    pub max_follow_up_searches: usize,

    /// Hard limit on executed steps per run
    pub max_steps: usize,

    /// Optional wall-clock budget for a whole run
    pub run_timeout: Option<Duration>,
}

impl Default for DeepSearchConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            tavily_api_key: String::new(),
            researcher_model: "gpt-3.5-turbo".to_string(),
            researcher_temperature: 0.0,
            drafter_model: "gpt-3.5-turbo".to_string(),
            drafter_temperature: 0.2,
            max_search_results: 8,
            content_limit: 2000,
            fingerprint_len: 100,
            max_follow_up_searches: 10,
            max_steps: 100,
            run_timeout: None,
        }
    }
}

impl DeepSearchConfig {
    /// Create a configuration with explicit credentials and default settings
    pub fn new(openai_api_key: impl Into<String>, tavily_api_key: impl Into<String>) -> Self {
        Self {
            openai_api_key: openai_api_key.into(),
            tavily_api_key: tavily_api_key.into(),
            ..Default::default()
        }
    }

    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_set = |names: &[&'static str]| {
            names
                .iter()
                .find_map(|name| lookup(*name).filter(|v| !v.trim().is_empty()))
        };

        let openai_api_key = first_set(&OPENAI_KEY_VARS)
            .ok_or(ConfigError::MissingCredential(OPENAI_KEY_VARS[0]))?;
        let tavily_api_key = first_set(&TAVILY_KEY_VARS)
            .ok_or(ConfigError::MissingCredential(TAVILY_KEY_VARS[0]))?;

        let mut config = Self::new(openai_api_key, tavily_api_key);

        if let Some(val) = lookup("RESEARCHER_MODEL") {
            config.researcher_model = val;
        }
        if let Some(val) = lookup("DRAFTER_MODEL") {
            config.drafter_model = val;
        }
        if let Some(val) = lookup("MAX_SEARCH_RESULTS") {
            config.max_search_results = val.parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "MAX_SEARCH_RESULTS must be a positive integer, got: {val}"
                ))
            })?;
        }
        if let Some(val) = lookup("MAX_FOLLOW_UP_SEARCHES") {
            config.max_follow_up_searches = val.parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "MAX_FOLLOW_UP_SEARCHES must be a non-negative integer, got: {val}"
                ))
            })?;
        }

        Ok(config)
    }

    /// Use the same model for every generation call
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.researcher_model = model.clone();
        self.drafter_model = model;
        self
    }

    pub fn with_max_follow_up_searches(mut self, max: usize) -> Self {
        self.max_follow_up_searches = max;
        self
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    /// Check that every value is usable before the pipeline starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai_api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential(OPENAI_KEY_VARS[0]));
        }
        if self.tavily_api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential(TAVILY_KEY_VARS[0]));
        }
        for (name, temperature) in [
            ("researcher", self.researcher_temperature),
            ("drafter", self.drafter_temperature),
        ] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::Invalid(format!(
                    "{name} temperature must be between 0.0 and 2.0, got: {temperature}"
                )));
            }
        }
        if self.researcher_model.is_empty() || self.drafter_model.is_empty() {
            return Err(ConfigError::Invalid("model names cannot be empty".to_string()));
        }
        if self.max_search_results == 0 {
            return Err(ConfigError::Invalid(
                "MAX_SEARCH_RESULTS must be at least 1".to_string(),
            ));
        }
        if self.content_limit == 0 || self.fingerprint_len == 0 {
            return Err(ConfigError::Invalid(
                "content limit and fingerprint length must be at least 1".to_string(),
            ));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::Invalid("max_steps must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let config = DeepSearchConfig::new("sk-test", "tvly-test");

        assert_eq!(config.researcher_model, "gpt-3.5-turbo");
        assert_eq!(config.researcher_temperature, 0.0);
        assert!((config.drafter_temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.max_search_results, 8);
        assert_eq!(config.content_limit, 2000);
        assert_eq!(config.fingerprint_len, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lookup_prefers_primary_names() {
        let config = DeepSearchConfig::from_lookup(lookup_from(&[
            ("OPENAI_API", "primary"),
            ("OPENAI_API_KEY", "fallback"),
            ("TAVILY_API_KEY", "tvly"),
        ]))
        .unwrap();

        assert_eq!(config.openai_api_key, "primary");
        assert_eq!(config.tavily_api_key, "tvly");
    }

    #[test]
    fn test_missing_credentials_are_typed_errors() {
        let err = DeepSearchConfig::from_lookup(lookup_from(&[("TAVILY_API", "tvly")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential("OPENAI_API"));

        let err = DeepSearchConfig::from_lookup(lookup_from(&[("OPENAI_API", "sk")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential("TAVILY_API"));
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let err = DeepSearchConfig::from_lookup(lookup_from(&[
            ("OPENAI_API", "  "),
            ("TAVILY_API", "tvly"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential("OPENAI_API"));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = DeepSearchConfig::from_lookup(lookup_from(&[
            ("OPENAI_API", "sk"),
            ("TAVILY_API", "tvly"),
            ("DRAFTER_MODEL", "gpt-4.1"),
            ("MAX_SEARCH_RESULTS", "3"),
            ("MAX_FOLLOW_UP_SEARCHES", "0"),
        ]))
        .unwrap();

        assert_eq!(config.drafter_model, "gpt-4.1");
        assert_eq!(config.max_search_results, 3);
        assert_eq!(config.max_follow_up_searches, 0);
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let result = DeepSearchConfig::from_lookup(lookup_from(&[
            ("OPENAI_API", "sk"),
            ("TAVILY_API", "tvly"),
            ("MAX_SEARCH_RESULTS", "many"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = DeepSearchConfig::new("sk", "tvly");
        config.drafter_temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = DeepSearchConfig::new("sk", "tvly");
        config.max_search_results = 0;
        assert!(config.validate().is_err());

        let config = DeepSearchConfig::new("sk", "").with_model("gpt-4.1");
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingCredential("TAVILY_API"))
        );
    }
}
