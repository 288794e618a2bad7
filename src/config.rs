use log::warn;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::model::retry::RetryPolicy;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1";

/// Settings for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub robot_name: String,
    /// `None` when no API key is configured: the service answers from rules only.
    pub gemini: Option<GeminiConfig>,
    pub provider_timeout: Duration,
    pub retry: RetryPolicy,
    pub min_reply_chars: usize,
    pub strict_validation: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini = lookup("GEMINI_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(|api_key| GeminiConfig {
                api_key,
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| "gemini-pro".to_string()),
                api_base: lookup("GEMINI_API_BASE")
                    .map(|base| base.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                max_output_tokens: parse_or(&lookup, "MAX_OUTPUT_TOKENS", 150),
                temperature: parse_or(&lookup, "TEMPERATURE", 0.7),
            });

        let retry = RetryPolicy {
            max_attempts: parse_or(&lookup, "PROVIDER_MAX_ATTEMPTS", 3u32).max(1),
            base_delay: Duration::from_millis(parse_or(&lookup, "RETRY_BASE_DELAY_MS", 1000)),
            max_delay: Duration::from_millis(parse_or(&lookup, "RETRY_MAX_DELAY_MS", 3000)),
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 3000),
            robot_name: lookup("ROBOT_NAME").unwrap_or_else(|| "Robocik".to_string()),
            gemini,
            provider_timeout: Duration::from_secs(parse_or(&lookup, "PROVIDER_TIMEOUT_SECS", 15)),
            retry,
            min_reply_chars: parse_or(&lookup, "MIN_REPLY_CHARS", 5),
            strict_validation: parse_or(&lookup, "STRICT_VALIDATION", false),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}={:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_api_key() {
        let config = config_from(&[]);
        assert!(config.gemini.is_none());
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.provider_timeout, Duration::from_secs(15));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay, Duration::from_secs(1));
        assert_eq!(config.retry.max_delay, Duration::from_secs(3));
        assert_eq!(config.min_reply_chars, 5);
        assert!(!config.strict_validation);
    }

    #[test]
    fn blank_api_key_means_rules_only() {
        let config = config_from(&[("GEMINI_API_KEY", "   ")]);
        assert!(config.gemini.is_none());
    }

    #[test]
    fn gemini_settings_are_read() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-1.5-flash"),
            ("GEMINI_API_BASE", "http://localhost:9000/v1beta/"),
            ("MAX_OUTPUT_TOKENS", "80"),
            ("TEMPERATURE", "0.2"),
        ]);
        let gemini = config.gemini.expect("gemini configured");
        assert_eq!(gemini.api_key, "secret");
        assert_eq!(gemini.model, "gemini-1.5-flash");
        assert_eq!(gemini.api_base, "http://localhost:9000/v1beta");
        assert_eq!(gemini.max_output_tokens, 80);
        assert!((gemini.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn unparseable_values_fall_back() {
        let config = config_from(&[
            ("PORT", "eighty"),
            ("STRICT_VALIDATION", "true"),
            ("PROVIDER_MAX_ATTEMPTS", "0"),
        ]);
        assert_eq!(config.port, 3000);
        assert!(config.strict_validation);
        assert_eq!(config.retry.max_attempts, 1);
    }
}
