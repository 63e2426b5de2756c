use base64::{engine::general_purpose, Engine as _};
use std::time::Duration;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: u16 = 300;
const DEFAULT_TEMPERATURE: f32 = 0.6;
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} missing")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub model: String,
    pub max_tokens: u16,
    pub temperature: f32,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub session_key: Vec<u8>,
    pub bind_addr: String,
    pub secure_cookies: bool,
    pub seed_demo: bool,
    pub openai: OpenAiSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let session_key_b64 = var("SESSION_KEY").ok_or(ConfigError::Missing("SESSION_KEY"))?;
        let session_key = general_purpose::STANDARD
            .decode(session_key_b64)
            .map_err(|e| ConfigError::Invalid {
                name: "SESSION_KEY",
                reason: format!("must be base64 ({e})"),
            })?;
        if session_key.len() < 32 {
            return Err(ConfigError::Invalid {
                name: "SESSION_KEY",
                reason: "must decode to at least 32 bytes".to_string(),
            });
        }

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| {
            let port = var("PORT").unwrap_or_else(|| "3000".to_string());
            format!("0.0.0.0:{}", port)
        });

        // Unparsable or zero falls back to the default cap.
        let max_tokens = var("OPENAI_MAX_TOKENS")
            .and_then(|v| v.parse::<u16>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let temperature = match var("OPENAI_TEMPERATURE") {
            Some(raw) => raw
                .parse::<f32>()
                .ok()
                .filter(|t| (0.0..=2.0).contains(t))
                .ok_or(ConfigError::Invalid {
                    name: "OPENAI_TEMPERATURE",
                    reason: format!("expected a number in 0..=2, got {raw}"),
                })?,
            None => DEFAULT_TEMPERATURE,
        };

        let timeout_secs = match var("OPENAI_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "OPENAI_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let openai = OpenAiSettings {
            api_key: var("OPENAI_API_KEY"),
            organization: var("OPENAI_ORGANIZATION"),
            project: var("OPENAI_PROJECT"),
            model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
            temperature,
            base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            database_url,
            session_key,
            bind_addr,
            secure_cookies: var("PRODUCTION").is_some(),
            seed_demo: matches!(var("SEED_DEMO").as_deref(), Some("1") | Some("true")),
            openai,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn key() -> String {
        general_purpose::STANDARD.encode([7u8; 32])
    }

    #[test]
    fn test_defaults() {
        let key = key();
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/health"),
            ("SESSION_KEY", &key),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert!(config.openai.api_key.is_none());
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.max_tokens, 300);
        assert_eq!(config.openai.temperature, 0.6);
        assert_eq!(config.openai.timeout, Duration::from_secs(30));
        assert!(!config.seed_demo);
        assert!(!config.secure_cookies);
    }

    #[test]
    fn test_overrides() {
        let key = key();
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/health"),
            ("SESSION_KEY", &key),
            ("PORT", "8080"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_ORGANIZATION", "org-1"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_MAX_TOKENS", "512"),
            ("SEED_DEMO", "1"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai.organization.as_deref(), Some("org-1"));
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.max_tokens, 512);
        assert!(config.seed_demo);
    }

    #[test]
    fn test_bad_max_tokens_falls_back() {
        let key = key();
        for raw in ["abc", "0", "-5"] {
            let config = AppConfig::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://localhost/health"),
                ("SESSION_KEY", &key),
                ("OPENAI_MAX_TOKENS", raw),
            ]))
            .unwrap();
            assert_eq!(config.openai.max_tokens, 300, "{raw}");
        }
    }

    #[test]
    fn test_required_values() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/health"),
            ("SESSION_KEY", "c2hvcnQ="),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SESSION_KEY", .. }));
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let key = key();
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/health"),
            ("SESSION_KEY", &key),
            ("OPENAI_API_KEY", "   "),
        ]))
        .unwrap();
        assert!(config.openai.api_key.is_none());
    }
}
