use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::application::ports::completion_provider::GenerationParams;
use crate::infrastructure::external_services::CompletionClientConfig;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} is required when {reason}")]
    Missing { key: &'static str, reason: String },
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextStoreKind {
    Postgres,
    Memory,
}

impl FromStr for ContextStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected 'postgres' or 'memory', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub context_store: ContextStoreKind,
    pub database_url: Option<String>,
    pub database_pool_size: u32,
    pub completion: CompletionClientConfig,
    pub generation: GenerationParams,
    pub max_write_retries: u32,
    pub tesseract_cmd: String,
    pub ocr_lang: String,
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    key,
                    value: value.clone(),
                    reason: e.to_string(),
                })
        }
        _ => Ok(default),
    }
}

fn string_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset and blank keys
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = CompletionClientConfig::default();
        let default_params = GenerationParams::default();

        let context_store = parse_or(&lookup, "CONTEXT_STORE", ContextStoreKind::Postgres)?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        if context_store == ContextStoreKind::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing {
                key: "DATABASE_URL",
                reason: "CONTEXT_STORE is postgres".to_string(),
            });
        }

        let temperature: f32 = parse_or(&lookup, "LLM_TEMPERATURE", default_params.temperature)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue {
                key: "LLM_TEMPERATURE",
                value: temperature.to_string(),
                reason: "must be between 0 and 2".to_string(),
            });
        }

        let top_p: f32 = parse_or(&lookup, "LLM_TOP_P", default_params.top_p)?;
        if !(0.0..=1.0).contains(&top_p) {
            return Err(ConfigError::InvalidValue {
                key: "LLM_TOP_P",
                value: top_p.to_string(),
                reason: "must be between 0 and 1".to_string(),
            });
        }

        Ok(Self {
            host: parse_or(&lookup, "HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: parse_or(&lookup, "PORT", 3000)?,
            upload_dir: PathBuf::from(string_or(&lookup, "UPLOAD_DIR", "./uploads")),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 50 * 1024 * 1024)?,
            context_store,
            database_url,
            database_pool_size: parse_or(&lookup, "DATABASE_POOL_SIZE", 10)?,
            completion: CompletionClientConfig {
                base_url: string_or(&lookup, "LLM_BASE_URL", &defaults.base_url),
                api_key: lookup("LLM_API_KEY").filter(|key| !key.trim().is_empty()),
                model: string_or(&lookup, "LLM_MODEL", &defaults.model),
                timeout_secs: parse_or(&lookup, "LLM_TIMEOUT_SECS", defaults.timeout_secs)?,
            },
            generation: GenerationParams {
                max_tokens: parse_or(&lookup, "LLM_MAX_TOKENS", default_params.max_tokens)?,
                temperature,
                top_p,
            },
            max_write_retries: parse_or(&lookup, "ASK_MAX_WRITE_RETRIES", 3)?,
            tesseract_cmd: string_or(&lookup, "TESSERACT_CMD", "tesseract"),
            ocr_lang: string_or(&lookup, "OCR_LANG", "eng"),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
