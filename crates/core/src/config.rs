//! Application configuration.
//!
//! All configuration is read from the process environment exactly once, at
//! startup, via [`AppConfig::from_env`]. A missing API key is a fatal
//! configuration error detected before any request is accepted — never a
//! per-request check and never a retry condition.
//!
//! | Variable                  | Default                     |
//! |---------------------------|-----------------------------|
//! | `PAGEPULSE_API_KEY`       | required                    |
//! | `PAGEPULSE_API_BASE`      | `https://api.openai.com/v1` |
//! | `PAGEPULSE_MODEL`         | `gpt-4o-mini`               |
//! | `PAGEPULSE_LANGUAGE`      | `ja`                        |
//! | `PAGEPULSE_FETCH_TIMEOUT` | `10` (seconds)              |
//! | `PAGEPULSE_MODEL_TIMEOUT` | `60` (seconds)              |

use std::env;

use crate::diagnosis::ModelConfig;
use crate::extract::ExtractConfig;
use crate::fetch::FetchConfig;
use crate::{PagePulseError, Result};

/// Complete pipeline configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Page fetch settings (timeout, size cap, user agent).
    pub fetch: FetchConfig,
    /// Extraction thresholds.
    pub extract: ExtractConfig,
    /// Model service settings.
    pub model: ModelConfig,
}

impl AppConfig {
    /// Reads configuration from the environment, failing fast on anything
    /// missing or unparsable.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("PAGEPULSE_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| PagePulseError::ConfigMissing("PAGEPULSE_API_KEY".to_string()))?;

        let mut fetch = FetchConfig::default();
        if let Some(timeout) = env_u64("PAGEPULSE_FETCH_TIMEOUT")? {
            fetch.timeout = timeout;
        }

        let mut model = ModelConfig { api_key, ..Default::default() };
        if let Ok(base) = env::var("PAGEPULSE_API_BASE") {
            model.api_base = base;
        }
        if let Ok(id) = env::var("PAGEPULSE_MODEL") {
            model.model = id;
        }
        if let Ok(language) = env::var("PAGEPULSE_LANGUAGE") {
            model.language = language;
        }
        if let Some(timeout) = env_u64("PAGEPULSE_MODEL_TIMEOUT")? {
            model.timeout = timeout;
        }

        Ok(Self { fetch, extract: ExtractConfig::default(), model })
    }

    /// A configuration for tests and offline runs; `api_key` is a dummy.
    pub fn for_tests() -> Self {
        Self {
            fetch: FetchConfig::default(),
            extract: ExtractConfig::default(),
            model: ModelConfig { api_key: "test-key".to_string(), ..Default::default() },
        }
    }
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| PagePulseError::ConfigMissing(format!("{} must be an integer, got \"{}\"", name, raw))),
    }
}
