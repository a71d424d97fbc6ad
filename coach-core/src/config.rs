//! Configuration
//!
//! Backend endpoint/keys and page-data timing. The WASM build bakes values in at compile
//! time; native tools and tests read the environment.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{DomainError, DomainResult};

pub const ENV_BACKEND_URL: &str = "COACH_BACKEND_URL";
pub const ENV_BACKEND_ANON_KEY: &str = "COACH_BACKEND_ANON_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PHOTO_BUCKET: &str = "progress-photos";

/// Backend-as-a-service connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public (anon) API key
    pub anon_key: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_photo_bucket")]
    pub photo_bucket: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_photo_bucket() -> String {
    DEFAULT_PHOTO_BUCKET.to_string()
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            photo_bucket: DEFAULT_PHOTO_BUCKET.to_string(),
        }
    }

    /// Read from runtime environment variables
    pub fn from_env() -> DomainResult<Self> {
        let url = std::env::var(ENV_BACKEND_URL)
            .map_err(|_| DomainError::InvalidInput(format!("{} is not set", ENV_BACKEND_URL)))?;
        let key = std::env::var(ENV_BACKEND_ANON_KEY)
            .map_err(|_| DomainError::InvalidInput(format!("{} is not set", ENV_BACKEND_ANON_KEY)))?;
        let config = Self::new(url, key);
        config.validate()?;
        Ok(config)
    }

    /// Values captured when the crate was compiled (used by the WASM bundle)
    pub fn from_build_env() -> DomainResult<Self> {
        let url = option_env!("COACH_BACKEND_URL").unwrap_or_default();
        let key = option_env!("COACH_BACKEND_ANON_KEY").unwrap_or_default();
        let config = Self::new(url, key);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.url.trim().is_empty() {
            return Err(DomainError::InvalidInput("backend url is empty".into()));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(DomainError::InvalidInput(format!("backend url must be http(s): {}", self.url)));
        }
        if self.anon_key.trim().is_empty() {
            return Err(DomainError::InvalidInput("backend anon key is empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(DomainError::InvalidInput("request timeout must be positive".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }

    pub fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.url, path)
    }
}

/// Timing of the page-data controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageDataConfig {
    /// Refetches closer than this to the previous attempt are dropped
    pub debounce_ms: u64,
    /// Wait after foreground/focus before refetching
    pub resume_delay_ms: u64,
}

impl Default for PageDataConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            resume_delay_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = BackendConfig::new("https://demo.example.co/", "key");
        assert_eq!(config.rest_url("meals"), "https://demo.example.co/rest/v1/meals");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_missing_values() {
        assert!(BackendConfig::new("", "key").validate().is_err());
        assert!(BackendConfig::new("ftp://x", "key").validate().is_err());
        assert!(BackendConfig::new("https://x", " ").validate().is_err());
        assert!(BackendConfig::new("https://x", "key").validate().is_ok());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: BackendConfig =
            serde_json::from_str(r#"{"url":"https://x","anon_key":"k"}"#).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.photo_bucket, "progress-photos");
    }

    #[test]
    fn test_page_data_defaults() {
        let config = PageDataConfig::default();
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.resume_delay_ms, 100);
    }
}
