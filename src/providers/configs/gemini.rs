use std::fmt;

use super::base::ProviderConfig;
use anyhow::Result;

pub const GEMINI_HOST: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Key baked into the binary when `GEMINI_API_KEY` is set at build time.
pub const BUILD_TIME_API_KEY: Option<&str> = option_env!("GEMINI_API_KEY");

#[derive(Clone)]
pub struct GeminiProviderConfig {
    /// `None` is a valid state: every request then fails with a
    /// configuration error instead of reaching the network.
    pub api_key: Option<String>,
    pub host: String,
    pub model: String,
}

impl GeminiProviderConfig {
    pub fn new(api_key: Option<String>, host: String, model: String) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.is_empty()),
            host,
            model,
        }
    }

    /// Like [`ProviderConfig::from_env`], falling back to `default_key` when
    /// `GEMINI_API_KEY` is not set at runtime.
    pub fn from_env_or(default_key: Option<&str>) -> Result<Self> {
        let api_key = Self::get_env("GEMINI_API_KEY", false, default_key.map(str::to_string))?;
        let host = Self::get_env("GEMINI_API_HOST", false, Some(GEMINI_HOST.to_string()))?
            .unwrap_or_else(|| GEMINI_HOST.to_string());
        let model = Self::get_env("GEMINI_MODEL", false, Some(GEMINI_MODEL.to_string()))?
            .unwrap_or_else(|| GEMINI_MODEL.to_string());

        Ok(Self::new(api_key, host, model))
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|key| !key.is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn with_host(mut self, host: Option<String>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        self
    }
}

impl ProviderConfig for GeminiProviderConfig {
    fn from_env() -> Result<Self> {
        Self::from_env_or(BUILD_TIME_API_KEY)
    }
}

// Keeps the key out of logs.
impl fmt::Debug for GeminiProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        env::remove_var("GEMINI_API_KEY");
        env::remove_var("GEMINI_API_HOST");
        env::remove_var("GEMINI_MODEL");
    }

    #[test]
    #[serial]
    fn test_defaults_without_key() -> Result<()> {
        clean_env();

        let config = GeminiProviderConfig::from_env_or(None)?;
        assert_eq!(config.api_key, None);
        assert_eq!(config.host, GEMINI_HOST);
        assert_eq!(config.model, GEMINI_MODEL);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_runtime_key_wins_over_build_time_key() -> Result<()> {
        clean_env();
        env::set_var("GEMINI_API_KEY", "runtime-key");

        let config = GeminiProviderConfig::from_env_or(Some("baked-key"))?;
        assert_eq!(config.api_key.as_deref(), Some("runtime-key"));

        clean_env();
        Ok(())
    }

    #[test]
    #[serial]
    fn test_build_time_key_fallback() -> Result<()> {
        clean_env();

        let config = GeminiProviderConfig::from_env_or(Some("baked-key"))?;
        assert_eq!(config.api_key.as_deref(), Some("baked-key"));
        Ok(())
    }

    #[test]
    #[serial]
    fn test_empty_key_is_absent() -> Result<()> {
        clean_env();
        env::set_var("GEMINI_API_KEY", "");

        let config = GeminiProviderConfig::from_env_or(None)?;
        assert_eq!(config.api_key, None);

        clean_env();
        Ok(())
    }

    #[test]
    #[serial]
    fn test_environment_override() -> Result<()> {
        clean_env();
        env::set_var("GEMINI_API_HOST", "http://localhost:9999");
        env::set_var("GEMINI_MODEL", "gemini-1.5-pro");

        let config = GeminiProviderConfig::from_env_or(None)?;
        assert_eq!(config.host, "http://localhost:9999");
        assert_eq!(config.model, "gemini-1.5-pro");

        clean_env();
        Ok(())
    }

    #[test]
    fn test_cli_overrides() {
        let config = GeminiProviderConfig::new(None, GEMINI_HOST.to_string(), GEMINI_MODEL.to_string())
            .with_api_key(Some("flag-key".to_string()))
            .with_model(Some("gemini-pro".to_string()))
            .with_host(None);
        assert_eq!(config.api_key.as_deref(), Some("flag-key"));
        assert_eq!(config.model, "gemini-pro");
        assert_eq!(config.host, GEMINI_HOST);

        // an empty flag does not clear a configured key
        let config = config.with_api_key(Some(String::new()));
        assert_eq!(config.api_key.as_deref(), Some("flag-key"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GeminiProviderConfig::new(
            Some("secret".to_string()),
            GEMINI_HOST.to_string(),
            GEMINI_MODEL.to_string(),
        );
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
