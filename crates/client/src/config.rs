use std::time::Duration;

/// Default API base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:5002";

/// Idle window before pending editor changes are saved.
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 1000;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Echo API, without a trailing slash.
    pub api_url: String,
    pub autosave_debounce: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `ECHO_API_URL`              | `http://localhost:5002` |
    /// | `ECHO_AUTOSAVE_DEBOUNCE_MS` | `1000`                  |
    pub fn from_env() -> Self {
        let api_url = std::env::var("ECHO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());

        let debounce_ms: u64 = std::env::var("ECHO_AUTOSAVE_DEBOUNCE_MS")
            .unwrap_or_else(|_| DEFAULT_AUTOSAVE_DEBOUNCE_MS.to_string())
            .parse()
            .expect("ECHO_AUTOSAVE_DEBOUNCE_MS must be a valid u64");

        Self::new(api_url, Duration::from_millis(debounce_ms))
    }

    pub fn new(api_url: impl Into<String>, autosave_debounce: Duration) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            autosave_debounce,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_API_URL,
            Duration::from_millis(DEFAULT_AUTOSAVE_DEBOUNCE_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        let config = ClientConfig::new("http://echo.internal:8080/", Duration::ZERO);
        assert_eq!(config.api_url, "http://echo.internal:8080");
    }

    #[test]
    fn defaults_match_local_server() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://localhost:5002");
        assert_eq!(config.autosave_debounce, Duration::from_secs(1));
    }
}
