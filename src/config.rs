//! Configuration for the warehouse client

use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Environment variable holding the backend project URL
pub const ENV_URL: &str = "GODOWN_SUPABASE_URL";

/// Environment variable holding the public (anon) API key
pub const ENV_ANON_KEY: &str = "GODOWN_SUPABASE_ANON_KEY";

/// Placeholder value shipped in example configuration for the project URL
pub const URL_PLACEHOLDER: &str = "YOUR_SUPABASE_URL";

/// Placeholder value shipped in example configuration for the anon key
pub const KEY_PLACEHOLDER: &str = "YOUR_SUPABASE_ANON_KEY";

/// Validated connection settings for the hosted backend.
///
/// Construction is the configuration gate: a missing or still-placeholder
/// value fails here with [`Error::Config`], before any network call is
/// attempted, so callers can show setup instructions instead of a broken
/// application.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend project
    pub url: Url,

    /// Public API key sent with every request
    pub anon_key: String,
}

impl Config {
    /// Create a new configuration, validating both values.
    pub fn new(url: &str, anon_key: &str) -> Result<Self, Error> {
        if url.is_empty() || url == URL_PLACEHOLDER {
            return Err(Error::config(
                "backend URL is not configured; replace the placeholder with your project URL",
            ));
        }
        if anon_key.is_empty() || anon_key == KEY_PLACEHOLDER {
            return Err(Error::config(
                "anon key is not configured; replace the placeholder with your project API key",
            ));
        }
        let url = Url::parse(url)?;
        Ok(Self {
            url,
            anon_key: anon_key.to_string(),
        })
    }

    /// Load the configuration from `GODOWN_SUPABASE_URL` and
    /// `GODOWN_SUPABASE_ANON_KEY`.
    pub fn from_env() -> Result<Self, Error> {
        let url = std::env::var(ENV_URL)
            .map_err(|_| Error::config(format!("{} environment variable not found", ENV_URL)))?;
        let anon_key = std::env::var(ENV_ANON_KEY).map_err(|_| {
            Error::config(format!("{} environment variable not found", ENV_ANON_KEY))
        })?;
        Self::new(&url, &anon_key)
    }

    /// Base URL with any trailing slash removed, ready for path joining.
    pub(crate) fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }
}

/// Client behaviour options
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Timeout applied to every request; `None` leaves the transport default
    pub request_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_real_credentials() {
        let config = Config::new("https://project.example.co", "anon-key").unwrap();
        assert_eq!(config.base_url(), "https://project.example.co");
        assert_eq!(config.anon_key, "anon-key");
    }

    #[test]
    fn rejects_placeholder_values() {
        assert!(matches!(
            Config::new(URL_PLACEHOLDER, "anon-key"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::new("https://project.example.co", KEY_PLACEHOLDER),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn rejects_empty_values() {
        assert!(matches!(Config::new("", "anon-key"), Err(Error::Config(_))));
        assert!(matches!(
            Config::new("https://project.example.co", ""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn rejects_unparseable_url() {
        assert!(matches!(
            Config::new("not a url", "anon-key"),
            Err(Error::Url(_))
        ));
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        let config = Config::new("https://project.example.co/", "anon-key").unwrap();
        assert_eq!(config.base_url(), "https://project.example.co");
    }
}
