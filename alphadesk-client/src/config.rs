//! Client configuration.

use alphadesk_core::{ClientError, Result};
use alphadesk_retries::RetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Environment variable holding the backend base URL.
pub const BASE_URL_ENV: &str = "ALPHADESK_API_BASE_URL";

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Configuration for [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL.
    pub base_url: Url,
    /// Timeout applied to ordinary requests.
    pub request_timeout: Duration,
    /// Retry settings for login and registration.
    #[serde(skip)]
    pub login_retry: RetryConfig,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: Duration::from_secs(30),
            login_retry: RetryConfig::for_login(),
            user_agent: concat!("alphadesk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a config with the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Default::default()
        })
    }

    /// Load from the environment.
    ///
    /// Reads `ALPHADESK_API_BASE_URL`; an unset or blank variable falls back
    /// to [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Result<Self> {
        match std::env::var(BASE_URL_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::new(value.trim()),
            _ => Ok(Self::default()),
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = url;
        self
    }

    /// Set the ordinary request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the login and registration retry settings.
    #[must_use]
    pub fn login_retry(mut self, retry: RetryConfig) -> Self {
        self.login_retry = retry;
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolve a request path against the base URL.
    ///
    /// Absolute `http(s)://` URLs are returned unchanged. Anything else is
    /// joined onto the base with exactly one `/` between them.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Build an endpoint URL from raw path segments and query pairs.
    ///
    /// Each segment is percent-encoded, so identifiers containing `/` or `?`
    /// stay inside their segment.
    pub fn endpoint_url<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
        query: &[(&str, String)],
    ) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClientError::Configuration(format!(
                    "base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?;
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim_end_matches('/'))
        .map_err(|e| ClientError::Configuration(format!("invalid base URL {raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::Configuration(format!(
            "base URL cannot carry a path: {raw}"
        )));
    }
    Ok(url)
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL)
        .unwrap_or_else(|_| unreachable!("DEFAULT_BASE_URL is a valid absolute URL"))
}
