//! Authenticated HTTP client.

use crate::config::ClientConfig;
use crate::flow::{AuthAction, AuthEvent, AuthFlow};
use alphadesk_core::types::{Envelope, RefreshRequest, TokenPair};
use alphadesk_core::{ClientError, Result};
use alphadesk_retries::with_retry;
use alphadesk_session::{SessionManager, TokenRefresher};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Body and extra headers for a request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// JSON body.
    pub body: Option<Value>,
    /// Headers applied after the defaults, overriding them.
    pub headers: HeaderMap,
}

impl RequestOptions {
    /// Options without a body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options carrying `body` as JSON.
    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self> {
        Ok(Self {
            body: Some(serde_json::to_value(body)?),
            headers: HeaderMap::new(),
        })
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Client for the alphadesk backend.
///
/// Clones share the connection pool, the session, and the configuration.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: Arc<ClientConfig>,
    session: SessionManager,
    refresher: Arc<dyn TokenRefresher>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url.as_str())
            .field("session", &self.session)
            .finish()
    }
}

impl ApiClient {
    /// Create a client for `config` over `session`.
    pub fn new(config: ClientConfig, session: SessionManager) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self::with_http_client(http, config, session))
    }

    /// Create with a custom reqwest client.
    pub fn with_http_client(http: Client, config: ClientConfig, session: SessionManager) -> Self {
        let refresher = Arc::new(HttpRefresher::new(http.clone(), config.endpoint("/auth/refresh")));
        Self {
            http,
            config: Arc::new(config),
            session,
            refresher,
        }
    }

    /// Replace the refresh seam.
    #[must_use]
    pub fn with_refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = refresher;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the session.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Get the underlying reqwest client.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Send an authenticated request.
    ///
    /// The stored access token is attached as a bearer credential. A 401
    /// triggers one shared credential refresh followed by exactly one retry.
    /// Returns the response for every other outcome, including non-401
    /// failures, which callers turn into errors with [`json_or_error`].
    ///
    /// # Errors
    ///
    /// [`ClientError::Unauthorized`] when the refresh fails or the retry is
    /// still rejected; by then credentials are purged and the unauthorized
    /// callback has fired. Network failures surface as
    /// [`ClientError::Network`].
    pub async fn request(&self, method: Method, path: &str, options: RequestOptions) -> Result<Response> {
        let url = self.config.endpoint(path);
        let mut flow = AuthFlow::new();

        let mut response = self
            .send(method.clone(), &url, &options, self.session.access_token())
            .await?;
        let mut event = AuthEvent::Response(response.status().as_u16());

        loop {
            match flow.step(event)? {
                AuthAction::Return => return Ok(response),
                AuthAction::Refresh => {
                    debug!(method = %method, url = %url, "Request unauthorized, refreshing credentials");
                    let refreshed = self.session.refresh(Arc::clone(&self.refresher)).await;
                    event = AuthEvent::Refreshed(refreshed);
                }
                AuthAction::Retry => {
                    debug!(method = %method, url = %url, "Retrying with refreshed credentials");
                    response = self
                        .send(method.clone(), &url, &options, self.session.access_token())
                        .await?;
                    event = AuthEvent::Response(response.status().as_u16());
                }
                AuthAction::Terminate => {
                    warn!(method = %method, url = %url, "Credential refresh failed, session terminated");
                    return Err(ClientError::Unauthorized);
                }
                AuthAction::Expire => {
                    warn!(method = %method, url = %url, "Still unauthorized after refresh, expiring session");
                    self.session.expire();
                    return Err(ClientError::Unauthorized);
                }
            }
        }
    }

    /// Send a single request without credentials.
    pub async fn public_request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        let url = self.config.endpoint(path);
        self.send(method, &url, &options, None).await
    }

    /// Send a request without credentials under the login retry policy.
    ///
    /// Each attempt is bounded by the configured per-attempt timeout and
    /// abandoned when it elapses. Network failures are retried after the
    /// backoff until the attempt budget is spent. A response with any status
    /// ends the loop.
    pub async fn send_with_retry(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        let url = self.config.endpoint(path);

        with_retry(&self.config.login_retry, || {
            let method = method.clone();
            let url = url.clone();
            let options = options.clone();
            async move { self.send(method, &url, &options, None).await }
        })
        .await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
        token: Option<String>,
    ) -> Result<Response> {
        debug!(method = %method, url = %url, authenticated = token.is_some(), "Sending request");

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ClientError::Configuration(format!("invalid access token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        headers.extend(options.headers.clone());

        let mut request = self.http.request(method, url).headers(headers);
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }
}

/// Calls `POST /auth/refresh`.
#[derive(Debug, Clone)]
pub struct HttpRefresher {
    http: Client,
    url: String,
}

impl HttpRefresher {
    /// Create a refresher posting to `url`.
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl TokenRefresher for HttpRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let response = self
            .http
            .post(&self.url)
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await?;

        let tokens: TokenPair = json_or_error(response).await?;
        info!("Refresh endpoint issued new credentials");
        Ok(tokens)
    }
}

/// Decode a success body, or turn a failure into a [`ClientError`].
pub async fn json_or_error<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let body = String::from_utf8_lossy(&bytes);
        return Err(ClientError::from_status(status.as_u16(), &body));
    }

    Ok(serde_json::from_slice(&bytes)?)
}

/// Decode a `{ success, data }` envelope and return its payload.
///
/// A missing `data` field yields `T::default()`.
pub async fn envelope_data<T: DeserializeOwned + Default>(response: Response) -> Result<T> {
    let envelope: Envelope<T> = json_or_error(response).await?;
    Ok(envelope.into_data())
}

/// Decode the body whatever the status.
///
/// For endpoints that describe their own failures in the body. Falls back to
/// [`ClientError::from_status`] when a failure body has the wrong shape.
pub async fn json_any_status<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await?;

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(ClientError::from_status(
            status.as_u16(),
            &String::from_utf8_lossy(&bytes),
        )),
        Err(err) => Err(err.into()),
    }
}
