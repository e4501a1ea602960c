//! Transport abstraction over the HTTP layer.
//!
//! [`Transport`] is the seam between the request/session logic in
//! [`ApiClient`](crate::ApiClient) and the wire: production code uses
//! [`HttpTransport`] (reqwest), while tests inject an in-memory fake.

use std::time::Duration;

use async_trait::async_trait;
use linktoss_common::{ApiError, ApiResult, Config};
use reqwest::Method;
use url::Url;

/// A single request to the backend, before auth headers are attached.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the base URL, with trailing slash, e.g. `/decks/`.
    pub path: String,
    /// Query parameters, in append order.
    pub query: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
    /// Whether a bearer token must be attached and 401s handled.
    pub requires_auth: bool,
}

impl ApiRequest {
    /// Build a request with no query and no body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            requires_auth: true,
        }
    }

    /// GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    /// PUT request with a JSON body.
    #[must_use]
    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    /// PATCH request with a JSON body.
    #[must_use]
    pub fn patch(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::PATCH, path).with_body(body)
    }

    /// DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a query parameter when the value is present.
    #[must_use]
    pub fn with_opt_query(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with_query(key, value),
            None => self,
        }
    }

    /// Mark the request as unauthenticated (login, refresh).
    #[must_use]
    pub fn unauthenticated(mut self) -> Self {
        self.requires_auth = false;
        self
    }
}

/// Raw status/body pair returned by a transport.
///
/// Transport errors (connection refused, timeout) surface as `Err`;
/// any response the backend produced, including 4xx/5xx, is `Ok`.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, expected to be JSON or empty.
    pub body: String,
}

impl RawResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Executes [`ApiRequest`]s against a backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a single request, attaching `bearer` when provided.
    async fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> ApiResult<RawResponse>;
}

/// Production transport over a configured [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Build a transport from client configuration.
    pub fn new(config: &Config) -> ApiResult<Self> {
        let base_url = config.api.parsed_base_url()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .connect_timeout(Duration::from_secs(config.http.connect_timeout_secs))
            .user_agent(config.http.user_agent.clone())
            .build()?;

        Ok(Self { client, base_url })
    }

    fn url_for(&self, request: &ApiRequest) -> ApiResult<Url> {
        // Paths are absolute ("/decks/"); join them onto the configured base.
        let joined = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.path
        );
        let mut url = Url::parse(&joined).map_err(|e| ApiError::Internal(e.to_string()))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> ApiResult<RawResponse> {
        let url = self.url_for(request)?;

        let mut builder = self.client.request(request.method.clone(), url.clone());
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method, url = %url, "Sending request");

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(method = %request.method, path = %request.path, status, "Received response");

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::get("/decks/")
            .with_query("parent", "deck-1")
            .with_opt_query("missing", None::<String>);
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/decks/");
        assert_eq!(request.query, vec![("parent".to_string(), "deck-1".to_string())]);
        assert!(request.requires_auth);

        let login = ApiRequest::post("/users/google/login/", serde_json::json!({}))
            .unauthenticated();
        assert!(!login.requires_auth);
        assert!(login.body.is_some());
    }

    #[test]
    fn test_url_join_keeps_trailing_slash() {
        let config = Config::for_base_url("http://localhost:8000");
        let transport = HttpTransport::new(&config).unwrap();
        let url = transport
            .url_for(&ApiRequest::get("/decks/tree/").with_query("deck_id", "d1"))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/decks/tree/?deck_id=d1");
    }
}
