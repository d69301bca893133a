//! Facture HTTP Client
//!
//! Transport layer for the Facture dashboard runtime: an object-safe [`Api`]
//! trait over the remote REST API, a reqwest-backed implementation, session
//! persistence, and the auth and stats operations.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use facture_client::{Api, HttpApi, MemorySessionStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), facture_client::Error> {
//!     let session = Arc::new(MemorySessionStore::new());
//!     let api = HttpApi::builder("http://localhost:3000/api")
//!         .session_store(session)
//!         .build()?;
//!
//!     let response = api.get("clients", &[]).await?;
//!     println!("status: {}", response.status);
//!     Ok(())
//! }
//! ```
//!
//! The bearer token is read fresh from the [`SessionStore`] on every
//! request, so login and logout take effect without rebuilding the client.

pub mod auth;
mod error;
pub mod session;
pub mod stats;
pub mod testing;

pub use auth::AuthApi;
pub use error::Error;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use stats::StatsApi;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read a collection or entity.
    Get,
    /// Create an entity or invoke an action.
    Post,
    /// Replace an entity.
    Put,
    /// Partially update an entity.
    Patch,
    /// Delete an entity.
    Delete,
}

impl Method {
    /// Canonical uppercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful (2xx) API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body; `Null` for empty bodies.
    pub data: Value,
}

/// The remote API as seen by the state layer.
///
/// One entry point plus verb helpers; implementations must be `Send + Sync`
/// and stateless beyond attaching the session's bearer token. Non-2xx
/// responses surface as [`Error::Api`] with the server's `message` when the
/// body carries one.
#[async_trait]
pub trait Api: Send + Sync {
    /// Issue a request and return the parsed response.
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error>;

    /// `GET path?params`.
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<ApiResponse, Error> {
        self.request(Method::Get, path, params, None).await
    }

    /// `POST path` with a JSON body.
    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, Error> {
        self.request(Method::Post, path, &[], Some(body)).await
    }

    /// `PUT path` with a JSON body.
    async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse, Error> {
        self.request(Method::Put, path, &[], Some(body)).await
    }

    /// `PATCH path` with a JSON body.
    async fn patch(&self, path: &str, body: &Value) -> Result<ApiResponse, Error> {
        self.request(Method::Patch, path, &[], Some(body)).await
    }

    /// `DELETE path`.
    async fn delete(&self, path: &str) -> Result<ApiResponse, Error> {
        self.request(Method::Delete, path, &[], None).await
    }
}

/// Reqwest-backed [`Api`] implementation.
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    session: Option<Arc<dyn SessionStore>>,
}

impl fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpApi")
            .field("base_url", &self.base_url)
            .field("has_session", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for configuring an [`HttpApi`].
pub struct HttpApiBuilder {
    base_url: String,
    timeout: Duration,
    session: Option<Arc<dyn SessionStore>>,
    client: Option<reqwest::Client>,
}

impl fmt::Debug for HttpApiBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpApiBuilder")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpApiBuilder {
    /// Create a new builder with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            session: None,
            client: None,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach a session store; the bearer token is read from it per request.
    #[must_use]
    pub fn session_store(mut self, session: Arc<dyn SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    /// Use a custom reqwest client.
    ///
    /// Useful for configuring TLS, proxies, or other advanced settings.
    #[must_use]
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the API client.
    pub fn build(self) -> Result<HttpApi, Error> {
        let client = match self.client {
            Some(c) => c,
            None => reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| Error::Configuration(e.to_string()))?,
        };

        Ok(HttpApi {
            client,
            base_url: self.base_url,
            session: self.session,
        })
    }
}

impl HttpApi {
    /// Create a builder for the given base URL.
    pub fn builder(base_url: impl Into<String>) -> HttpApiBuilder {
        HttpApiBuilder::new(base_url)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Add the authorization header if the session holds a token.
    fn add_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.as_ref().and_then(|s| s.token()) {
            Some(token) => req.header("Authorization", format!("Bearer {token}")),
            None => req,
        }
    }
}

#[async_trait]
impl Api for HttpApi {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let method = match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut req = self.client.request(method, &url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = self
            .add_auth(req)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        // Empty and non-JSON bodies degrade to Null rather than failing the
        // request outright; 204s and proxies produce both.
        let data: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if (200..300).contains(&status) {
            Ok(ApiResponse { status, data })
        } else {
            Err(Error::Api {
                status,
                message: server_message(&data)
                    .unwrap_or_else(|| format!("request failed with status {status}")),
            })
        }
    }
}

/// Extract the server's `message` field from an error body, if present.
fn server_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_trims_trailing_slash() {
        let api = HttpApi::builder("http://localhost:3000/api/").build().unwrap();
        assert_eq!(api.base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn builder_preserves_url_without_slash() {
        let api = HttpApi::builder("http://localhost:3000/api").build().unwrap();
        assert_eq!(api.base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn server_message_extraction() {
        let body = serde_json::json!({ "message": "sku already exists" });
        assert_eq!(server_message(&body).as_deref(), Some("sku already exists"));

        let body = serde_json::json!({ "error": "nope" });
        assert!(server_message(&body).is_none());

        assert!(server_message(&Value::Null).is_none());
    }

    #[test]
    fn method_display() {
        assert_eq!(Method::Patch.to_string(), "PATCH");
        assert_eq!(Method::Get.as_str(), "GET");
    }
}
