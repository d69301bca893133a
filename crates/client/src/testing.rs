//! Test doubles for the transport layer.
//!
//! [`MockApi`] lets the state-layer crates exercise their full request flow
//! with no network: routes are scripted up front and every call is recorded
//! for later assertions.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::{Api, ApiResponse, Error, Method};

/// One request observed by a [`MockApi`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// HTTP method.
    pub method: Method,
    /// Request path, as passed by the caller (leading slash stripped).
    pub path: String,
    /// Query parameters.
    pub params: Vec<(String, String)>,
    /// JSON body, if one was sent.
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
enum Outcome {
    Response { status: u16, body: Value },
    ConnectionError,
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    path: String,
    outcome: Outcome,
}

/// Scripted in-memory [`Api`] implementation.
///
/// Routes are matched by exact method + path, first match wins. Responses
/// follow the real transport's contract: 2xx succeeds, anything else becomes
/// [`Error::Api`] with the body's `message` when present. Unmatched requests
/// fail with a 404-shaped error so a missing script line reads clearly in
/// test output.
#[derive(Debug, Default)]
pub struct MockApi {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockApi {
    /// Create a mock with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a JSON response for `method path`.
    #[must_use]
    pub fn on(self, method: Method, path: &str, status: u16, body: Value) -> Self {
        self.routes.lock().push(Route {
            method,
            path: path.trim_start_matches('/').to_string(),
            outcome: Outcome::Response { status, body },
        });
        self
    }

    /// Script a connection failure for `method path`.
    #[must_use]
    pub fn on_connection_error(self, method: Method, path: &str) -> Self {
        self.routes.lock().push(Route {
            method,
            path: path.trim_start_matches('/').to_string(),
            outcome: Outcome::ConnectionError,
        });
        self
    }

    /// Replace the scripted response for `method path`, or add it if absent.
    ///
    /// Useful mid-test when the same endpoint must answer differently after
    /// some action (e.g. a status change followed by a refresh).
    pub fn set_response(&self, method: Method, path: &str, status: u16, body: Value) {
        let path = path.trim_start_matches('/').to_string();
        let mut routes = self.routes.lock();
        if let Some(route) = routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        {
            route.outcome = Outcome::Response { status, body };
        } else {
            routes.push(Route {
                method,
                path,
                outcome: Outcome::Response { status, body },
            });
        }
    }

    /// Snapshot of every call observed so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of calls matching `method path`.
    #[must_use]
    pub fn call_count(&self, method: Method, path: &str) -> usize {
        let path = path.trim_start_matches('/');
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }
}

#[async_trait]
impl Api for MockApi {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        let path = path.trim_start_matches('/').to_string();
        self.calls.lock().push(RecordedCall {
            method,
            path: path.clone(),
            params: params.to_vec(),
            body: body.cloned(),
        });

        let outcome = self
            .routes
            .lock()
            .iter()
            .find(|r| r.method == method && r.path == path)
            .map(|r| r.outcome.clone());

        match outcome {
            Some(Outcome::Response { status, body }) if (200..300).contains(&status) => {
                Ok(ApiResponse { status, data: body })
            }
            Some(Outcome::Response { status, body }) => Err(Error::Api {
                status,
                message: body
                    .get("message")
                    .and_then(Value::as_str)
                    .map_or_else(
                        || format!("request failed with status {status}"),
                        ToString::to_string,
                    ),
            }),
            Some(Outcome::ConnectionError) => {
                Err(Error::Connection("simulated connection error".to_string()))
            }
            None => Err(Error::Api {
                status: 404,
                message: format!("no mock route for {method} {path}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn scripted_route_responds_and_records() {
        let api = MockApi::new().on(Method::Get, "clients", 200, json!({ "data": [] }));

        let response = api.get("clients", &[]).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(api.call_count(Method::Get, "clients"), 1);
        assert!(api.calls()[0].params.is_empty());
    }

    #[tokio::test]
    async fn non_2xx_becomes_api_error_with_message() {
        let api = MockApi::new().on(
            Method::Post,
            "products",
            422,
            json!({ "message": "sku already exists" }),
        );

        let err = api.post("products", &json!({})).await.unwrap_err();
        assert_eq!(err.server_message(), Some("sku already exists"));
    }

    #[tokio::test]
    async fn unmatched_request_is_a_scripting_error() {
        let api = MockApi::new();
        let err = api.get("nowhere", &[]).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn set_response_replaces_existing_route() {
        let api = MockApi::new().on(Method::Get, "clients", 200, json!({ "data": [] }));
        api.set_response(
            Method::Get,
            "clients",
            200,
            json!({ "data": [{ "id": "c-1", "name": "Acme", "email": "a@acme.com" }] }),
        );

        let response = api.get("clients", &[]).await.unwrap();
        assert_eq!(response.data["data"].as_array().unwrap().len(), 1);
    }
}
