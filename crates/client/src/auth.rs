//! Authentication operations.
//!
//! Covers login, logout, and profile retrieval. Token *refresh* is handled
//! elsewhere and is not part of this layer's contract.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use facture_core::{ItemEnvelope, User};

use crate::session::{Session, SessionStore};
use crate::{Api, Error};

/// Wire shape of a successful login payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: User,
}

/// Auth operations bound to an API transport and a session store.
pub struct AuthApi {
    api: Arc<dyn Api>,
    session: Arc<dyn SessionStore>,
}

impl AuthApi {
    /// Create an auth client.
    pub fn new(api: Arc<dyn Api>, session: Arc<dyn SessionStore>) -> Self {
        Self { api, session }
    }

    /// Log in with email and password.
    ///
    /// On success the token, refresh token, and user record are persisted to
    /// the session store, so subsequent requests authenticate immediately.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, Error> {
        let body = json!({ "email": email, "password": password });
        let response = self.api.post("auth/login", &body).await?;

        let login: ItemEnvelope<LoginData> = ItemEnvelope::decode(&response.data)
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        let data = login.data;

        self.session.store_session(&Session {
            token: data.token,
            refresh_token: data.refresh_token,
            user: Some(data.user.clone()),
        });
        debug!(user = %data.user.email, "login succeeded");
        Ok(data.user)
    }

    /// Log out, clearing the local session.
    ///
    /// The server-side logout call is best-effort: the local session is
    /// cleared even when it fails.
    pub async fn logout(&self) {
        if let Err(e) = self.api.post("auth/logout", &json!({})).await {
            warn!(error = %e, "server logout failed, clearing session anyway");
        }
        self.session.clear();
    }

    /// Fetch the current user's profile.
    pub async fn profile(&self) -> Result<User, Error> {
        let response = self.api.get("auth/profile", &[]).await?;
        let envelope: ItemEnvelope<User> = ItemEnvelope::decode(&response.data)
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        Ok(envelope.data)
    }

    /// The locally persisted user, if a session exists.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }
}
