use serde::Serialize;
use serde::de::DeserializeOwned;

/// A uniquely-identified domain record exposed by the remote API.
///
/// Implementations bind a concrete type to the REST collection it lives
/// under; `facture-store` builds one collection manager per binding.
/// Relationships embedded by the server (e.g. an invoice's client) are
/// plain nested fields and read-only from this layer's perspective.
pub trait Entity: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Path segment of the REST collection, e.g. `"clients"`.
    const ENDPOINT: &'static str;

    /// Server-issued unique identifier.
    fn id(&self) -> &str;
}
