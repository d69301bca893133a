//! Response envelope decoding.
//!
//! The remote API wraps entity data in one of several wrapper shapes:
//!
//! ```text
//! Unpaginated:        { data: Entity[] }
//! Paginated (nested): { data: { data: Entity[], meta: { total, totalPages, page } } }
//! Paginated (flat):   { data: Entity[], meta: { total, totalPages, page } }
//! Single entity:      { data: Entity }
//! Mutation result:    { message: string, data: Entity }
//! ```
//!
//! All shape sniffing happens here, once, at the boundary. Callers receive
//! a tagged [`ListEnvelope`] and never inspect raw JSON themselves.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while decoding a response envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The response matched none of the known wrapper shapes.
    #[error("response envelope shape not recognized")]
    UnknownShape,

    /// The wrapper was recognized but the entity payload failed to decode.
    #[error("entity payload decode failed: {0}")]
    Entity(#[source] serde_json::Error),
}

/// Pagination metadata derived from the server envelope.
///
/// Replaced wholesale on every list fetch, never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Total number of pages.
    pub total_pages: u32,
    /// The page this response covers (1-based).
    pub current_page: u32,
}

/// Wire shape of the server's pagination block.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerMeta {
    total: u64,
    total_pages: u32,
    page: u32,
}

impl From<ServerMeta> for PageInfo {
    fn from(meta: ServerMeta) -> Self {
        Self {
            total_items: meta.total,
            total_pages: meta.total_pages,
            current_page: meta.page,
        }
    }
}

/// A decoded list response: either a bare collection or a page of one.
#[derive(Debug, Clone)]
pub enum ListEnvelope<T> {
    /// The endpoint returned the whole collection with no pagination block.
    Unpaginated(Vec<T>),
    /// The endpoint returned one page plus pagination metadata.
    Paginated(Vec<T>, PageInfo),
}

impl<T: DeserializeOwned> ListEnvelope<T> {
    /// Decode a raw list response body.
    ///
    /// Accepts the nested, flat, and unpaginated wrapper shapes and
    /// normalizes them: equivalent entity arrays decode identically
    /// regardless of which wrapper carried them.
    pub fn decode(raw: &Value) -> Result<Self, EnvelopeError> {
        let data = raw.get("data").ok_or(EnvelopeError::UnknownShape)?;

        // Nested shape: { data: { data: [...], meta: {...} } }
        if let Some(inner) = data.get("data") {
            let items = decode_items(inner)?;
            return Ok(match decode_meta(data.get("meta")) {
                Some(meta) => Self::Paginated(items, meta.into()),
                None => Self::Unpaginated(items),
            });
        }

        // Flat / unpaginated shape: { data: [...], meta?: {...} }
        if data.is_array() {
            let items = decode_items(data)?;
            return Ok(match decode_meta(raw.get("meta")) {
                Some(meta) => Self::Paginated(items, meta.into()),
                None => Self::Unpaginated(items),
            });
        }

        Err(EnvelopeError::UnknownShape)
    }

    /// Split into the entity sequence and optional pagination metadata.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, Option<PageInfo>) {
        match self {
            Self::Unpaginated(items) => (items, None),
            Self::Paginated(items, info) => (items, Some(info)),
        }
    }
}

fn decode_items<T: DeserializeOwned>(value: &Value) -> Result<Vec<T>, EnvelopeError> {
    if !value.is_array() {
        return Err(EnvelopeError::UnknownShape);
    }
    serde_json::from_value(value.clone()).map_err(EnvelopeError::Entity)
}

fn decode_meta(value: Option<&Value>) -> Option<ServerMeta> {
    value.and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// A decoded single-entity response: `{ data: Entity }`.
#[derive(Debug, Clone)]
pub struct ItemEnvelope<T> {
    /// The wrapped entity.
    pub data: T,
}

impl<T: DeserializeOwned> ItemEnvelope<T> {
    /// Decode a raw single-entity response body.
    pub fn decode(raw: &Value) -> Result<Self, EnvelopeError> {
        let data = raw.get("data").ok_or(EnvelopeError::UnknownShape)?;
        let data = serde_json::from_value(data.clone()).map_err(EnvelopeError::Entity)?;
        Ok(Self { data })
    }
}

/// A decoded mutation response: `{ message: string, data: Entity }`.
#[derive(Debug, Clone)]
pub struct MutationEnvelope<T> {
    /// Server-provided confirmation message, when present.
    pub message: Option<String>,
    /// The created or updated entity.
    pub data: T,
}

impl<T: DeserializeOwned> MutationEnvelope<T> {
    /// Decode a raw mutation response body.
    pub fn decode(raw: &Value) -> Result<Self, EnvelopeError> {
        let data = raw.get("data").ok_or(EnvelopeError::UnknownShape)?;
        let data = serde_json::from_value(data.clone()).map_err(EnvelopeError::Entity)?;
        let message = raw
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        Ok(Self { message, data })
    }
}
