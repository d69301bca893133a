//! Generic REST collection manager.
//!
//! One [`ResourceStore`] per endpoint binding. Reads fail silently from the
//! caller's point of view (state reset, one error notification); writes
//! notify *and* re-raise so form layers can branch on the failure. That
//! asymmetry is contractual — do not unify the two paths.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use facture_client::{Api, Error};
use facture_core::{Entity, ItemEnvelope, ListEnvelope, ListQuery, MutationEnvelope, PageInfo};

use crate::notify::Notifier;

/// Sets the shared loading flag for the lifetime of one operation.
///
/// Dropping the guard releases the flag on every exit path, including early
/// returns through `?`. Deliberately not a mutex: overlapping operations
/// each hold a guard and the flag clears when the first of them finishes.
/// Callers that need serialization gate on [`ResourceStore::is_loading`]
/// themselves.
#[derive(Debug)]
struct LoadingGuard {
    flag: Arc<AtomicBool>,
}

impl LoadingGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self {
            flag: Arc::clone(flag),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Collection state and CRUD operations for one REST resource.
///
/// Owns the ordered entity sequence, pagination metadata, a separate
/// single-entity detail slot, and the loading flag. All snapshot accessors
/// return clones; the view layer re-reads after each operation completes.
///
/// No ordering is guaranteed across overlapping [`list_all`] calls: the
/// last response to arrive wins, even if it belongs to an earlier request.
/// Search-as-you-type callers rely on this staying cheap and unserialized.
///
/// [`list_all`]: ResourceStore::list_all
pub struct ResourceStore<T: Entity> {
    api: Arc<dyn Api>,
    notifier: Arc<dyn Notifier>,
    endpoint: String,
    items: RwLock<Vec<T>>,
    page_info: RwLock<Option<PageInfo>>,
    current: RwLock<Option<T>>,
    last_query: RwLock<Option<ListQuery>>,
    loading: Arc<AtomicBool>,
}

impl<T: Entity> ResourceStore<T> {
    /// Create a store bound to `T`'s endpoint.
    pub fn new(api: Arc<dyn Api>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            endpoint: T::ENDPOINT.to_string(),
            items: RwLock::new(Vec::new()),
            page_info: RwLock::new(None),
            current: RwLock::new(None),
            last_query: RwLock::new(None),
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The endpoint this store is bound to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Snapshot of the collection.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// Pagination metadata from the most recent list fetch, if the endpoint
    /// paginates.
    #[must_use]
    pub fn page_info(&self) -> Option<PageInfo> {
        *self.page_info.read()
    }

    /// The entity most recently fetched with [`get_one`](Self::get_one).
    #[must_use]
    pub fn current(&self) -> Option<T> {
        self.current.read().clone()
    }

    /// Whether any operation on this store is in flight.
    ///
    /// One flag for all five operations; the view layer disables
    /// repeat-submit affordances while it is set.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Fetch the collection, replacing state wholesale.
    ///
    /// Returns the fetched sequence, or `None` on failure — callers must
    /// treat `None` (fetch failed, state reset) differently from
    /// `Some(vec![])` (endpoint is genuinely empty). Failures reset the
    /// collection to empty and the page info to `None`, surface one error
    /// notification, and never raise.
    pub async fn list_all(&self, query: &ListQuery) -> Option<Vec<T>> {
        let _guard = LoadingGuard::acquire(&self.loading);
        *self.last_query.write() = Some(query.clone());

        match self.fetch_list(query).await {
            Ok((items, info)) => {
                *self.items.write() = items.clone();
                *self.page_info.write() = info;
                Some(items)
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "list fetch failed");
                self.items.write().clear();
                *self.page_info.write() = None;
                self.notifier
                    .error(&format!("Failed to load {}", self.endpoint));
                None
            }
        }
    }

    /// Re-issue the most recent list query (or an empty one if none yet).
    pub async fn refresh(&self) -> Option<Vec<T>> {
        let query = self.last_query.read().clone().unwrap_or_default();
        self.list_all(&query).await
    }

    /// Fetch one entity into the detail slot.
    ///
    /// The slot is distinct from the collection, so loading a detail view
    /// never corrupts an in-progress list. Same silent-fail policy as
    /// [`list_all`](Self::list_all).
    pub async fn get_one(&self, id: &str) -> Option<T> {
        let _guard = LoadingGuard::acquire(&self.loading);

        let result: Result<T, Error> = async {
            let response = self
                .api
                .get(&format!("{}/{id}", self.endpoint), &[])
                .await?;
            let envelope: ItemEnvelope<T> = ItemEnvelope::decode(&response.data)
                .map_err(|e| Error::Deserialization(e.to_string()))?;
            Ok(envelope.data)
        }
        .await;

        match result {
            Ok(entity) => {
                *self.current.write() = Some(entity.clone());
                Some(entity)
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, id, error = %e, "detail fetch failed");
                self.notifier
                    .error(&format!("Failed to load {}", self.endpoint));
                None
            }
        }
    }

    /// Create an entity; prepends the server's record to the collection.
    ///
    /// On failure the server message (generic fallback) is surfaced as a
    /// notification *and* the error is re-raised so the caller's form layer
    /// can attach field-level errors.
    pub async fn create<P: Serialize + Sync>(&self, payload: &P) -> Result<T, Error> {
        let _guard = LoadingGuard::acquire(&self.loading);

        let result: Result<MutationEnvelope<T>, Error> = async {
            let body = to_body(payload)?;
            let response = self.api.post(&self.endpoint, &body).await?;
            MutationEnvelope::decode(&response.data)
                .map_err(|e| Error::Deserialization(e.to_string()))
        }
        .await;

        match result {
            Ok(envelope) => {
                let entity = envelope.data;
                let mut items = self.items.write();
                // The server must not hand back an id we already hold, but a
                // duplicate would violate the collection invariant, so drop
                // any stale copy before prepending.
                items.retain(|e| e.id() != entity.id());
                items.insert(0, entity.clone());
                drop(items);
                self.notifier
                    .success(envelope.message.as_deref().unwrap_or("Created"));
                Ok(entity)
            }
            Err(e) => {
                self.notifier
                    .error(e.server_message().unwrap_or("Failed to create"));
                Err(e)
            }
        }
    }

    /// Update an entity in place, preserving its position in the collection.
    ///
    /// Same raise-on-failure policy as [`create`](Self::create).
    pub async fn update<P: Serialize + Sync>(&self, id: &str, payload: &P) -> Result<T, Error> {
        let _guard = LoadingGuard::acquire(&self.loading);

        let result: Result<MutationEnvelope<T>, Error> = async {
            let body = to_body(payload)?;
            let response = self
                .api
                .put(&format!("{}/{id}", self.endpoint), &body)
                .await?;
            MutationEnvelope::decode(&response.data)
                .map_err(|e| Error::Deserialization(e.to_string()))
        }
        .await;

        match result {
            Ok(envelope) => {
                let entity = envelope.data;
                {
                    let mut items = self.items.write();
                    if let Some(slot) = items.iter_mut().find(|e| e.id() == id) {
                        *slot = entity.clone();
                    }
                }
                self.notifier
                    .success(envelope.message.as_deref().unwrap_or("Updated"));
                Ok(entity)
            }
            Err(e) => {
                self.notifier
                    .error(e.server_message().unwrap_or("Failed to update"));
                Err(e)
            }
        }
    }

    /// Delete an entity and drop it from the collection.
    ///
    /// Same raise-on-failure policy as [`create`](Self::create). A delete
    /// the server accepts for an id we no longer hold leaves the collection
    /// untouched and still succeeds.
    pub async fn remove(&self, id: &str) -> Result<(), Error> {
        let _guard = LoadingGuard::acquire(&self.loading);

        match self.api.delete(&format!("{}/{id}", self.endpoint)).await {
            Ok(response) => {
                self.items.write().retain(|e| e.id() != id);
                let message = response
                    .data
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Deleted");
                self.notifier.success(message);
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .error(e.server_message().unwrap_or("Failed to delete"));
                Err(e)
            }
        }
    }

    async fn fetch_list(&self, query: &ListQuery) -> Result<(Vec<T>, Option<PageInfo>), Error> {
        let response = self.api.get(&self.endpoint, &query.to_params()).await?;
        let envelope: ListEnvelope<T> = ListEnvelope::decode(&response.data)
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        let (items, info) = envelope.into_parts();
        debug!(
            endpoint = %self.endpoint,
            count = items.len(),
            paginated = info.is_some(),
            "list fetched"
        );
        Ok((items, info))
    }
}

fn to_body<P: Serialize>(payload: &P) -> Result<Value, Error> {
    serde_json::to_value(payload).map_err(|e| Error::Deserialization(e.to_string()))
}
