//! Deferred invoice status transitions.
//!
//! Lifecycle rule: once an invoice is emailed it becomes `PENDING` ten
//! seconds later, unless a terminal action (mark paid, cancel) lands on the
//! same invoice first. Timers are keyed per invoice id and fully
//! independent; tearing the controller down cancels everything so no write
//! fires after the owning view is gone.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use facture_client::{Api, Error};
use facture_core::{Invoice, InvoiceStatus, MutationEnvelope};

use crate::notify::Notifier;

/// Delay between a successful send and the automatic move to `PENDING`.
///
/// Fixed by the invoice lifecycle rule; not user-tunable.
pub const PENDING_TRANSITION_DELAY: Duration = Duration::from_secs(10);

/// Events emitted to the owning view so it can refresh its list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent {
    /// The deferred `PENDING` transition fired for this invoice (whether or
    /// not the server accepted it — the refresh shows the truth either way).
    AutoPending {
        /// Affected invoice id.
        invoice_id: String,
    },
    /// A user-confirmed terminal transition was applied.
    StatusChanged {
        /// Affected invoice id.
        invoice_id: String,
        /// The status that was applied.
        status: InvoiceStatus,
    },
}

struct PendingEntry {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Per-invoice deferred transition state machine.
///
/// Each invoice id is either idle (no entry in the map) or awaiting its
/// `PENDING` transition (a one-shot timer task). At most one timer exists
/// per id; scheduling a new one replaces — and aborts — the old one.
pub struct TransitionController {
    api: Arc<dyn Api>,
    notifier: Arc<dyn Notifier>,
    pending: Arc<Mutex<HashMap<String, PendingEntry>>>,
    generation: AtomicU64,
    events: Option<mpsc::Sender<TransitionEvent>>,
}

impl TransitionController {
    /// Create a controller with no event channel.
    pub fn new(api: Arc<dyn Api>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
            events: None,
        }
    }

    /// Attach a channel that receives a [`TransitionEvent`] whenever the
    /// list should be refreshed.
    #[must_use]
    pub fn with_events(mut self, tx: mpsc::Sender<TransitionEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Email an invoice to its client, then schedule the deferred `PENDING`
    /// transition.
    ///
    /// If the send request fails, no timer starts and the error is surfaced
    /// and re-raised. On success the timer for this id replaces any earlier
    /// one.
    pub async fn send_email(&self, invoice_id: &str) -> Result<(), Error> {
        let path = format!("invoices/{invoice_id}/send-email");
        match self.api.post(&path, &json!({})).await {
            Ok(response) => {
                let message = response
                    .data
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("Invoice sent");
                self.notifier.success(message);
                self.schedule_pending(invoice_id);
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .error(e.server_message().unwrap_or("Failed to send invoice"));
                Err(e)
            }
        }
    }

    /// Mark an invoice paid, cancelling its pending timer first.
    pub async fn mark_paid(&self, invoice_id: &str) -> Result<Invoice, Error> {
        self.apply_terminal(invoice_id, InvoiceStatus::Paid, "Invoice marked as paid")
            .await
    }

    /// Cancel an invoice, cancelling its pending timer first.
    pub async fn cancel_invoice(&self, invoice_id: &str) -> Result<Invoice, Error> {
        self.apply_terminal(invoice_id, InvoiceStatus::Cancelled, "Invoice cancelled")
            .await
    }

    /// Whether an invoice is awaiting its deferred `PENDING` transition.
    #[must_use]
    pub fn is_pending(&self, invoice_id: &str) -> bool {
        self.pending.lock().contains_key(invoice_id)
    }

    /// Ids of all invoices with a timer running.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<String> {
        self.pending.lock().keys().cloned().collect()
    }

    /// Cancel every outstanding timer without firing it.
    ///
    /// Called on view teardown; also runs on drop.
    pub fn shutdown(&self) {
        let mut pending = self.pending.lock();
        for (_, entry) in pending.drain() {
            entry.handle.abort();
        }
    }

    fn schedule_pending(&self, invoice_id: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let api = Arc::clone(&self.api);
        let pending = Arc::clone(&self.pending);
        let events = self.events.clone();
        let id = invoice_id.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(PENDING_TRANSITION_DELAY).await;

            let body = json!({ "status": InvoiceStatus::Pending });
            if let Err(e) = api.patch(&format!("invoices/{id}/status"), &body).await {
                // Expected when the status changed under us before the timer
                // fired; the refresh below shows the real state.
                debug!(invoice = %id, error = %e, "deferred PENDING transition rejected");
            }

            {
                let mut pending = pending.lock();
                // A replacement timer may have been scheduled while the
                // PATCH was in flight; only remove our own entry.
                if pending.get(&id).is_some_and(|e| e.generation == generation) {
                    pending.remove(&id);
                }
            }

            if let Some(tx) = events {
                let _ = tx.send(TransitionEvent::AutoPending { invoice_id: id }).await;
            }
        });

        let mut pending = self.pending.lock();
        if let Some(prev) = pending.insert(
            invoice_id.to_string(),
            PendingEntry { generation, handle },
        ) {
            prev.handle.abort();
        }
    }

    fn cancel_pending(&self, invoice_id: &str) {
        if let Some(entry) = self.pending.lock().remove(invoice_id) {
            entry.handle.abort();
            debug!(invoice = %invoice_id, "pending transition cancelled");
        }
    }

    async fn apply_terminal(
        &self,
        invoice_id: &str,
        status: InvoiceStatus,
        success_fallback: &str,
    ) -> Result<Invoice, Error> {
        // Cancel before sending so the deferred PATCH can never race the
        // terminal one into an inconsistent final status.
        self.cancel_pending(invoice_id);

        let result: Result<MutationEnvelope<Invoice>, Error> = async {
            let body = json!({ "status": status });
            let response = self
                .api
                .patch(&format!("invoices/{invoice_id}/status"), &body)
                .await?;
            MutationEnvelope::decode(&response.data)
                .map_err(|e| Error::Deserialization(e.to_string()))
        }
        .await;

        match result {
            Ok(envelope) => {
                self.notifier
                    .success(envelope.message.as_deref().unwrap_or(success_fallback));
                if let Some(tx) = &self.events {
                    let _ = tx
                        .send(TransitionEvent::StatusChanged {
                            invoice_id: invoice_id.to_string(),
                            status,
                        })
                        .await;
                }
                Ok(envelope.data)
            }
            Err(e) => {
                self.notifier
                    .error(e.server_message().unwrap_or("Failed to update invoice"));
                Err(e)
            }
        }
    }
}

impl Drop for TransitionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
