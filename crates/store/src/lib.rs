//! Facture Store
//!
//! The stateful heart of the dashboard runtime:
//!
//! - [`ResourceStore`]: one generic collection manager per REST endpoint,
//!   with CRUD operations, pagination metadata, and a shared loading flag.
//! - [`TransitionController`]: per-invoice deferred status transitions —
//!   "after an invoice is emailed it becomes PENDING ten seconds later,
//!   unless something else happens to it first."
//! - [`Notifier`]: the fire-and-forget user notification sink both of them
//!   report through.
//!
//! The view layer reads state snapshots (`items`, `page_info`,
//! `is_loading`, `pending_ids`) and invokes operations; it never touches
//! raw responses. Transport and session concerns live in `facture-client`.

pub mod notify;
pub mod resource;
pub mod transitions;

pub use notify::{MemoryNotifier, Notice, NoticeKind, Notifier, TracingNotifier};
pub use resource::ResourceStore;
pub use transitions::{PENDING_TRANSITION_DELAY, TransitionController, TransitionEvent};
