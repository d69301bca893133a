//! Facture Core
//!
//! Domain types shared across the Facture client runtime: the entities
//! exposed by the invoice-management API, the list-query builder, and the
//! response envelope decoder that normalizes the server's wrapper shapes
//! into one local representation.
//!
//! This crate performs no I/O. The transport lives in `facture-client`; the
//! stateful collection and transition layers live in `facture-store`.

pub mod domain;
pub mod entity;
pub mod envelope;
pub mod invoice;
pub mod query;
pub mod stats;

pub use domain::{Category, Client, Product, User};
pub use entity::Entity;
pub use envelope::{EnvelopeError, ItemEnvelope, ListEnvelope, MutationEnvelope, PageInfo};
pub use invoice::{Invoice, InvoiceItem, InvoiceStatus};
pub use query::ListQuery;
pub use stats::DashboardStats;
