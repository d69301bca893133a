//! Invoice records and the invoice status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Client;
use crate::entity::Entity;

/// Lifecycle status of an invoice.
///
/// The deferred-transition rule (`facture-store::TransitionController`)
/// moves an emailed invoice to [`Pending`](Self::Pending) automatically
/// unless a terminal action ([`Paid`](Self::Paid) or
/// [`Cancelled`](Self::Cancelled)) lands first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Drafted but not yet sent to the client.
    Draft,
    /// Emailed to the client; awaiting the automatic move to `Pending`.
    Sent,
    /// Awaiting payment.
    Pending,
    /// Paid in full. Terminal.
    Paid,
    /// Cancelled by the user. Terminal.
    Cancelled,
    /// Past its due date without payment.
    Overdue,
}

impl InvoiceStatus {
    /// Whether no further transitions apply.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }
}

/// One line item on an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    /// Referenced product id.
    pub product_id: String,
    /// Product name snapshot at invoicing time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Quantity invoiced.
    pub quantity: u32,
    /// Unit price at invoicing time.
    pub unit_price: f64,
    /// Line total as computed by the server.
    pub total: f64,
}

/// An invoice with embedded client and line items.
///
/// The client relationship is embedded by the server and read-only here;
/// creation payloads reference the client by `clientId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Server-issued identifier.
    pub id: String,
    /// Human-readable invoice number, e.g. `"INV-1"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Current lifecycle status.
    pub status: InvoiceStatus,
    /// Embedded client, when the server expands it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
    /// Line items.
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    /// Invoice total as computed by the server.
    pub total: f64,
    /// Issue date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    /// Payment due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
}

impl Entity for Invoice {
    const ENDPOINT: &'static str = "invoices";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_screaming_snake_wire_names() {
        assert_eq!(
            serde_json::to_value(InvoiceStatus::Pending).unwrap(),
            serde_json::json!("PENDING")
        );
        let status: InvoiceStatus = serde_json::from_value(serde_json::json!("CANCELLED")).unwrap();
        assert_eq!(status, InvoiceStatus::Cancelled);
    }

    #[test]
    fn terminal_statuses() {
        assert!(InvoiceStatus::Paid.is_terminal());
        assert!(InvoiceStatus::Cancelled.is_terminal());
        assert!(!InvoiceStatus::Sent.is_terminal());
        assert!(!InvoiceStatus::Pending.is_terminal());
    }

    #[test]
    fn invoice_tolerates_missing_optional_fields() {
        let raw = serde_json::json!({
            "id": "inv-1",
            "status": "DRAFT",
            "total": 120.0
        });
        let invoice: Invoice = serde_json::from_value(raw).unwrap();
        assert!(invoice.items.is_empty());
        assert!(invoice.client.is_none());
    }
}
