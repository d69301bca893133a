//! Dashboard summary figures.

use serde::{Deserialize, Serialize};

/// Aggregate figures for the stats dashboard, computed server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Total number of clients.
    pub total_clients: u64,
    /// Total number of products.
    pub total_products: u64,
    /// Total number of invoices across all statuses.
    pub total_invoices: u64,
    /// Invoices currently awaiting payment.
    pub pending_invoices: u64,
    /// Invoices past due.
    #[serde(default)]
    pub overdue_invoices: u64,
    /// Revenue from paid invoices.
    pub total_revenue: f64,
    /// Outstanding amount on pending and overdue invoices.
    #[serde(default)]
    pub outstanding_amount: f64,
}
