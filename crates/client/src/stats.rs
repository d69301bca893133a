//! Dashboard stats query.

use std::sync::Arc;

use facture_core::{DashboardStats, ItemEnvelope};

use crate::{Api, Error};

/// Read-only access to the server-computed dashboard summary.
pub struct StatsApi {
    api: Arc<dyn Api>,
}

impl StatsApi {
    /// Create a stats client.
    pub fn new(api: Arc<dyn Api>) -> Self {
        Self { api }
    }

    /// Fetch the dashboard summary.
    pub async fn summary(&self) -> Result<DashboardStats, Error> {
        let response = self.api.get("stats", &[]).await?;
        let envelope: ItemEnvelope<DashboardStats> = ItemEnvelope::decode(&response.data)
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockApi;
    use crate::Method;
    use serde_json::json;

    #[tokio::test]
    async fn summary_decodes_stats_envelope() {
        let api = Arc::new(MockApi::new().on(
            Method::Get,
            "stats",
            200,
            json!({ "data": {
                "totalClients": 4,
                "totalProducts": 12,
                "totalInvoices": 25,
                "pendingInvoices": 7,
                "totalRevenue": 1500.5
            }}),
        ));
        let stats = StatsApi::new(api).summary().await.unwrap();
        assert_eq!(stats.total_invoices, 25);
    }

    #[tokio::test]
    async fn summary_surfaces_malformed_envelope() {
        let api = Arc::new(MockApi::new().on(Method::Get, "stats", 200, json!({ "totals": {} })));
        let err = StatsApi::new(api).summary().await.unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }
}
