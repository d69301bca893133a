//! Client, category, product, and user records as served by the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// A billable client (customer) record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Server-issued identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Optional phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Optional postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Client {
    const ENDPOINT: &'static str = "clients";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Server-issued identifier.
    pub id: String,
    /// Category name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Entity for Category {
    const ENDPOINT: &'static str = "categories";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A sellable product.
///
/// The owning category is embedded by the server as a nested object and is
/// read-only here; writes go through `categoryId` in mutation payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Server-issued identifier.
    pub id: String,
    /// Product name.
    pub name: String,
    /// Optional stock-keeping unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Unit price.
    pub price: f64,
    /// Optional long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Embedded category, when the server expands it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Entity for Product {
    const ENDPOINT: &'static str = "products";

    fn id(&self) -> &str {
        &self.id
    }
}

/// An authenticated dashboard user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-issued identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Optional role label (e.g. `"admin"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Entity for User {
    const ENDPOINT: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_roundtrips_camel_case() {
        let raw = serde_json::json!({
            "id": "cl-1",
            "name": "Acme",
            "email": "a@acme.com",
            "createdAt": "2026-01-15T10:00:00Z"
        });
        let client: Client = serde_json::from_value(raw).unwrap();
        assert_eq!(client.id(), "cl-1");
        assert!(client.phone.is_none());

        let back = serde_json::to_value(&client).unwrap();
        assert!(back.get("createdAt").is_some());
        assert!(back.get("phone").is_none(), "unset options are omitted");
    }

    #[test]
    fn product_embeds_category() {
        let raw = serde_json::json!({
            "id": "p-1",
            "name": "Widget",
            "price": 9.5,
            "category": { "id": "cat-1", "name": "Hardware" }
        });
        let product: Product = serde_json::from_value(raw).unwrap();
        assert_eq!(product.category.as_ref().unwrap().name, "Hardware");
    }
}
