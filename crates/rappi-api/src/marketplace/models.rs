// Marketplace wire types.
//
// Pass-through DTOs: every field is optional or defaulted so a payload that
// omits it still decodes. Field casing follows the wire (camelCase on
// orders and customers, snake_case on items and addresses).

use serde::{Deserialize, Serialize};

/// One pending order as returned by `GET /orders`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order: Order,
    #[serde(default)]
    pub client: Option<Customer>,
    #[serde(default)]
    pub store: Option<Store>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub total_value: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub tip: Option<f64>,
    #[serde(default)]
    pub whims: Option<f64>,
    #[serde(default)]
    pub total_products: Option<f64>,
    #[serde(default)]
    pub total_rappi_pay: Option<f64>,
    #[serde(default)]
    pub total_order_value: Option<f64>,
    #[serde(default)]
    pub delivery_method: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Unit price as sent by the marketplace (a decimal string).
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub toppings: Vec<serde_json::Value>,
    #[serde(default)]
    pub units: u32,
    #[serde(default)]
    pub percentage_price_variation: Option<f64>,
    #[serde(default)]
    pub price_discount: Option<f64>,
    #[serde(default)]
    pub discount_percentage_by_rappi: Option<f64>,
}

/// The end customer who placed the order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address_details: Option<AddressDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressDetails {
    #[serde(default)]
    pub main_street_type: Option<String>,
    #[serde(default)]
    pub main_street_number: Option<String>,
    #[serde(default)]
    pub main_street_quadrant: Option<String>,
    #[serde(default)]
    pub secondary_street_number: Option<String>,
    #[serde(default)]
    pub meter: Option<String>,
    #[serde(default)]
    pub secondary_street_quadrant: Option<String>,
    #[serde(default)]
    pub complete_direction: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// An order the customer or the marketplace cancelled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledOrderSummary {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub cancel_reason: Option<String>,
}

/// Business error returned with HTTP 400 by take/reject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderError {
    #[serde(default)]
    pub error_code: i32,
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /orders/reject`.
#[derive(Debug, Clone, Serialize)]
pub struct RejectOrderRequest<'a> {
    pub order_id: &'a str,
    pub reason: &'a str,
}

/// Body of `POST /login`.
#[derive(Serialize)]
pub(crate) struct SeedTokenLogin<'a> {
    pub token: &'a str,
}

impl Order {
    /// Total number of units across all line items.
    pub fn unit_count(&self) -> u32 {
        self.items
            .iter()
            .map(|item| item.units)
            .fold(0, u32::saturating_add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unit_count_saturates() {
        let order = Order {
            items: vec![
                OrderItem {
                    units: u32::MAX,
                    ..OrderItem::default()
                },
                OrderItem {
                    units: 2,
                    ..OrderItem::default()
                },
            ],
            ..Order::default()
        };
        assert_eq!(order.unit_count(), u32::MAX);
    }

    #[test]
    fn minimal_order_decodes() {
        let summary: OrderSummary =
            serde_json::from_value(json!({ "order": { "id": "42", "items": [] } })).unwrap();
        assert_eq!(summary.order.id, "42");
        assert!(summary.order.items.is_empty());
        assert!(summary.client.is_none());
        assert!(summary.store.is_none());
    }

    #[test]
    fn full_order_decodes_wire_casing() {
        let summary: OrderSummary = serde_json::from_value(json!({
            "order": {
                "id": "7",
                "totalValue": 25.5,
                "createdAt": "2024-05-01 12:00:00",
                "paymentMethod": "cash",
                "deliveryMethod": "delivery",
                "items": [{
                    "sku": "B-1",
                    "name": "Burger",
                    "price": "12.75",
                    "type": "product",
                    "units": 2,
                    "toppings": [{ "name": "cheese" }],
                    "price_discount": 0.0
                }]
            },
            "client": {
                "firstName": "Ana",
                "lastName": "Gómez",
                "addressDetails": { "city": "Bogotá", "postal_code": "110111" }
            },
            "store": { "id": "900", "name": "Downtown" }
        }))
        .unwrap();

        let order = &summary.order;
        assert_eq!(order.total_value, Some(25.5));
        assert_eq!(order.payment_method.as_deref(), Some("cash"));
        assert_eq!(order.items[0].item_type.as_deref(), Some("product"));
        assert_eq!(order.items[0].toppings.len(), 1);
        assert_eq!(order.unit_count(), 2);

        let client = summary.client.unwrap();
        assert_eq!(client.first_name.as_deref(), Some("Ana"));
        assert_eq!(
            client.address_details.unwrap().postal_code.as_deref(),
            Some("110111")
        );
        assert_eq!(summary.store.unwrap().name.as_deref(), Some("Downtown"));
    }

    #[test]
    fn reject_request_uses_snake_case() {
        let body = serde_json::to_value(RejectOrderRequest {
            order_id: "42",
            reason: "closed",
        })
        .unwrap();
        assert_eq!(body, json!({ "order_id": "42", "reason": "closed" }));
    }
}
