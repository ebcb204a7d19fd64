use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fulfilment state of an order. Any state may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let allowed: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
                format!("unknown status `{}` (expected one of: {})", s, allowed.join(", "))
            })
    }
}

/// Represents a customer order.
///
/// `total` is fixed at placement time and never recomputed from the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub location: Option<String>,
    pub product: String,
    pub quantity: u32,
    pub total: f64,
    pub status: OrderStatus,
}

/// Payload for creating a new order. The ID is assigned by the order actor.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub name: String,
    pub address: String,
    pub location: Option<String>,
    pub product: String,
    pub quantity: u32,
    pub total: f64,
}

/// Admin edit of an existing order.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
}

/// Customer input for placing an order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub name: String,
    pub address: String,
    pub location: Option<String>,
    pub product: String,
    pub quantity: u32,
}

// Older order files store a blank string when no location pin was given.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
