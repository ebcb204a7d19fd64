use serde::{Deserialize, Serialize};

/// A product in the shop's stock, keyed by its unique `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub category: String,
    pub size: String,
    pub price: f64,
    pub stock: u32,
}

/// Payload for adding a new product to the stock.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub category: String,
    pub size: String,
    pub price: f64,
    pub stock: u32,
}

/// Manual admin edit of an existing product. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub category: Option<String>,
    pub size: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        size: impl Into<String>,
        price: f64,
        stock: u32,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            size: size.into(),
            price,
            stock,
        }
    }

    /// One line of the stock listing shown to customers and fed to the assistant.
    pub fn listing_line(&self, currency: &str) -> String {
        format!(
            "{} ({}, {}, {} {}, In Stock: {})",
            self.name, self.category, self.size, currency, self.price, self.stock
        )
    }
}
