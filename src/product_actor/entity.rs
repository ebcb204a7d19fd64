use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch};
use super::actions::{ProductAction, ProductActionResult, Reservation};
use super::error::ProductError;

fn validate_price(price: f64) -> Result<f64, ProductError> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(ProductError::InvalidPrice(price))
    }
}

impl Entity for Product {
    type Id = String;
    type CreatePayload = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    const KIND: &'static str = "product";

    /// Products are keyed by name.
    fn id(&self) -> &String { &self.name }

    fn from_create(name: String, params: ProductCreate) -> Result<Self, ProductError> {
        Ok(Self {
            name,
            category: params.category,
            size: params.size,
            price: validate_price(params.price)?,
            stock: params.stock,
        })
    }

    /// Applies a manual admin edit. The stock level is set directly, not adjusted.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        if let Some(price) = patch.price {
            self.price = validate_price(price)?;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        Ok(())
    }

    /// Handles product-specific actions.
    ///
    /// # Actions
    /// - `CheckStock`: Returns the current stock level
    /// - `ReserveStock(amount)`: Decrements stock and reports the unit price
    /// - `ReleaseStock(amount)`: Increments stock
    ///
    /// # Errors
    /// Reserving more than is available, or zero units, fails and leaves
    /// the product unchanged.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.stock)),
            ProductAction::ReserveStock(0) | ProductAction::ReleaseStock(0) => {
                Err(ProductError::InvalidQuantity(0))
            }
            ProductAction::ReserveStock(amount) => {
                if self.stock < amount {
                    return Err(ProductError::InsufficientStock {
                        requested: amount,
                        available: self.stock,
                    });
                }
                self.stock -= amount;
                Ok(ProductActionResult::ReserveStock(Reservation {
                    unit_price: self.price,
                    remaining: self.stock,
                }))
            }
            ProductAction::ReleaseStock(amount) => {
                self.stock = self
                    .stock
                    .checked_add(amount)
                    .ok_or(ProductError::InvalidQuantity(amount))?;
                Ok(ProductActionResult::ReleaseStock(self.stock))
            }
        }
    }

    fn action_mutates(action: &ProductAction) -> bool {
        !matches!(action, ProductAction::CheckStock)
    }
}
