use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderPatch, OrderStatus};
use super::error::OrderError;

/// Short order token: the first 8 hex digits of a random UUID.
pub fn next_order_id(_payload: &OrderCreate) -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

impl Entity for Order {
    type Id = String;
    type CreatePayload = OrderCreate;
    type Patch = OrderPatch;
    type Action = ();
    type ActionResult = ();
    type Error = OrderError;

    const KIND: &'static str = "order";

    fn id(&self) -> &String { &self.id }

    /// Creates a new Order from creation parameters.
    ///
    /// # Notes
    /// The order always starts out as [`OrderStatus::Pending`].
    fn from_create(id: String, params: OrderCreate) -> Result<Self, OrderError> {
        if params.quantity == 0 {
            return Err(OrderError::InvalidQuantity(0));
        }
        Ok(Self {
            id,
            name: params.name,
            address: params.address,
            location: params.location,
            product: params.product,
            quantity: params.quantity,
            total: params.total,
            status: OrderStatus::Pending,
        })
    }

    /// Updates the order status. Any status may replace any other.
    fn on_update(&mut self, patch: OrderPatch) -> Result<(), OrderError> {
        if let Some(status) = patch.status {
            self.status = status;
        }
        Ok(())
    }

    fn on_delete(&self) -> Result<(), OrderError> {
        Err(OrderError::Immutable(self.id.clone()))
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), OrderError> {
        Ok(())
    }

    fn action_mutates(_action: &()) -> bool {
        false
    }
}
