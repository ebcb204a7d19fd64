//! Order-specific domain logic: creation, status changes, and the rule that
//! orders are never deleted.

pub mod entity;
pub mod error;

pub use entity::next_order_id;
pub use error::*;
