//! Typed handles over the resource actors.

#[macro_use]
mod macros;

mod order_client;
mod product_client;

pub use order_client::{OrderClient, Placement};
pub use product_client::ProductClient;
