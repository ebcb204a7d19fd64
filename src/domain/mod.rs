pub mod product;
pub mod order;

pub use product::*;
pub use order::*;
