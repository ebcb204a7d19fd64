//! Whole-file JSON persistence for the stock and order collections.

mod error;
mod json;
mod lock;

pub use error::{StoreError, StoreResult};
pub use json::{JsonStore, Layout, MissingFile};
pub use lock::StoreLock;
