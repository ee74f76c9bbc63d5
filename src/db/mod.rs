pub mod errors;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use errors::{Result, StoreError};
pub use store::Store;
