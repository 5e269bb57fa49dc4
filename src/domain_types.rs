pub mod order;
pub mod types;

pub use order::Order;
pub use types::{DomainError, FieldName};
