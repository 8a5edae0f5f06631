pub mod config;
pub mod domain;
pub mod errors;

pub use domain::product::{Lifecycle, NewProduct, Product, ProductCode, ProductId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
