pub mod config;
pub mod domain;
pub mod errors;
pub mod validation;

pub use domain::product::{products_to_json, DecodeError, Product, ProductId, ProductIdParseError};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use validation::{ProductValidator, ValidationError, SKU_PATTERN};
