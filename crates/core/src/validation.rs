//! Admission rules a product must satisfy before the repository stores it.

use regex::Regex;
use thiserror::Error;

use crate::domain::product::Product;

pub const SKU_PATTERN: &str = "[a-z]+-[a-z]+-[a-z]+";

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("field `{field}` is required")]
    Required { field: &'static str },
    #[error("field `{field}` must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("field `{field}` must match `{pattern}`, got `{value}`")]
    PatternMismatch { field: &'static str, value: String, pattern: &'static str },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::NotPositive { field, .. }
            | Self::PatternMismatch { field, .. } => field,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProductValidator {
    sku_pattern: Regex,
}

impl ProductValidator {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self { sku_pattern: Regex::new(SKU_PATTERN)? })
    }

    /// Checks name, price and SKU in that order and stops at the first failure.
    pub fn validate(&self, product: &Product) -> Result<(), ValidationError> {
        if product.name.trim().is_empty() {
            return Err(ValidationError::Required { field: "name" });
        }

        // NaN fails this comparison as well.
        if !(product.price.is_finite() && product.price > 0.0) {
            return Err(ValidationError::NotPositive { field: "price", value: product.price });
        }

        if product.sku.is_empty() {
            return Err(ValidationError::Required { field: "sku" });
        }
        if !self.sku_matches(&product.sku) {
            return Err(ValidationError::PatternMismatch {
                field: "sku",
                value: product.sku.clone(),
                pattern: SKU_PATTERN,
            });
        }

        Ok(())
    }

    pub fn validate_candidate(&self, product: Product) -> Result<Product, ValidationError> {
        self.validate(&product)?;
        Ok(product)
    }

    /// The SKU must yield exactly one pattern match and that match must cover
    /// the whole value.
    fn sku_matches(&self, sku: &str) -> bool {
        let mut matches = self.sku_pattern.find_iter(sku);
        match (matches.next(), matches.next()) {
            (Some(only), None) => only.start() == 0 && only.end() == sku.len(),
            _ => false,
        }
    }
}
