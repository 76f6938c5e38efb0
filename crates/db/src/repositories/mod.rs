use async_trait::async_trait;
use thiserror::Error;

use catalog_core::domain::product::{Product, ProductId};
use catalog_core::errors::{ApplicationError, DomainError};

pub mod memory;

pub use memory::InMemoryProductRepository;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("product `{0}` not found")]
    NotFound(ProductId),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound(id) => Self::Domain(DomainError::ProductNotFound(id)),
        }
    }
}

/// Storage for validated products. Callers validate before `add` and `update`;
/// implementations assign identifiers and never accept one from the candidate.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn add(&self, product: Product) -> Result<Product, RepositoryError>;
    async fn update(&self, id: ProductId, product: Product) -> Result<Product, RepositoryError>;
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError>;
    async fn len(&self) -> Result<usize, RepositoryError>;
}
