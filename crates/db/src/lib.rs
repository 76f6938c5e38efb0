pub mod fixtures;
pub mod repositories;

pub use fixtures::{seed_products, seeded_repository, verify_seed_products, SeedVerification};
pub use repositories::{InMemoryProductRepository, ProductRepository, RepositoryError};
