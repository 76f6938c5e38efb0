use std::sync::Arc;

use axum::Router;
use catalog_core::config::{AppConfig, ConfigError, LoadOptions};
use catalog_core::ProductValidator;
use catalog_db::{
    seeded_repository, verify_seed_products, InMemoryProductRepository, ProductRepository,
};
use thiserror::Error;
use tracing::info;

use crate::{health, products};
use crate::products::CatalogState;

pub struct Application {
    pub config: AppConfig,
    pub state: CatalogState,
}

impl Application {
    pub fn router(&self) -> Router {
        products::router(self.state.clone())
            .merge(health::router(Arc::clone(&self.state.repository)))
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("sku validator could not be built: {0}")]
    Validator(#[from] regex::Error),
    #[error("seed products failed validation: {0}")]
    InvalidSeed(String),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let validator = ProductValidator::new()?;

    let repository: Arc<dyn ProductRepository> = if config.catalog.seed_products {
        let verification = verify_seed_products(&validator);
        if !verification.passed() {
            let failures = verification
                .failures
                .iter()
                .map(|(id, error)| format!("{id}: {error}"))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(BootstrapError::InvalidSeed(failures));
        }
        Arc::new(seeded_repository())
    } else {
        Arc::new(InMemoryProductRepository::default())
    };

    info!(
        event_name = "system.bootstrap.catalog_ready",
        correlation_id = "bootstrap",
        seeded = config.catalog.seed_products,
        "product catalog initialized"
    );

    Ok(Application { config, state: CatalogState { repository, validator: Arc::new(validator) } })
}
