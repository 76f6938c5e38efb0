use catalog_core::config::{AppConfig, LoadOptions};
use catalog_core::{products_to_json, ProductValidator};
use catalog_db::{seed_products, verify_seed_products};

use crate::commands::CommandResult;

pub fn run(dump: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let validator = match ProductValidator::new() {
        Ok(validator) => validator,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "validator_init",
                format!("sku validator could not be built: {error}"),
                3,
            );
        }
    };

    let verification = verify_seed_products(&validator);
    if !verification.passed() {
        let failures = verification
            .failures
            .iter()
            .map(|(id, error)| format!("{id}: {error}"))
            .collect::<Vec<_>>()
            .join("; ");
        return CommandResult::failure(
            "seed",
            "seed_validation",
            format!("seed products failed validation: {failures}"),
            4,
        );
    }

    let products = seed_products();

    if dump {
        return match products_to_json(&products) {
            Ok(bytes) => CommandResult {
                exit_code: 0,
                output: String::from_utf8_lossy(&bytes).into_owned(),
            },
            Err(error) => CommandResult::failure(
                "seed",
                "serialization",
                format!("seed products could not be encoded: {error}"),
                5,
            ),
        };
    }

    let mut lines = vec![format!(
        "{} seed products validated (seeding {} at startup):",
        products.len(),
        if config.catalog.seed_products { "enabled" } else { "disabled" }
    )];
    lines.extend(products.iter().map(|product| {
        format!("  - {}: {} ({}) {:.2}", product.id, product.name, product.sku, product.price)
    }));

    CommandResult::success("seed", lines.join("\n"))
}
