use chrono::Utc;
use tracing::info;

use catalog_core::domain::product::{Product, ProductId};
use catalog_core::validation::{ProductValidator, ValidationError};

use crate::repositories::InMemoryProductRepository;

struct SeedProduct {
    id: u64,
    name: &'static str,
    description: &'static str,
    price: f64,
    sku: &'static str,
}

/// Products present when the service starts.
const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        id: 1,
        name: "Latte",
        description: "Frothy milky coffee",
        price: 2.45,
        sku: "latte-milk-coffee",
    },
    SeedProduct {
        id: 2,
        name: "Espresso",
        description: "Short and strong coffee without milk",
        price: 1.99,
        sku: "espresso-short-coffee",
    },
];

pub fn seed_products() -> Vec<Product> {
    let now = Utc::now();
    SEED_PRODUCTS
        .iter()
        .map(|seed| Product {
            created_on: Some(now),
            updated_on: Some(now),
            ..Product::new(seed.name, seed.description, seed.price, seed.sku)
                .with_id(ProductId(seed.id))
        })
        .collect()
}

pub fn seeded_repository() -> InMemoryProductRepository {
    InMemoryProductRepository::with_products(seed_products())
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeedVerification {
    pub checked: usize,
    pub failures: Vec<(ProductId, ValidationError)>,
}

impl SeedVerification {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs every seed through the same admission rules as client candidates.
pub fn verify_seed_products(validator: &ProductValidator) -> SeedVerification {
    let seeds = seed_products();
    let failures: Vec<_> = seeds
        .iter()
        .filter_map(|product| validator.validate(product).err().map(|error| (product.id, error)))
        .collect();

    info!(
        event_name = "catalog.seed.verified",
        checked = seeds.len(),
        failures = failures.len(),
        "seed products verified"
    );

    SeedVerification { checked: seeds.len(), failures }
}

#[cfg(test)]
mod tests {
    use catalog_core::domain::product::ProductId;
    use catalog_core::validation::ProductValidator;

    use super::{seed_products, verify_seed_products};

    #[test]
    fn seeds_are_latte_and_espresso_with_sequential_ids() {
        let seeds = seed_products();

        let summary: Vec<_> =
            seeds.iter().map(|product| (product.id, product.name.as_str())).collect();
        assert_eq!(summary, vec![(ProductId(1), "Latte"), (ProductId(2), "Espresso")]);
        assert!(seeds.iter().all(|product| product.deleted_on.is_none()));
    }

    #[test]
    fn seeds_satisfy_admission_rules() {
        let validator = ProductValidator::new().expect("validator");

        let verification = verify_seed_products(&validator);

        assert_eq!(verification.checked, 2);
        assert!(verification.passed(), "seed failures: {:?}", verification.failures);
    }
}
