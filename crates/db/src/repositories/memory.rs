use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use catalog_core::domain::product::{Product, ProductId};

use super::{ProductRepository, RepositoryError};

/// Process-lifetime product store. A single lock guards both the ordered list
/// and the identifier counter, so assignment and append happen atomically.
#[derive(Debug)]
pub struct InMemoryProductRepository {
    state: RwLock<CatalogState>,
}

#[derive(Debug)]
struct CatalogState {
    products: Vec<Product>,
    next_id: u64,
}

impl CatalogState {
    fn position_of(&self, id: ProductId) -> Option<usize> {
        self.products.iter().position(|product| product.id == id)
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::with_products(Vec::new())
    }
}

impl InMemoryProductRepository {
    /// Seeds keep their identifiers; the counter starts one past the highest.
    pub fn with_products(products: Vec<Product>) -> Self {
        let highest = products.iter().map(|product| product.id.0).max().unwrap_or(0);
        Self { state: RwLock::new(CatalogState { products, next_id: highest + 1 }) }
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.products.clone())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.products.iter().find(|product| product.id == id).cloned())
    }

    async fn add(&self, mut product: Product) -> Result<Product, RepositoryError> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        product.id = ProductId(state.next_id);
        product.created_on = Some(now);
        product.updated_on = Some(now);
        product.deleted_on = None;
        state.next_id += 1;
        state.products.push(product.clone());

        debug!(product_id = %product.id, "product appended to catalog");
        Ok(product)
    }

    async fn update(&self, id: ProductId, mut product: Product) -> Result<Product, RepositoryError> {
        let mut state = self.state.write().await;
        let position = state.position_of(id).ok_or(RepositoryError::NotFound(id))?;

        let slot = &mut state.products[position];
        product.id = id;
        product.created_on = slot.created_on;
        product.updated_on = Some(Utc::now());
        product.deleted_on = None;
        *slot = product.clone();

        debug!(product_id = %id, position, "product replaced in catalog");
        Ok(product)
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let position = state.position_of(id).ok_or(RepositoryError::NotFound(id))?;

        state.products.remove(position);

        debug!(product_id = %id, position, "product removed from catalog");
        Ok(())
    }

    async fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.state.read().await.products.len())
    }
}

#[cfg(test)]
mod tests {
    use catalog_core::domain::product::{Product, ProductId};

    use crate::repositories::{InMemoryProductRepository, ProductRepository, RepositoryError};

    fn product(id: u64, name: &str) -> Product {
        Product::new(name, "", 1.0, "abc-def-ghi").with_id(ProductId(id))
    }

    fn ids(products: &[Product]) -> Vec<u64> {
        products.iter().map(|product| product.id.0).collect()
    }

    #[tokio::test]
    async fn empty_repository_starts_identifiers_at_one() {
        let repo = InMemoryProductRepository::default();

        let first = repo.add(product(0, "first")).await.expect("add");
        let second = repo.add(product(0, "second")).await.expect("add");

        assert_eq!(first.id, ProductId(1));
        assert_eq!(second.id, ProductId(2));
        assert!(first.created_on.is_some());
    }

    #[tokio::test]
    async fn client_supplied_identifier_is_ignored_on_add() {
        let repo = InMemoryProductRepository::with_products(vec![product(1, "a"), product(2, "b")]);

        let stored = repo.add(product(500, "c")).await.expect("add");

        assert_eq!(stored.id, ProductId(3));
    }

    #[tokio::test]
    async fn identifiers_are_not_reused_after_deleting_the_tail() {
        let repo = InMemoryProductRepository::with_products(vec![product(1, "a"), product(2, "b")]);

        repo.delete(ProductId(2)).await.expect("delete");
        let stored = repo.add(product(0, "c")).await.expect("add");

        assert_eq!(stored.id, ProductId(3));
        assert_eq!(ids(&repo.list().await.expect("list")), vec![1, 3]);
    }

    #[tokio::test]
    async fn seed_counter_starts_past_highest_identifier_even_when_unordered() {
        let repo = InMemoryProductRepository::with_products(vec![product(5, "a"), product(2, "b")]);

        let stored = repo.add(product(0, "c")).await.expect("add");

        assert_eq!(stored.id, ProductId(6));
    }

    #[tokio::test]
    async fn update_preserves_creation_time() {
        let repo = InMemoryProductRepository::default();
        let created = repo.add(product(0, "a")).await.expect("add");

        let updated = repo.update(created.id, product(0, "renamed")).await.expect("update");

        assert_eq!(updated.created_on, created.created_on);
        assert!(updated.updated_on >= created.updated_on);
        assert_eq!(updated.name, "renamed");
    }

    #[tokio::test]
    async fn delete_from_the_middle_keeps_relative_order() {
        let repo = InMemoryProductRepository::with_products(vec![
            product(1, "a"),
            product(2, "b"),
            product(3, "c"),
        ]);

        repo.delete(ProductId(2)).await.expect("delete");

        assert_eq!(ids(&repo.list().await.expect("list")), vec![1, 3]);
        assert_eq!(repo.len().await.expect("len"), 2);
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_product() {
        let repo = InMemoryProductRepository::with_products(vec![product(1, "a")]);

        assert_eq!(repo.find_by_id(ProductId(9)).await.expect("find"), None);
        assert_eq!(
            repo.find_by_id(ProductId(1)).await.expect("find").map(|found| found.name),
            Some("a".to_string())
        );
        assert_eq!(
            repo.delete(ProductId(9)).await,
            Err(RepositoryError::NotFound(ProductId(9)))
        );
    }
}
