use async_trait::async_trait;

use crate::error::ProductResult;
use crate::models::{CategoryStats, CreateProduct, Pagination, Product, ProductFilter, UpdateProduct};

/// Repository trait for Product persistence
///
/// Ids are passed as the string form of the record's UUID. Implementations
/// report a missing record as `None` / `false`; only store failures are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a new product, assigning its id and timestamps
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    /// Get a product by ID
    async fn get_by_id(&self, id: &str) -> ProductResult<Option<Product>>;

    /// One page of matching products, newest first
    async fn list(&self, filter: ProductFilter, pagination: Pagination)
    -> ProductResult<Vec<Product>>;

    /// Count products matching a filter, ignoring pagination
    async fn count(&self, filter: ProductFilter) -> ProductResult<u64>;

    /// Apply the supplied fields and return the updated record
    async fn update(&self, id: &str, input: UpdateProduct) -> ProductResult<Option<Product>>;

    /// Hard delete. Returns whether a record was removed
    async fn delete(&self, id: &str) -> ProductResult<bool>;

    /// Per-category count, average price and in-stock count, largest bucket first
    async fn stats(&self) -> ProductResult<Vec<CategoryStats>>;
}
