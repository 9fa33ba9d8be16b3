//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{CategoryStats, CreateProduct, Product, ProductPage, ProductQuery, UpdateProduct};
use crate::repository::ProductRepository;

/// Product service providing business logic operations
///
/// Inputs arrive already validated; the service resolves ids, shapes pages and
/// turns missing records into [`ProductError::NotFound`].
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Ids that are not UUIDs can never match a record, so they are reported
    /// as not found without a store round trip.
    fn resolve_id(id: &str) -> ProductResult<String> {
        Uuid::parse_str(id)
            .map(|uuid| uuid.hyphenated().to_string())
            .map_err(|_| ProductError::NotFound(id.to_string()))
    }

    /// List products with filters and pagination
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: ProductQuery) -> ProductResult<ProductPage> {
        let filter = query.filter();
        let pagination = query.pagination();

        let (total, results) = tokio::try_join!(
            self.repository.count(filter.clone()),
            self.repository.list(filter, pagination),
        )?;

        Ok(ProductPage {
            total,
            page: pagination.page,
            pages: pagination.pages(total),
            results,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> ProductResult<Product> {
        let id = Self::resolve_id(id)?;
        self.repository
            .get_by_id(&id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        self.repository.create(input).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: &str, input: UpdateProduct) -> ProductResult<Product> {
        let id = Self::resolve_id(id)?;
        self.repository
            .update(&id, input)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> ProductResult<()> {
        let id = Self::resolve_id(id)?;
        if self.repository.delete(&id).await? {
            Ok(())
        } else {
            Err(ProductError::NotFound(id))
        }
    }

    /// Per-category aggregates, largest bucket first
    #[instrument(skip(self))]
    pub async fn product_stats(&self) -> ProductResult<Vec<CategoryStats>> {
        self.repository.stats().await
    }
}
