//! In-process implementation of ProductRepository.
//!
//! Mirrors the MongoDB accessor's semantics (filtering, newest-first ordering,
//! pagination, stats buckets) so routers can be exercised end to end without
//! a database.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CategoryStats, CreateProduct, Pagination, Product, ProductFilter, UpdateProduct,
};
use crate::repository::ProductRepository;

#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    storage: Arc<RwLock<HashMap<String, Product>>>,
}

fn poisoned(op: &str) -> ProductError {
    ProductError::Internal(format!("product store lock poisoned during {op}"))
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matching products, newest first
    fn matching(&self, filter: &ProductFilter) -> ProductResult<Vec<Product>> {
        let storage = self.storage.read().map_err(|_| poisoned("read"))?;

        let mut products: Vec<Product> = storage
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(products)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let product = Product::new(input);
        let mut storage = self.storage.write().map_err(|_| poisoned("write"))?;
        storage.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn get_by_id(&self, id: &str) -> ProductResult<Option<Product>> {
        let storage = self.storage.read().map_err(|_| poisoned("read"))?;
        Ok(storage.get(id).cloned())
    }

    async fn list(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> ProductResult<Vec<Product>> {
        Ok(self
            .matching(&filter)?
            .into_iter()
            .skip(pagination.skip() as usize)
            .take(pagination.limit as usize)
            .collect())
    }

    async fn count(&self, filter: ProductFilter) -> ProductResult<u64> {
        Ok(self.matching(&filter)?.len() as u64)
    }

    async fn update(&self, id: &str, input: UpdateProduct) -> ProductResult<Option<Product>> {
        let mut storage = self.storage.write().map_err(|_| poisoned("write"))?;
        Ok(storage.get_mut(id).map(|product| {
            product.apply_update(input);
            product.clone()
        }))
    }

    async fn delete(&self, id: &str) -> ProductResult<bool> {
        let mut storage = self.storage.write().map_err(|_| poisoned("write"))?;
        Ok(storage.remove(id).is_some())
    }

    async fn stats(&self) -> ProductResult<Vec<CategoryStats>> {
        let storage = self.storage.read().map_err(|_| poisoned("read"))?;

        // Keyed by name: alphabetical, so ties in count sort by name
        let mut buckets: BTreeMap<&'static str, CategoryStats> = BTreeMap::new();
        for product in storage.values() {
            let bucket = buckets
                .entry(product.category.as_str())
                .or_insert_with(|| CategoryStats {
                    category: Some(product.category),
                    count: 0,
                    avg_price: 0.0,
                    in_stock_count: 0,
                });
            bucket.count += 1;
            // running sum, divided below
            bucket.avg_price += product.price;
            bucket.in_stock_count += u64::from(product.in_stock);
        }

        let mut stats: Vec<CategoryStats> = buckets
            .into_values()
            .map(|mut bucket| {
                bucket.avg_price /= bucket.count as f64;
                bucket
            })
            .collect();
        stats.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(stats)
    }
}
