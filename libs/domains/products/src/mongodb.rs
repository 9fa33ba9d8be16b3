//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Bson, Document, doc},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ProductResult;
use crate::models::{
    CategoryStats, CreateProduct, Pagination, Product, ProductCategory, ProductFilter,
    UpdateProduct,
};
use crate::repository::ProductRepository;

/// Default collection name
pub const COLLECTION: &str = "products";

/// Stored shape of a product. Timestamps are native BSON dates so that
/// sorting on `createdAt` is chronological.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    description: Option<String>,
    price: f64,
    category: ProductCategory,
    in_stock: bool,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

fn to_bson_date(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

fn from_bson_date(at: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or_default()
}

impl From<&Product> for ProductDocument {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price,
            category: p.category,
            in_stock: p.in_stock,
            created_at: to_bson_date(p.created_at),
            updated_at: to_bson_date(p.updated_at),
        }
    }
}

impl From<ProductDocument> for Product {
    fn from(d: ProductDocument) -> Self {
        Self {
            id: d.id,
            name: d.name,
            description: d.description,
            price: d.price,
            category: d.category,
            in_stock: d.in_stock,
            created_at: from_bson_date(d.created_at),
            updated_at: from_bson_date(d.updated_at),
        }
    }
}

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION)
    }

    /// Use a custom collection name (integration tests use throwaway ones)
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<ProductDocument>(collection_name);
        Self { collection }
    }

    /// Create the indexes backing list filters and ordering
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let index = |keys: Document, name: &str| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(name.to_string()).build())
                .build()
        };

        let indexes = vec![
            index(doc! { "category": 1, "createdAt": -1 }, "idx_category_created"),
            index(doc! { "name": 1 }, "idx_name"),
            index(doc! { "createdAt": -1 }, "idx_created_at"),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    /// Build a MongoDB filter document from ProductFilter.
    ///
    /// The search term is regex-escaped so it always matches literally.
    fn build_filter(filter: &ProductFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref category) = filter.category {
            doc.insert("category", category.as_str());
        }

        if let Some(ref search) = filter.search {
            doc.insert(
                "name",
                doc! { "$regex": regex::escape(search), "$options": "i" },
            );
        }

        doc
    }

    /// `$set` document for a partial update. `updatedAt` is always refreshed.
    fn build_update(input: &UpdateProduct) -> Document {
        let mut set = doc! { "updatedAt": to_bson_date(Utc::now()) };

        if let Some(ref name) = input.name {
            set.insert("name", name.as_str());
        }
        if let Some(ref description) = input.description {
            set.insert(
                "description",
                description.as_deref().map_or(Bson::Null, Bson::from),
            );
        }
        if let Some(price) = input.price {
            set.insert("price", price);
        }
        if let Some(category) = input.category {
            set.insert("category", category.as_str());
        }
        if let Some(in_stock) = input.in_stock {
            set.insert("inStock", in_stock);
        }

        doc! { "$set": set }
    }

    fn stats_pipeline() -> Vec<Document> {
        vec![
            doc! {
                "$group": {
                    "_id": "$category",
                    "count": { "$sum": 1 },
                    "avgPrice": { "$avg": "$price" },
                    "inStockCount": {
                        "$sum": { "$cond": [{ "$eq": ["$inStock", true] }, 1, 0] }
                    },
                }
            },
            doc! {
                "$project": {
                    "_id": 0,
                    "category": { "$ifNull": ["$_id", null] },
                    "count": 1,
                    "avgPrice": { "$ifNull": ["$avgPrice", 0.0] },
                    "inStockCount": 1,
                }
            },
            doc! { "$sort": { "count": -1, "category": 1 } },
        ]
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let product = Product::new(input);

        self.collection
            .insert_one(ProductDocument::from(&product))
            .await?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> ProductResult<Option<Product>> {
        let found = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(found.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> ProductResult<Vec<Product>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .skip(pagination.skip())
            .limit(pagination.limit as i64)
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .with_options(options)
            .await?;
        let documents: Vec<ProductDocument> = cursor.try_collect().await?;

        Ok(documents.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: ProductFilter) -> ProductResult<u64> {
        let count = self
            .collection
            .count_documents(Self::build_filter(&filter))
            .await?;
        Ok(count)
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: &str, input: UpdateProduct) -> ProductResult<Option<Product>> {
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, Self::build_update(&input))
            .return_document(ReturnDocument::After)
            .await?;

        if updated.is_some() {
            tracing::info!(product_id = %id, "Product updated successfully");
        }
        Ok(updated.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> ProductResult<bool> {
        let deleted = self
            .collection
            .find_one_and_delete(doc! { "_id": id })
            .await?;

        if deleted.is_some() {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(deleted.is_some())
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> ProductResult<Vec<CategoryStats>> {
        let cursor = self.collection.aggregate(Self::stats_pipeline()).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        documents
            .into_iter()
            .map(|d| bson::from_document::<CategoryStats>(d).map_err(Into::into))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_filter_empty() {
        assert_eq!(
            MongoProductRepository::build_filter(&ProductFilter::default()),
            doc! {}
        );
    }

    #[test]
    fn build_filter_escapes_search_term() {
        let filter = ProductFilter {
            category: Some("kitchen".to_string()),
            search: Some("a.b*(c)".to_string()),
        };

        let doc = MongoProductRepository::build_filter(&filter);
        assert_eq!(doc.get_str("category").unwrap(), "kitchen");

        let name = doc.get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), r"a\.b\*\(c\)");
        assert_eq!(name.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn build_update_sets_only_supplied_fields() {
        let update = MongoProductRepository::build_update(&UpdateProduct {
            price: Some(19.5),
            description: Some(None),
            ..Default::default()
        });

        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_f64("price").unwrap(), 19.5);
        assert_eq!(set.get("description"), Some(&Bson::Null));
        assert!(set.contains_key("updatedAt"));
        assert!(!set.contains_key("name"));
        assert!(!set.contains_key("inStock"));
    }

    #[test]
    fn stats_pipeline_orders_by_count_then_category() {
        let pipeline = MongoProductRepository::stats_pipeline();
        let sort = pipeline[2].get_document("$sort").unwrap();
        assert_eq!(sort, &doc! { "count": -1, "category": 1 });
    }

    #[test]
    fn stats_document_decodes() {
        let d = doc! { "category": "kitchen", "count": 2, "avgPrice": 15.0, "inStockCount": 1 };
        let stats: CategoryStats = bson::from_document(d).unwrap();
        assert_eq!(stats.category, Some(ProductCategory::Kitchen));
        assert_eq!(stats.count, 2);
        assert_eq!(stats.in_stock_count, 1);

        let d = doc! { "category": Bson::Null, "count": 1, "avgPrice": 3.0, "inStockCount": 0 };
        let stats: CategoryStats = bson::from_document(d).unwrap();
        assert_eq!(stats.category, None);
    }

    #[test]
    fn document_round_trip_keeps_millisecond_timestamps() {
        let product = Product::new(CreateProduct {
            name: "Kettle".to_string(),
            description: "Boils water".to_string(),
            price: 30.0,
            category: ProductCategory::Kitchen,
            in_stock: true,
        });

        let restored = Product::from(ProductDocument::from(&product));
        assert_eq!(restored.id, product.id);
        assert_eq!(
            restored.created_at.timestamp_millis(),
            product.created_at.timestamp_millis()
        );
    }
}
