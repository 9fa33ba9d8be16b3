use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Default page size for list queries
pub const DEFAULT_LIMIT: u64 = 10;
/// Upper bound for a single page
pub const MAX_LIMIT: u64 = 100;
/// Highest page number served. The store encodes `skip` as a signed 64-bit
/// integer, so `(page - 1) * limit` must stay within `i64::MAX`.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_LIMIT;

/// Product category
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    VariantNames,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProductCategory {
    Electronics,
    Kitchen,
    Fashion,
    Other,
}

impl ProductCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Kitchen => "kitchen",
            Self::Fashion => "fashion",
            Self::Other => "other",
        }
    }
}

/// Product entity as returned by the API.
///
/// `id` is a UUIDv7 rendered as a string under `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    #[schema(example = "01932c07-a4b5-7e38-9f1a-3c2b1d0e4f5a")]
    pub id: String,
    #[schema(example = "Espresso Machine")]
    pub name: String,
    /// `null` once cleared by an update
    pub description: Option<String>,
    #[schema(example = 249.99)]
    pub price: f64,
    pub category: ProductCategory,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a new record from validated input, assigning id and timestamps.
    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            name: input.name,
            description: Some(input.description),
            price: input.price,
            category: input.category,
            in_stock: input.in_stock,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the supplied fields of `update`, leaving the rest untouched.
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(in_stock) = update.in_stock {
            self.in_stock = in_stock;
        }
        self.updated_at = Utc::now();
    }
}

/// Validated input for creating a product
#[derive(Debug, Clone, PartialEq)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: ProductCategory,
    pub in_stock: bool,
}

/// Validated partial update. `None` means "leave as is".
///
/// `description` is doubly optional: `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub category: Option<ProductCategory>,
    pub in_stock: Option<bool>,
}

/// Query parameters accepted by the list endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Exact category match
    pub category: Option<String>,
    /// Case-insensitive substring of the product name
    pub search: Option<String>,
    /// 1-based page number (default 1)
    pub page: Option<u64>,
    /// Page size (default 10, max 100)
    pub limit: Option<u64>,
}

impl ProductQuery {
    pub fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: non_empty(self.category.as_deref()),
            search: non_empty(self.search.as_deref()),
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Store-level filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ProductFilter {
    /// In-process equivalent of the store query.
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|c| product.category.as_str() == c);
        let search_ok = self
            .search
            .as_deref()
            .is_none_or(|s| product.name.to_lowercase().contains(&s.to_lowercase()));
        category_ok && search_ok
    }
}

/// Normalized page/limit pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    /// `page` is clamped to `1..=MAX_PAGE` and `limit` to `1..=MAX_LIMIT`.
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of list results
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductPage {
    /// Matching records ignoring pagination
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    pub results: Vec<Product>,
}

/// Per-category aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    /// `null` for records without a category
    pub category: Option<ProductCategory>,
    pub count: u64,
    pub avg_price: f64,
    pub in_stock_count: u64,
}

/// Body returned by create
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedProduct {
    pub success: bool,
    pub data: Product,
}

/// Body returned by delete
#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedProduct {
    #[schema(example = "Product deleted successfully")]
    pub message: String,
}
