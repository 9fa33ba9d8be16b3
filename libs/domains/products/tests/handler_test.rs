//! End-to-end router tests: full middleware stack, in-memory store.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use axum_helpers::{JwtAuth, JwtConfig, create_router};
use domain_products::{
    ApiDoc, CategoryStats, CreateProduct, InMemoryProductRepository, Pagination, Product,
    ProductCategory, ProductError, ProductFilter, ProductRepository, ProductResult,
    ProductService, UpdateProduct, MAX_PAGE, handlers,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret-with-32-chars!";
const MISSING_ID: &str = "0192f0c1-0000-7000-8000-000000000000";

struct TestApp {
    router: Router,
    token: String,
}

impl TestApp {
    fn new<R: ProductRepository + 'static>(repository: R) -> Self {
        let auth = JwtAuth::new(&JwtConfig::new(SECRET).unwrap());
        let token = auth.issue_token("tester", &[], 3600).unwrap();

        let products = handlers::router(ProductService::new(repository), auth);
        let router = create_router::<ApiDoc>(
            Router::new().nest("/products", products),
            Router::new(),
        );
        Self { router, token }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        authorized: bool,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if authorized {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, false).await
    }
}

fn input(name: &str, price: f64, category: ProductCategory) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        description: format!("{name} description"),
        price,
        category,
        in_stock: true,
    }
}

fn valid_payload() -> Value {
    json!({
        "name": "Espresso Machine",
        "description": "15 bar pump",
        "price": 249.99,
        "category": "kitchen"
    })
}

/// Counts every store call, delegating to the in-memory store.
#[derive(Clone, Default)]
struct SpyRepository {
    inner: InMemoryProductRepository,
    calls: Arc<AtomicUsize>,
}

impl SpyRepository {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProductRepository for SpyRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        self.hit();
        self.inner.create(input).await
    }
    async fn get_by_id(&self, id: &str) -> ProductResult<Option<Product>> {
        self.hit();
        self.inner.get_by_id(id).await
    }
    async fn list(&self, f: ProductFilter, p: Pagination) -> ProductResult<Vec<Product>> {
        self.hit();
        self.inner.list(f, p).await
    }
    async fn count(&self, f: ProductFilter) -> ProductResult<u64> {
        self.hit();
        self.inner.count(f).await
    }
    async fn update(&self, id: &str, input: UpdateProduct) -> ProductResult<Option<Product>> {
        self.hit();
        self.inner.update(id, input).await
    }
    async fn delete(&self, id: &str) -> ProductResult<bool> {
        self.hit();
        self.inner.delete(id).await
    }
    async fn stats(&self) -> ProductResult<Vec<CategoryStats>> {
        self.hit();
        self.inner.stats().await
    }
}

/// Every operation fails the way an unreachable store would.
struct BrokenRepository;

fn broken<T>() -> ProductResult<T> {
    Err(ProductError::Database(
        "E11000 server selection timeout at mongo-0:27017".to_string(),
    ))
}

#[async_trait]
impl ProductRepository for BrokenRepository {
    async fn create(&self, _: CreateProduct) -> ProductResult<Product> {
        broken()
    }
    async fn get_by_id(&self, _: &str) -> ProductResult<Option<Product>> {
        broken()
    }
    async fn list(&self, _: ProductFilter, _: Pagination) -> ProductResult<Vec<Product>> {
        broken()
    }
    async fn count(&self, _: ProductFilter) -> ProductResult<u64> {
        broken()
    }
    async fn update(&self, _: &str, _: UpdateProduct) -> ProductResult<Option<Product>> {
        broken()
    }
    async fn delete(&self, _: &str) -> ProductResult<bool> {
        broken()
    }
    async fn stats(&self) -> ProductResult<Vec<CategoryStats>> {
        broken()
    }
}

#[tokio::test]
async fn create_without_fields_lists_every_missing_one() {
    let app = TestApp::new(InMemoryProductRepository::new());

    let (status, body) = app
        .request(Method::POST, "/api/products", Some(json!({})), true)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let errors: Vec<String> = serde_json::from_value(body["errors"].clone()).unwrap();
    for field in ["name", "description", "price", "category"] {
        assert!(errors.contains(&format!("\"{field}\" is required")), "{errors:?}");
    }
}

#[tokio::test]
async fn create_rejects_non_positive_price() {
    let app = TestApp::new(InMemoryProductRepository::new());

    for price in [0, -3] {
        let mut payload = valid_payload();
        payload["price"] = json!(price);

        let (status, body) = app
            .request(Method::POST, "/api/products", Some(payload), true)
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"], json!(["\"price\" must be a positive number"]));
    }
}

#[tokio::test]
async fn create_with_wrong_types_lists_every_violation() {
    let app = TestApp::new(InMemoryProductRepository::new());

    let (status, body) = app
        .request(
            Method::POST,
            "/api/products",
            Some(json!({ "name": 5, "price": "abc", "category": "toys" })),
            true,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(
        body["errors"],
        json!([
            "\"description\" is required",
            "\"name\" must be a string",
            "\"price\" must be a number",
            "\"category\" must be one of [electronics, kitchen, fashion, other]"
        ])
    );
}

#[tokio::test]
async fn create_without_content_type_is_bad_request() {
    let app = TestApp::new(InMemoryProductRepository::new());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::post("/api/products")
                .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
                .body(Body::from(valid_payload().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_defaults_in_stock_and_returns_envelope() {
    let app = TestApp::new(InMemoryProductRepository::new());

    let (status, body) = app
        .request(Method::POST, "/api/products", Some(valid_payload()), true)
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["inStock"], true);
    assert_eq!(body["data"]["category"], "kitchen");

    let id = body["data"]["_id"].as_str().unwrap().to_string();
    let (status, fetched) = app.get(&format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Espresso Machine");
}

#[tokio::test]
async fn update_with_only_price_leaves_other_fields() {
    let repo = InMemoryProductRepository::new();
    let original = repo
        .create(input("Kettle", 30.0, ProductCategory::Kitchen))
        .await
        .unwrap();
    let app = TestApp::new(repo);

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/products/{}", original.id),
            Some(json!({ "price": 35.5 })),
            true,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 35.5);
    assert_eq!(body["name"], "Kettle");
    assert_eq!(body["description"], "Kettle description");
    assert_eq!(body["category"], "kitchen");
    assert_eq!(body["inStock"], true);
}

#[tokio::test]
async fn update_with_invalid_fields_lists_both_violations() {
    let repo = InMemoryProductRepository::new();
    let original = repo
        .create(input("Kettle", 30.0, ProductCategory::Kitchen))
        .await
        .unwrap();
    let app = TestApp::new(repo);
    let uri = format!("/api/products/{}", original.id);

    let (status, body) = app
        .request(Method::PUT, &uri, Some(json!({ "price": -1, "category": "x" })), true)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors: Vec<String> = serde_json::from_value(body["errors"].clone()).unwrap();
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert!(errors.contains(&"\"price\" must be a positive number".to_string()));
    assert!(errors.iter().any(|e| e.starts_with("\"category\" must be one of")));

    let (status, body) = app
        .request(Method::PUT, &uri, Some(json!({ "name": 7, "inStock": "sometimes" })), true)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"],
        json!(["\"name\" must be a string", "\"inStock\" must be a boolean"])
    );

    let (_, stored) = app.get(&uri).await;
    assert_eq!(stored["price"], 30.0);
    assert_eq!(stored["category"], "kitchen");
}

#[tokio::test]
async fn update_can_clear_description() {
    let repo = InMemoryProductRepository::new();
    let original = repo
        .create(input("Kettle", 30.0, ProductCategory::Kitchen))
        .await
        .unwrap();
    let app = TestApp::new(repo);

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/products/{}", original.id),
            Some(json!({ "description": null })),
            true,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], Value::Null);
}

#[tokio::test]
async fn unknown_ids_are_404_for_get_update_and_delete() {
    let app = TestApp::new(InMemoryProductRepository::new());

    for id in [MISSING_ID, "not-an-id"] {
        let uri = format!("/api/products/{id}");

        let (status, body) = app.get(&uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Product not found");

        let (status, _) = app
            .request(Method::PUT, &uri, Some(json!({ "price": 1 })), true)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.request(Method::DELETE, &uri, None, true).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn delete_removes_the_record() {
    let repo = InMemoryProductRepository::new();
    let product = repo
        .create(input("Kettle", 30.0, ProductCategory::Kitchen))
        .await
        .unwrap();
    let app = TestApp::new(repo);
    let uri = format!("/api/products/{}", product.id);

    let (status, body) = app.request(Method::DELETE, &uri, None, true).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");

    let (status, _) = app.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_category_and_paginates() {
    let repo = InMemoryProductRepository::new();
    for i in 0..5 {
        repo.create(input(&format!("Pan {i}"), 10.0, ProductCategory::Kitchen))
            .await
            .unwrap();
    }
    for i in 0..2 {
        repo.create(input(&format!("Phone {i}"), 500.0, ProductCategory::Electronics))
            .await
            .unwrap();
    }
    let app = TestApp::new(repo);

    let (status, body) = app.get("/api/products?category=kitchen&page=2&limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 2);
    assert_eq!(body["pages"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    let (_, body) = app.get("/api/products").await;
    assert_eq!(body["total"], 7);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pages"], 1);
}

#[tokio::test]
async fn list_rejects_non_numeric_page() {
    let app = TestApp::new(InMemoryProductRepository::new());
    let (status, body) = app.get("/api/products?page=two").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn list_clamps_out_of_range_page() {
    let app = TestApp::new(InMemoryProductRepository::new());
    let (status, body) = app.get("/api/products?page=18446744073709551615").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], MAX_PAGE);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn search_matches_name_case_insensitively() {
    let repo = InMemoryProductRepository::new();
    for name in ["Foo Widget", "superFOOmatic", "Bar Stool"] {
        repo.create(input(name, 10.0, ProductCategory::Other))
            .await
            .unwrap();
    }
    let app = TestApp::new(repo);

    let (_, body) = app.get("/api/products?search=foo").await;

    let mut names: Vec<String> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Foo Widget", "superFOOmatic"]);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn stats_are_grouped_and_ordered_by_count() {
    let repo = InMemoryProductRepository::new();
    repo.create(input("Mixer", 30.0, ProductCategory::Kitchen)).await.unwrap();
    repo.create(input("Phone", 10.0, ProductCategory::Electronics)).await.unwrap();
    repo.create(input("Radio", 20.0, ProductCategory::Electronics)).await.unwrap();
    let app = TestApp::new(repo);

    let (status, body) = app.get("/api/products/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "category": "electronics", "count": 2, "avgPrice": 15.0, "inStockCount": 2 },
            { "category": "kitchen", "count": 1, "avgPrice": 30.0, "inStockCount": 1 }
        ])
    );
}

#[tokio::test]
async fn mutations_without_credentials_never_reach_the_store() {
    let repo = SpyRepository::default();
    let calls = repo.calls.clone();
    let app = TestApp::new(repo);
    let uri = format!("/api/products/{MISSING_ID}");

    let attempts = [
        (Method::POST, "/api/products".to_string(), Some(valid_payload())),
        (Method::PUT, uri.clone(), Some(json!({ "price": 2 }))),
        (Method::DELETE, uri, None),
    ];

    for (method, uri, body) in attempts {
        let (status, body) = app.request(method, &uri, body, false).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn forged_token_is_unauthorized() {
    let app = TestApp::new(InMemoryProductRepository::new());
    let forger = JwtAuth::new(&JwtConfig::new("some-other-secret-that-is-32-chars!!").unwrap());
    let forged = forger.issue_token("intruder", &[], 3600).unwrap();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::post("/api/products")
                .header(header::AUTHORIZATION, format!("Bearer {forged}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(valid_payload().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn store_failures_are_generic_500s() {
    let app = TestApp::new(BrokenRepository);

    let responses = [
        app.get("/api/products").await,
        app.get("/api/products/stats").await,
        app.get(&format!("/api/products/{MISSING_ID}")).await,
        app.request(Method::POST, "/api/products", Some(valid_payload()), true)
            .await,
        app.request(
            Method::PUT,
            &format!("/api/products/{MISSING_ID}"),
            Some(json!({ "price": 2 })),
            true,
        )
        .await,
        app.request(Method::DELETE, &format!("/api/products/{MISSING_ID}"), None, true)
            .await,
    ];

    for (status, body) in responses {
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert!(!body.to_string().contains("E11000"));
        assert!(!body.to_string().contains("mongo-0"));
    }
}

#[tokio::test]
async fn operator_keys_are_stripped_before_validation() {
    let app = TestApp::new(InMemoryProductRepository::new());

    let mut payload = valid_payload();
    payload["$where"] = json!("sleep(1000)");
    let (status, body) = app
        .request(Method::POST, "/api/products", Some(payload), true)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"].get("$where").is_none());

    // Bracket operator in the query is dropped, so the filter is simply absent
    let (status, body) = app.get("/api/products?category%5B%24ne%5D=kitchen").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let app = TestApp::new(InMemoryProductRepository::new());
    let (status, body) = app.get("/api/unknown").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
}
