//! API routes module

pub mod health;
pub mod products;

use axum::{routing::get, Router};
use axum_helpers::health_router;

use crate::state::AppState;

pub const WELCOME: &str = "Welcome to the Product API! Go to /api/products to see all products.";

/// Routes nested under `/api`
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/products", products::router(state))
}

/// Top-level routes: welcome text and probes
pub fn root_routes(state: &AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .merge(health_router(state.config.app))
        .merge(health::router(state.clone()))
}

async fn welcome() -> &'static str {
    WELCOME
}

/// Initialize database indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    products::init_indexes(state).await
}
