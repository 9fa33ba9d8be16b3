//! # Axum Helpers
//!
//! Cross-cutting HTTP building blocks shared by the API binaries.
//!
//! ## Modules
//!
//! - **[`auth`]**: Bearer-token authorization gate for mutating routes
//! - **[`errors`]**: Centralized error formatting (`AppError` → JSON envelope)
//! - **[`extractors`]**: Validated JSON body and query extractors
//! - **[`middleware`]**: Request logging, input sanitizing, security headers
//! - **[`server`]**: Router assembly, health endpoints, graceful shutdown
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_production_app, create_router};
//! use core_config::server::ServerConfig;
//! use std::time::Duration;
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let app = create_router::<ApiDoc>(Router::new(), Router::new());
//!     create_production_app(app, &ServerConfig::default(), Duration::from_secs(30), async {}).await
//! }
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod middleware;
pub mod server;

// Re-export auth types
pub use auth::{AuthError, JwtAuth, JwtClaims, JwtConfig, require_auth};

// Re-export server types
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks,
};

// Re-export error types
pub use errors::{AppError, ErrorCode, ErrorResponse};

// Re-export extractors
pub use extractors::{ApiQuery, ValidatePayload, ValidatedJson};
