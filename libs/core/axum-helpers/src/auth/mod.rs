//! Bearer-token authorization for mutating routes.
//!
//! Tokens are HS256 JWTs signed with `JWT_SECRET`. The gate only checks that a
//! token is present, correctly signed and unexpired; it does not look at roles.
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, require_auth};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .route("/", post(create))
//!     .route_layer(axum::middleware::from_fn_with_state(auth, require_auth));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{AuthError, DEFAULT_TOKEN_TTL, JwtAuth, JwtClaims};
pub use middleware::require_auth;
