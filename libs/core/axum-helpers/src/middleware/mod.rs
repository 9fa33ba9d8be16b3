//! Request-level middleware applied to every route by
//! [`create_router`](crate::server::create_router).

pub mod logging;
pub mod sanitize;
pub mod security;

pub use logging::log_requests;
pub use sanitize::sanitize_input;
pub use security::security_headers;
