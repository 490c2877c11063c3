//! API Module
//!
//! HTTP handlers and routing for the memoized aggregate and cache
//! diagnostics endpoints.
//!
//! # Endpoints
//! - `GET /aggregate/:key` - Memoized aggregate
//! - `DELETE /aggregate/:key` - Invalidate one aggregate
//! - `GET /stats` / `GET /stats/:name` - Cache statistics
//! - `DELETE /cache` / `DELETE /cache/:name` - Cache invalidation
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
