//! # harborcrate
//!
//! REST API over two related tables, ports (`puerto`) and docks (`muelle`),
//! built on Axum and Sea-ORM.
//!
//! Every list endpoint accepts a flat query string that is checked against a
//! schema derived from the entity's field descriptors before anything touches
//! the database:
//!
//! - `<field>=<value>` equality filter on any declared field
//! - `<field>_min` / `<field>_max` range bounds on Integer, Decimal and Date fields
//! - `order=<field>:asc|desc`
//! - `limit` (1 to 1000, default 100) and `offset` (default 0)
//!
//! Unknown keys, values of the wrong type and inverted ranges are rejected
//! with a 400 listing every violation. The sanitized query is translated into
//! [`filtering::QueryCriteria`] and executed by a [`traits::Resource`]
//! implementation.
//!
//! ```text
//! GET /api/muelles?longitud_m_min=5&longitud_m_max=10&order=nombre:desc&limit=50
//! ```

pub mod config;
pub mod database;
pub mod errors;
pub mod filtering;
pub mod openapi;
pub mod pagination;
pub mod resources;
pub mod response;
pub mod routes;
pub mod telemetry;
pub mod traits;
pub mod validation;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub use errors::ApiError;
pub use routes::AppState;
pub use traits::Resource;

/// The API router wrapped in request tracing and CORS.
pub fn app(state: AppState, allowed_origins: &[String]) -> Router {
    routes::router(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Any origin when `allowed_origins` is empty, otherwise exactly those.
#[must_use]
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_RANGE]);

    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
