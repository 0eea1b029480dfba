//! HTTP adapters - REST API implementations.
//!
//! `sessions` exposes the booking endpoints; [`app_router`] wraps them in
//! the tower-http middleware stack configured by [`ServerConfig`].

pub mod sessions;

use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ServerConfig;

pub use sessions::{api_router, session_routes, BookingApiError, SessionsAppState};

/// Build the served application: API routes plus tracing, request timeout
/// and CORS.
///
/// Without configured origins, development allows any origin and other
/// environments allow none.
pub fn app_router(state: SessionsAppState, config: &ServerConfig) -> Router {
    api_router(state)
        .layer(cors_layer(config))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origins(config))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

fn allowed_origins(config: &ServerConfig) -> AllowOrigin {
    let configured = config.cors_origins_list();
    if configured.iter().any(|origin| origin == "*") {
        return AllowOrigin::any();
    }

    let origins: Vec<HeaderValue> = configured
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() && !config.is_production() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    }
}
