//! Router configuration for the HTTP API.
//!
//! This module sets up all routes and middleware (CORS, compression, tracing)
//! and creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    compression::{predicate::SizeAbove, CompressionLayer},
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;
use crate::config::CorsPolicy;

/// Create the application router with all routes and middleware.
///
/// Every response body is gzip-compressed when the client accepts it,
/// however small.
pub fn create_router(state: AppState, cors: CorsPolicy) -> Router {
    let router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/predict", get(handlers::predict))
        .route("/predict/statsmodels", get(handlers::predict_smoothing))
        .route("/predict/prophet", get(handlers::predict_decomposition))
        .layer(CompressionLayer::new().compress_when(SizeAbove::new(0)))
        .layer(TraceLayer::new_for_http());

    let router = match cors {
        CorsPolicy::Permissive => router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        ),
        CorsPolicy::Disabled => router,
    };

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::error::{ForecastError, Result};
    use crate::models::{ForecastBackend, Observation};
    use crate::services::{ForecastCache, ForecastService};
    use crate::upstream::StarHistorySource;

    struct Unreachable;

    #[async_trait]
    impl StarHistorySource for Unreachable {
        async fn fetch(&self, _repo: &str) -> Result<Vec<Observation>> {
            Err(ForecastError::UpstreamUnavailable("offline".to_string()))
        }
    }

    fn router(cors: CorsPolicy) -> Router {
        let service = ForecastService::new(
            Arc::new(Unreachable),
            Arc::new(ForecastCache::new(Duration::from_secs(60), 8)),
        );
        create_router(
            AppState::new(Arc::new(service), ForecastBackend::Decomposition),
            cors,
        )
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::ORIGIN, "http://example.com")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_permissive_cors_headers() {
        let response = router(CorsPolicy::Permissive).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_disabled_cors_has_no_headers() {
        let response = router(CorsPolicy::Disabled).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_bad_gateway() {
        let response = router(CorsPolicy::Permissive)
            .oneshot(get("/predict?repo=a/b"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = router(CorsPolicy::Permissive)
            .oneshot(get("/forecast"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
