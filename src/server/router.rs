use axum::Router;
use axum::routing::get;

use crate::server::handler::{AppState, handle_metrics, handle_version_check};

/// Builds the relay's routes: `/` for version checks, `/metrics` for counters
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_version_check))
        .route("/metrics", get(handle_metrics))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::metrics::RequestCounters;
    use crate::relay::cache::VersionCache;
    use crate::relay::fetcher::MockVersionFetcher;
    use crate::relay::validator::UrlValidator;

    fn state() -> AppState {
        AppState::new(
            UrlValidator::default(),
            Arc::new(VersionCache::new(
                MockVersionFetcher::new(),
                Duration::from_secs(30),
            )),
            Arc::new(RequestCounters::new()),
        )
    }

    #[tokio::test]
    async fn unknown_path_returns_not_found() {
        let response = build_router(state())
            .oneshot(Request::builder().uri("/latest").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_get_method_is_not_allowed() {
        let response = build_router(state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/?url=x")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
