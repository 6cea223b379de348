//! Per-request deadline
//!
//! The inner handler future is dropped when the deadline fires, so only the
//! 504 response is ever written for that request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use link_common::AppError;
use tracing::warn;

use crate::response::ApiError;
use crate::state::AppState;

pub async fn request_timeout(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let deadline = state.config().http.request_timeout();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(%method, %path, timeout_secs = deadline.as_secs(), "Request timed out");
            ApiError::App(AppError::Timeout).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use link_common::AppConfig;
    use tower::ServiceExt;

    use crate::middleware::apply_middleware;
    use crate::server::create_memory_app_state;

    #[derive(Default)]
    struct Calls {
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    fn app(handler_delay: Duration, calls: Arc<Calls>) -> Router {
        let vars = HashMap::from([
            ("JWT_SECRET", "timeout-test-secret"),
            ("DATABASE_URL", "postgres://unused@localhost/unused"),
            ("REQUEST_TIMEOUT_SECS", "1"),
        ]);
        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string())).unwrap();
        let state = create_memory_app_state(config).unwrap();

        let router = Router::new().route(
            "/slow",
            get(move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.started.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(handler_delay).await;
                    calls.finished.fetch_add(1, Ordering::SeqCst);
                    "done"
                }
            }),
        );

        apply_middleware(router, &state).with_state(state)
    }

    fn request() -> Request<Body> {
        Request::builder().uri("/slow").body(Body::empty()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_handler_gets_single_gateway_timeout() {
        let calls = Arc::new(Calls::default());
        let response = app(Duration::from_secs(5), Arc::clone(&calls))
            .oneshot(request())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "REQUEST_TIMEOUT");

        // The handler future was dropped at the deadline and never resumes
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.started.load(Ordering::SeqCst), 1);
        assert_eq!(calls.finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_within_deadline_completes() {
        let calls = Arc::new(Calls::default());
        let response = app(Duration::from_millis(200), Arc::clone(&calls))
            .oneshot(request())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"done");
        assert_eq!(calls.finished.load(Ordering::SeqCst), 1);
    }
}
