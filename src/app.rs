use axum::{
    http::{header, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::errors::AppError;
use crate::handlers::{self, AppState};

/// Request size limit: inquiry payloads are a handful of short fields.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Inquiry routes. POST saves, OPTIONS is a no-op, anything else is 405.
pub fn inquiry_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/save-complex",
            post(handlers::save_complex)
                .options(handlers::preflight)
                .fallback(handlers::reject_complex_method),
        )
        .route(
            "/api/save-data",
            post(handlers::save_data)
                .options(handlers::preflight)
                .fallback(handlers::reject_data_method),
        )
}

/// Wildcard origin, POST/OPTIONS, `Content-Type`.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Assembles the full application around `inquiry`, which callers may wrap in extra
/// layers (rate limiting) before handing it in.
pub fn build_router(state: Arc<AppState>, inquiry: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(inquiry)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::map_response(json_error_bodies))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// Rewrites the plain-text 413 and 429 bodies produced by the body limit and the rate
/// limiter into the JSON error shape. Headers such as `retry-after` are kept.
async fn json_error_bodies(response: Response) -> Response {
    let err = match response.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge,
        StatusCode::TOO_MANY_REQUESTS => AppError::RateLimited,
        _ => return response,
    };

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if is_json {
        return response;
    }

    tracing::warn!(code = err.code(), "Request refused before reaching a handler");

    let mut replacement = err.into_response();
    for (name, value) in response.headers() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            replacement.headers_mut().append(name.clone(), value.clone());
        }
    }
    replacement
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_plain_rate_limit_response_becomes_json() {
        let app = Router::new()
            .route(
                "/limited",
                get(|| async {
                    (
                        StatusCode::TOO_MANY_REQUESTS,
                        [(header::RETRY_AFTER, "3")],
                        "Too Many Requests! Wait for 3s",
                    )
                }),
            )
            .layer(middleware::map_response(json_error_bodies));

        let request = Request::builder()
            .uri("/limited")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "3");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "rate_limited");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_statuses_pass_through() {
        let app = Router::new()
            .route("/teapot", get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }))
            .layer(middleware::map_response(json_error_bodies));

        let request = Request::builder()
            .uri("/teapot")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"short and stout");
    }
}
