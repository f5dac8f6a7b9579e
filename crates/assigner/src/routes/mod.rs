use axum::{Router, http::StatusCode, middleware};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use self::error::ErrorResponse;
use crate::{AppState, middleware::version::add_version_headers};

pub mod error;
pub mod pull_requests;
pub mod stats;
pub mod teams;
pub mod users;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(stats::router())
        .merge(teams::router())
        .merge(users::router())
        .merge(pull_requests::router())
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn(add_version_headers))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

async fn method_not_allowed() -> ErrorResponse {
    ErrorResponse::new(
        StatusCode::METHOD_NOT_ALLOWED,
        "METHOD_NOT_ALLOWED",
        "method not allowed",
    )
}
