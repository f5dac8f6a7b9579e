use axum::{
    body::Body,
    http::{Request, header::HeaderValue},
    middleware::Next,
    response::Response,
};

/// Stamps every response with the running service version.
pub async fn add_version_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        "X-Review-Assigner-Version",
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );

    response
}
