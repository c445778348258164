use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::info;
use std::time::Instant;

/// Log method, path, status and elapsed time for every request.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        "request handled (method={}, path={}, status={}, elapsed_ms={})",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
