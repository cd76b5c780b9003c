use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use super::client_ip;
use crate::logging::REQUEST_TARGET;

/// Log `<ip> <method> <uri> <status> <ms>ms` once the response is ready
pub async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let ip = client_ip(&request);
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    log::info!(
        target: REQUEST_TARGET,
        "{} {} {} {} {}ms",
        ip,
        method,
        uri,
        response.status().as_u16(),
        start.elapsed().as_millis()
    );
    response
}
