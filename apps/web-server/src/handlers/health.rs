//! Health check endpoint.

use actix_web::HttpResponse;
use yatube_shared::HealthResponse;

/// GET /health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::ok(env!("CARGO_PKG_VERSION")))
}
