use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

use crate::RqAppContext;

/// Liveness check for load balancers and process monitors
#[get("")]
pub async fn liveness_check(ctx: RqAppContext) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
        "feeds": ctx.feed_urls.len()
    }))
}

pub fn routes() -> actix_web::Scope {
    web::scope("/health").service(liveness_check)
}
