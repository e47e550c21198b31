use super::webhook;
use actix_web::{web, Scope};

pub fn routes() -> Scope {
    web::scope("/api").service(webhook::routes())
}
