// src/api/routes.rs
use actix_web::web;

use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health_check))
        .route("/analyze", web::post().to(handlers::analyze))
        .route("/api/analyze", web::post().to(handlers::analyze_entry));
}
