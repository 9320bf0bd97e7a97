//! HTTP handlers and route configuration.

mod health;
mod posts;
mod publication;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::error::json_error_handler;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_check))
                .service(
                    web::scope("/posts")
                        // Literal segments first so they are not taken as ids
                        .route("/check-and-publish", web::get().to(publication::check_and_publish))
                        .route("/slug/{slug_id}", web::get().to(posts::find_one_by_slug_id))
                        .route("/uid/{unique_id}", web::get().to(posts::find_one_by_unique_id))
                        .route("", web::get().to(posts::list))
                        .route("", web::post().to(posts::create))
                        .route("/{id}", web::get().to(posts::find_one))
                        .route("/{id}", web::put().to(posts::update))
                        .route("/{id}/schedule", web::patch().to(publication::schedule))
                        .route("/{id}/publish", web::patch().to(publication::publish))
                        .route("/{id}/unpublish", web::patch().to(publication::unpublish)),
                ),
        );
}
