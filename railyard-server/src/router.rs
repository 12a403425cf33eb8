use actix_web::web;

use crate::error::AppError;
use crate::{ServerError, health, routes, timetables, trains, upload, version};

/// Reject unreadable JSON bodies with the same error shape as every other
/// failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ServerError::from(AppError::MalformedRequest {
            reason: err.to_string(),
        })
        .into()
    })
}

pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health::get))
        .route("/version", web::get().to(version::get))
        .service(
            web::scope("/api")
                .route("/routes", web::get().to(routes::list))
                .route("/routes", web::post().to(routes::create))
                .route("/routes/{id}", web::get().to(routes::get))
                .route("/routes/{id}", web::put().to(routes::update))
                .route("/routes/{id}", web::delete().to(routes::delete))
                .route("/routes/{id}/trains", web::get().to(routes::trains))
                .route(
                    "/routes/{id}/trains/{train_id}",
                    web::put().to(routes::add_train),
                )
                .route(
                    "/routes/{id}/trains/{train_id}",
                    web::delete().to(routes::remove_train),
                )
                .route("/routes/{id}/timetables", web::get().to(routes::timetables))
                .route("/trains", web::get().to(trains::list))
                .route("/trains", web::post().to(trains::create))
                .route("/trains/{id}", web::get().to(trains::get))
                .route("/trains/{id}", web::put().to(trains::update))
                .route("/trains/{id}", web::delete().to(trains::delete))
                .route("/trains/{id}/routes", web::get().to(trains::routes))
                .route("/timetables", web::get().to(timetables::list))
                .route("/timetables", web::post().to(timetables::create))
                .route("/timetables/{id}", web::get().to(timetables::get))
                .route("/timetables/{id}", web::put().to(timetables::update))
                .route("/timetables/{id}", web::delete().to(timetables::delete))
                .route(
                    "/timetables/{id}/entries",
                    web::post().to(timetables::add_entry),
                )
                .route("/entries/{id}", web::put().to(timetables::update_entry))
                .route("/entries/{id}", web::delete().to(timetables::delete_entry))
                .route("/upload", web::post().to(upload::post)),
        );
}
