pub mod activity;
pub mod album;
pub mod circle;
pub mod health;
pub mod identity;
pub mod profile;
pub mod requests;

use actix_web::web;

use crate::error::AppError;

/// Registers every route under the caller's scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(
            web::scope("/activities")
                .service(activity::get_feed)
                .service(activity::get_grouped_feed)
                .service(activity::import_activities)
                .service(requests::list_friend_requests)
                .service(requests::resolve_friend_request)
                .service(requests::list_circle_invites)
                .service(requests::resolve_circle_invite)
                .service(requests::list_circle_join_requests)
                .service(requests::resolve_circle_join_request),
        )
        .service(
            web::scope("/profiles")
                .service(profile::create_profile)
                .service(profile::get_profile)
                .service(profile::follow_profile),
        )
        .service(
            web::scope("/circles")
                .service(circle::create_circle)
                .service(circle::get_circle)
                .service(circle::invite_to_circle)
                .service(circle::join_circle),
        )
        .service(
            web::scope("/albums")
                .service(album::like_album)
                .service(album::comment_on_album),
        )
        .route("/health", web::get().to(health::health_check));
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected request body: {}", err);
        AppError::bad_request(err.to_string()).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::bad_request(err.to_string()).into())
}
