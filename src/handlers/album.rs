use actix_web::{
    post,
    web::{Data, Json, Path},
    HttpResponse,
};
use validator::Validate;

use crate::error::AppResult;
use crate::models::{
    activity::{ActivityKind, AlbumEventRequest},
    common::{ApiResponse, CurrentUser},
};
use crate::services::activity::ActivityService;

async fn notify(
    user: CurrentUser,
    service: Data<ActivityService>,
    album_id: i64,
    kind: ActivityKind,
    event: AlbumEventRequest,
) -> AppResult<HttpResponse> {
    event.validate()?;
    let activity = service.notify_album_event(&user, album_id, kind, event).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(activity)))
}

#[post("/{album_id}/likes")]
pub async fn like_album(
    user: CurrentUser,
    service: Data<ActivityService>,
    path: Path<i64>,
    body: Json<AlbumEventRequest>,
) -> AppResult<HttpResponse> {
    notify(user, service, path.into_inner(), ActivityKind::AlbumLike, body.into_inner()).await
}

#[post("/{album_id}/comments")]
pub async fn comment_on_album(
    user: CurrentUser,
    service: Data<ActivityService>,
    path: Path<i64>,
    body: Json<AlbumEventRequest>,
) -> AppResult<HttpResponse> {
    notify(user, service, path.into_inner(), ActivityKind::AlbumComment, body.into_inner()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{configure, identity::USER_ID_HEADER, test_support};
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_comment_reaches_owner_feed() {
        let service = test_support::service().await;
        let ana = test_support::create_profile(&service, "ana", false).await;
        let ben = test_support::create_profile(&service, "ben", false).await;
        let app = test::init_service(
            App::new()
                .app_data(service.clone())
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/albums/12/comments")
            .insert_header((USER_ID_HEADER, ana.to_string()))
            .set_json(json!({ "ownerId": ben, "albumTitle": "Lisbon" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["type"], "album_comment");
        assert_eq!(body["data"]["content"], "ANA (ana) commented on your album \"Lisbon\"");

        let req = test::TestRequest::get()
            .uri("/api/v1/activities")
            .insert_header((USER_ID_HEADER, ben.to_string()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["activities"][0]["message"], "ANA commented on your album \"Lisbon\"");
        assert_eq!(body["activities"][0]["actor"]["id"], ana);

        let req = test::TestRequest::post()
            .uri("/api/v1/albums/12/likes")
            .insert_header((USER_ID_HEADER, ana.to_string()))
            .set_json(json!({ "ownerId": ben, "albumTitle": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
