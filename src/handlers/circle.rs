use actix_web::{
    get, post,
    web::{Data, Json, Path},
    HttpResponse,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    circle::{CreateCircleRequest, InviteRequest, NewCircle},
    common::{ApiResponse, CurrentUser},
};
use crate::services::activity::ActivityService;

#[post("")]
pub async fn create_circle(
    user: CurrentUser,
    service: Data<ActivityService>,
    body: Json<CreateCircleRequest>,
) -> AppResult<HttpResponse> {
    let request = body.into_inner();
    request.validate()?;

    let db = service.database();
    if db.get_profile(user.id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let circle = db.create_circle(NewCircle::new(request, user.id)).await?;
    log::info!("User {} created circle {}", user.id, circle.id);

    Ok(HttpResponse::Created().json(ApiResponse::success(circle)))
}

#[get("/{circle_id}")]
pub async fn get_circle(
    service: Data<ActivityService>,
    path: Path<i64>,
) -> AppResult<HttpResponse> {
    let circle = service
        .database()
        .get_circle(path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(circle)))
}

#[post("/{circle_id}/invites")]
pub async fn invite_to_circle(
    user: CurrentUser,
    service: Data<ActivityService>,
    path: Path<i64>,
    body: Json<InviteRequest>,
) -> AppResult<HttpResponse> {
    let invite = service
        .invite_to_circle(&user, path.into_inner(), body.user_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(invite)))
}

#[post("/{circle_id}/join")]
pub async fn join_circle(
    user: CurrentUser,
    service: Data<ActivityService>,
    path: Path<i64>,
) -> AppResult<HttpResponse> {
    let outcome = service.join_circle(&user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{configure, identity::USER_ID_HEADER, test_support};
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_private_circle_join_flow() {
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
            .uri("/api/v1/circles")
            .insert_header((USER_ID_HEADER, ana.to_string()))
            .set_json(json!({ "name": "Hikers", "isPrivate": true }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let circle_id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["creatorId"], ana);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/circles/{circle_id}/join"))
            .insert_header((USER_ID_HEADER, ben.to_string()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], "requested");

        let req = test::TestRequest::get()
            .uri("/api/v1/activities/circle-join-requests")
            .insert_header((USER_ID_HEADER, ana.to_string()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["requester"]["id"], ben);
        let request_id = body[0]["id"].as_i64().unwrap();

        let req = test::TestRequest::patch()
            .uri("/api/v1/activities/circle-join-requests")
            .insert_header((USER_ID_HEADER, ana.to_string()))
            .set_json(json!({ "id": request_id, "action": "accept" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/circles/{circle_id}/join"))
            .insert_header((USER_ID_HEADER, ben.to_string()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_create_circle_validation() {
        let service = test_support::service().await;
        let ana = test_support::create_profile(&service, "ana", false).await;
        let app = test::init_service(
            App::new()
                .app_data(service.clone())
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/circles")
            .insert_header((USER_ID_HEADER, ana.to_string()))
            .set_json(json!({ "name": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/v1/circles")
            .insert_header((USER_ID_HEADER, ana.to_string()))
            .set_json(json!({ "name": "   " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/v1/circles/404").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
