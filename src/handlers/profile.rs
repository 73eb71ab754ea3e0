use actix_web::{
    get, post,
    web::{Data, Json, Path},
    HttpResponse,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    common::{ApiResponse, CurrentUser},
    profile::{CreateProfileRequest, NewProfile},
};
use crate::services::activity::ActivityService;

#[post("")]
pub async fn create_profile(
    service: Data<ActivityService>,
    body: Json<CreateProfileRequest>,
) -> AppResult<HttpResponse> {
    let request = body.into_inner();
    request.validate()?;

    let profile = NewProfile::new(request);
    let db = service.database();
    if db.get_profile_by_username(&profile.username).await?.is_some() {
        return Err(AppError::bad_request(format!(
            "Username {} is already taken",
            profile.username
        )));
    }

    let created = db.create_profile(profile).await?;
    log::info!("Created profile {} ({})", created.id, created.username);

    Ok(HttpResponse::Created().json(ApiResponse::success(created)))
}

#[get("/{profile_id}")]
pub async fn get_profile(
    service: Data<ActivityService>,
    path: Path<i64>,
) -> AppResult<HttpResponse> {
    let profile = service
        .database()
        .get_profile(path.into_inner())
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(profile)))
}

#[post("/{profile_id}/follow")]
pub async fn follow_profile(
    user: CurrentUser,
    service: Data<ActivityService>,
    path: Path<i64>,
) -> AppResult<HttpResponse> {
    let outcome = service.follow(&user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{configure, identity::USER_ID_HEADER, test_support};
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_create_and_fetch_profile() {
        let service = test_support::service().await;
        let app = test::init_service(
            App::new()
                .app_data(service.clone())
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/profiles")
            .set_json(json!({ "name": "Ana Lima", "username": "Ana_Lima", "isPrivate": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["username"], "ana_lima");
        assert_eq!(body["data"]["isPrivate"], true);
        let id = body["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/profiles/{id}"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["name"], "Ana Lima");

        let req = test::TestRequest::post()
            .uri("/api/v1/profiles")
            .set_json(json!({ "name": "Other Ana", "username": "ana_lima" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/v1/profiles")
            .set_json(json!({ "name": "", "username": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/v1/profiles/999").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_follow_outcomes() {
        let service = test_support::service().await;
        let ana = test_support::create_profile(&service, "ana", false).await;
        let ben = test_support::create_profile(&service, "ben", false).await;
        let app = test::init_service(
            App::new()
                .app_data(service.clone())
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await;

        let follow = |target: i64| {
            test::TestRequest::post()
                .uri(&format!("/api/v1/profiles/{target}/follow"))
                .insert_header((USER_ID_HEADER, ana.to_string()))
                .to_request()
        };

        let body: serde_json::Value = test::call_and_read_body_json(&app, follow(ben)).await;
        assert_eq!(body["data"], "followed");
        let body: serde_json::Value = test::call_and_read_body_json(&app, follow(ben)).await;
        assert_eq!(body["data"], "already_following");

        let resp = test::call_service(&app, follow(ana)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
