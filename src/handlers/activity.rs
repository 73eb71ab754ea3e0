use actix_web::{
    get, post,
    web::{Data, Json, Query},
    HttpResponse,
};

use crate::error::AppResult;
use crate::models::{
    activity::ImportActivity,
    common::{ApiResponse, CurrentUser, LimitQuery},
};
use crate::services::activity::ActivityService;

#[get("")]
pub async fn get_feed(
    user: CurrentUser,
    service: Data<ActivityService>,
    query: Query<LimitQuery>,
) -> AppResult<HttpResponse> {
    let feed = service.feed(&user, query.limit).await?;
    Ok(HttpResponse::Ok().json(feed))
}

#[get("/grouped")]
pub async fn get_grouped_feed(
    user: CurrentUser,
    service: Data<ActivityService>,
) -> AppResult<HttpResponse> {
    let grouped = service.grouped_feed(&user).await?;
    Ok(HttpResponse::Ok().json(grouped))
}

/// Loads rows written by older clients in the free-text encoding.
#[post("/import")]
pub async fn import_activities(
    user: CurrentUser,
    service: Data<ActivityService>,
    rows: Json<Vec<ImportActivity>>,
) -> AppResult<HttpResponse> {
    let imported = service.import_legacy(&user, rows.into_inner()).await?;
    log::info!("User {} imported {} activities", user.id, imported);

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        imported,
        format!("Imported {imported} activities"),
    )))
}
