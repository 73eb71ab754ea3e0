use actix_web::{
    get, patch,
    web::{Data, Json},
    HttpResponse,
};

use crate::error::AppResult;
use crate::models::{
    activity::{ActivityKind, ResolveRequestBody},
    common::{ApiResponse, CurrentUser},
    feed::{InviteView, RequestView},
};
use crate::services::activity::ActivityService;

async fn resolve(
    user: CurrentUser,
    service: Data<ActivityService>,
    kind: ActivityKind,
    body: ResolveRequestBody,
) -> AppResult<HttpResponse> {
    service.resolve(&user, kind, body.id, body.action).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok()))
}

#[get("/friend-requests")]
pub async fn list_friend_requests(
    user: CurrentUser,
    service: Data<ActivityService>,
) -> AppResult<HttpResponse> {
    let requests: Vec<RequestView> = service
        .pending_requests(&user, ActivityKind::FriendRequest)
        .await?
        .into_iter()
        .map(RequestView::from)
        .collect();
    Ok(HttpResponse::Ok().json(requests))
}

#[patch("/friend-requests")]
pub async fn resolve_friend_request(
    user: CurrentUser,
    service: Data<ActivityService>,
    body: Json<ResolveRequestBody>,
) -> AppResult<HttpResponse> {
    resolve(user, service, ActivityKind::FriendRequest, body.into_inner()).await
}

#[get("/circle-invites")]
pub async fn list_circle_invites(
    user: CurrentUser,
    service: Data<ActivityService>,
) -> AppResult<HttpResponse> {
    let invites: Vec<InviteView> = service
        .pending_requests(&user, ActivityKind::CircleInvite)
        .await?
        .into_iter()
        .map(InviteView::from)
        .collect();
    Ok(HttpResponse::Ok().json(invites))
}

#[patch("/circle-invites")]
pub async fn resolve_circle_invite(
    user: CurrentUser,
    service: Data<ActivityService>,
    body: Json<ResolveRequestBody>,
) -> AppResult<HttpResponse> {
    resolve(user, service, ActivityKind::CircleInvite, body.into_inner()).await
}

#[get("/circle-join-requests")]
pub async fn list_circle_join_requests(
    user: CurrentUser,
    service: Data<ActivityService>,
) -> AppResult<HttpResponse> {
    let requests: Vec<RequestView> = service
        .pending_requests(&user, ActivityKind::CircleJoinRequest)
        .await?
        .into_iter()
        .map(RequestView::from)
        .collect();
    Ok(HttpResponse::Ok().json(requests))
}

#[patch("/circle-join-requests")]
pub async fn resolve_circle_join_request(
    user: CurrentUser,
    service: Data<ActivityService>,
    body: Json<ResolveRequestBody>,
) -> AppResult<HttpResponse> {
    resolve(user, service, ActivityKind::CircleJoinRequest, body.into_inner()).await
}
