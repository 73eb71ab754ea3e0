use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};

use crate::error::AppError;
use crate::models::common::CurrentUser;

/// Set by the gateway after it authenticates the caller.
pub const USER_ID_HEADER: &str = "X-User-Id";

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(current_user(req))
    }
}

fn current_user(req: &HttpRequest) -> Result<CurrentUser, AppError> {
    let id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or(AppError::Unauthorized)?;

    Ok(CurrentUser { id })
}
