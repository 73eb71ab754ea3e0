use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Member,
    Moderator,
    Admin,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub id: i64,
    pub name: String,
    pub creator_id: i64,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: i64,
    pub circle_id: i64,
    pub user_id: i64,
    pub role: MemberRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub id: i64,
    pub follower_id: i64,
    pub following_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCircleRequest {
    #[validate(custom = "validate_circle_name")]
    pub name: String,
    pub is_private: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JoinOutcome {
    Joined,
    Requested,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCircle {
    pub name: String,
    pub creator_id: i64,
    pub is_private: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl NewCircle {
    pub fn new(request: CreateCircleRequest, creator_id: i64) -> Self {
        Self {
            name: request.name.trim().to_string(),
            creator_id,
            is_private: request.is_private.unwrap_or(false),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMembership {
    pub circle_id: i64,
    pub user_id: i64,
    pub role: MemberRole,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl NewMembership {
    pub fn new(circle_id: i64, user_id: i64, role: MemberRole) -> Self {
        Self {
            circle_id,
            user_id,
            role,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewFollow {
    pub follower_id: i64,
    pub following_id: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl NewFollow {
    pub fn new(follower_id: i64, following_id: i64) -> Self {
        Self {
            follower_id,
            following_id,
            created_at: Utc::now(),
        }
    }
}

/// Checks the name as it will be stored, after trimming.
fn validate_circle_name(name: &str) -> Result<(), ValidationError> {
    if !(1..=80).contains(&name.trim().chars().count()) {
        let mut error = ValidationError::new("invalid_circle_name");
        error.message = Some(Cow::from("Circle name must be between 1 and 80 characters"));
        return Err(error);
    }

    Ok(())
}
