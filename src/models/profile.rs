use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub avatar: Option<String>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
}

/// The slice of a profile merged into feed rows.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActorSummary {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub avatar: Option<String>,
}

impl From<&Profile> for ActorSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
            username: profile.username.clone(),
            avatar: profile.avatar.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(custom = "validate_username")]
    pub username: String,

    #[validate(url(message = "Avatar must be a URL"))]
    pub avatar: Option<String>,

    pub is_private: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub is_private: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl NewProfile {
    pub fn new(request: CreateProfileRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            username: request.username.to_lowercase(),
            avatar: request.avatar,
            is_private: request.is_private.unwrap_or(false),
            created_at: Utc::now(),
        }
    }
}

/// Result of a follow attempt.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FollowOutcome {
    AlreadyFollowing,
    Requested,
    Followed,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    let valid_length = (3..=30).contains(&username.len());
    let valid_chars = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');

    if !valid_length || !valid_chars {
        return Err(ValidationError::new("invalid_username"));
    }

    Ok(())
}
