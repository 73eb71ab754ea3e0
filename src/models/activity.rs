use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::content;
use crate::models::profile::Profile;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    FriendRequest,
    CircleInvite,
    CircleJoin,
    CircleJoinRequest,
    Followed,
    AlbumLike,
    AlbumComment,
    CircleNewMember,
}

impl ActivityKind {
    /// Kinds that wait for the recipient to accept or decline.
    pub fn is_request(self) -> bool {
        matches!(
            self,
            ActivityKind::FriendRequest | ActivityKind::CircleInvite | ActivityKind::CircleJoinRequest
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::FriendRequest => "friend_request",
            ActivityKind::CircleInvite => "circle_invite",
            ActivityKind::CircleJoin => "circle_join",
            ActivityKind::CircleJoinRequest => "circle_join_request",
            ActivityKind::Followed => "followed",
            ActivityKind::AlbumLike => "album_like",
            ActivityKind::AlbumComment => "album_comment",
            ActivityKind::CircleNewMember => "circle_new_member",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution state of a request-shaped activity. Informational rows carry none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Pending,
    Accepted,
    Declined,
}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityStatus::Pending => "pending",
            ActivityStatus::Accepted => "accepted",
            ActivityStatus::Declined => "declined",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Accept,
    Decline,
}

impl RequestAction {
    pub fn resulting_status(self) -> ActivityStatus {
        match self {
            RequestAction::Accept => ActivityStatus::Accepted,
            RequestAction::Decline => ActivityStatus::Declined,
        }
    }
}

/// Typed body of an activity, one variant per kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ActivityPayload {
    FriendRequest {
        requester_id: i64,
    },
    CircleInvite {
        inviter_id: i64,
        invitee_id: i64,
        circle_id: i64,
        circle_name: String,
    },
    CircleJoinRequest {
        requester_id: i64,
        circle_id: i64,
        circle_name: String,
    },
    Followed {
        actor_id: i64,
        accepted_request: bool,
    },
    CircleJoin {
        actor_id: i64,
        circle_id: i64,
        circle_name: String,
    },
    CircleNewMember {
        actor_id: i64,
        circle_id: i64,
        circle_name: String,
    },
    AlbumLike {
        actor_id: i64,
        album_id: i64,
        album_title: String,
    },
    AlbumComment {
        actor_id: i64,
        album_id: i64,
        album_title: String,
    },
}

impl ActivityPayload {
    pub fn kind(&self) -> ActivityKind {
        match self {
            ActivityPayload::FriendRequest { .. } => ActivityKind::FriendRequest,
            ActivityPayload::CircleInvite { .. } => ActivityKind::CircleInvite,
            ActivityPayload::CircleJoinRequest { .. } => ActivityKind::CircleJoinRequest,
            ActivityPayload::Followed { .. } => ActivityKind::Followed,
            ActivityPayload::CircleJoin { .. } => ActivityKind::CircleJoin,
            ActivityPayload::CircleNewMember { .. } => ActivityKind::CircleNewMember,
            ActivityPayload::AlbumLike { .. } => ActivityKind::AlbumLike,
            ActivityPayload::AlbumComment { .. } => ActivityKind::AlbumComment,
        }
    }

    /// The user whose action produced the activity.
    pub fn actor_id(&self) -> i64 {
        match self {
            ActivityPayload::FriendRequest { requester_id }
            | ActivityPayload::CircleJoinRequest { requester_id, .. } => *requester_id,
            ActivityPayload::CircleInvite { inviter_id, .. } => *inviter_id,
            ActivityPayload::Followed { actor_id, .. }
            | ActivityPayload::CircleJoin { actor_id, .. }
            | ActivityPayload::CircleNewMember { actor_id, .. }
            | ActivityPayload::AlbumLike { actor_id, .. }
            | ActivityPayload::AlbumComment { actor_id, .. } => *actor_id,
        }
    }

    pub fn circle_id(&self) -> Option<i64> {
        match self {
            ActivityPayload::CircleInvite { circle_id, .. }
            | ActivityPayload::CircleJoinRequest { circle_id, .. }
            | ActivityPayload::CircleJoin { circle_id, .. }
            | ActivityPayload::CircleNewMember { circle_id, .. } => Some(*circle_id),
            _ => None,
        }
    }

    pub fn circle_name(&self) -> Option<&str> {
        match self {
            ActivityPayload::CircleInvite { circle_name, .. }
            | ActivityPayload::CircleJoinRequest { circle_name, .. }
            | ActivityPayload::CircleJoin { circle_name, .. }
            | ActivityPayload::CircleNewMember { circle_name, .. } => Some(circle_name),
            _ => None,
        }
    }

    /// Legacy `content` string for this payload, kept for readers that still
    /// parse the free-text field.
    pub fn encode_content(&self, actor: &Profile) -> String {
        match self {
            ActivityPayload::FriendRequest { requester_id } => {
                content::encode_friend_request(*requester_id)
            }
            ActivityPayload::CircleInvite { inviter_id, invitee_id, circle_name, .. } => {
                content::encode_circle_invite(*inviter_id, *invitee_id, circle_name)
            }
            ActivityPayload::CircleJoinRequest { requester_id, circle_name, .. } => {
                content::encode_circle_join_request(*requester_id, circle_name)
            }
            ActivityPayload::Followed { accepted_request, .. } => {
                content::encode_followed(&actor.name, &actor.username, *accepted_request)
            }
            ActivityPayload::CircleJoin { circle_name, .. } => {
                content::encode_circle_join(&actor.name, circle_name)
            }
            ActivityPayload::CircleNewMember { circle_name, .. } => {
                content::encode_circle_new_member(&actor.name, circle_name)
            }
            ActivityPayload::AlbumLike { album_title, .. } => {
                content::encode_album_like(&actor.name, &actor.username, album_title)
            }
            ActivityPayload::AlbumComment { album_title, .. } => {
                content::encode_album_comment(&actor.name, &actor.username, album_title)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Recipient of the notification.
    pub user_id: i64,
    pub circle_id: Option<i64>,
    pub content: String,
    pub payload: Option<ActivityPayload>,
    pub status: Option<ActivityStatus>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Activity {
    /// Actor from the payload, falling back to decoding legacy content.
    pub fn actor_id(&self) -> Option<i64> {
        match &self.payload {
            Some(payload) => Some(payload.actor_id()),
            None => content::decode_actor_for(self.kind, &self.content),
        }
    }

    pub fn circle_name(&self) -> Option<String> {
        match self.payload.as_ref().and_then(ActivityPayload::circle_name) {
            Some(name) => Some(name.to_string()),
            None => content::decode_circle_name(&self.content),
        }
    }
}

/// An activity ready to be stored.
#[derive(Debug, Clone, Serialize)]
pub struct NewActivity {
    pub user_id: i64,
    pub kind: ActivityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circle_id: Option<i64>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<ActivityPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActivityStatus>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl NewActivity {
    pub fn new(recipient_id: i64, payload: ActivityPayload, actor: &Profile) -> Self {
        let kind = payload.kind();
        Self {
            user_id: recipient_id,
            kind,
            circle_id: payload.circle_id(),
            content: payload.encode_content(actor),
            payload: Some(payload),
            status: kind.is_request().then_some(ActivityStatus::Pending),
            created_at: Utc::now(),
        }
    }

    /// A row in the free-text encoding only, as older writers produced them.
    pub fn legacy(
        recipient_id: i64,
        kind: ActivityKind,
        circle_id: Option<i64>,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: recipient_id,
            kind,
            circle_id,
            content,
            payload: None,
            status: kind.is_request().then_some(ActivityStatus::Pending),
            created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequestBody {
    pub id: i64,
    pub action: RequestAction,
}

/// Like or comment on an album, reported by the album service.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AlbumEventRequest {
    pub owner_id: i64,
    #[validate(length(min = 1, max = 200, message = "Album title must be between 1 and 200 characters"))]
    pub album_title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportActivity {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub circle_id: Option<i64>,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ImportActivity> for NewActivity {
    fn from(row: ImportActivity) -> Self {
        NewActivity::legacy(
            row.user_id,
            row.kind,
            row.circle_id,
            row.content,
            row.created_at.unwrap_or_else(Utc::now),
        )
    }
}
