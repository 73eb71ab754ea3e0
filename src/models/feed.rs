use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::activity::{Activity, ActivityKind, ActivityPayload, ActivityStatus};
use crate::models::content;
use crate::models::profile::ActorSummary;

const UNKNOWN_ACTOR: &str = "Someone";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyBucket {
    New,
    Today,
    ThisWeek,
}

impl RecencyBucket {
    /// Bucket for an activity of the given age. Anything a week old or older
    /// falls outside every bucket.
    pub fn for_age(age: Duration) -> Option<Self> {
        if age < Duration::hours(1) {
            Some(RecencyBucket::New)
        } else if age < Duration::hours(24) {
            Some(RecencyBucket::Today)
        } else if age < Duration::hours(168) {
            Some(RecencyBucket::ThisWeek)
        } else {
            None
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedActivities {
    pub new: Vec<ActivityView>,
    pub today: Vec<ActivityView>,
    pub this_week: Vec<ActivityView>,
}

impl GroupedActivities {
    /// Splits views into recency buckets, preserving their order. Returns the
    /// grouping and the number of views that fell outside every bucket.
    pub fn group(now: DateTime<Utc>, views: Vec<ActivityView>) -> (Self, usize) {
        let mut grouped = Self {
            new: Vec::new(),
            today: Vec::new(),
            this_week: Vec::new(),
        };
        let mut dropped = 0;

        for view in views {
            match RecencyBucket::for_age(now.signed_duration_since(view.created_at)) {
                Some(RecencyBucket::New) => grouped.new.push(view),
                Some(RecencyBucket::Today) => grouped.today.push(view),
                Some(RecencyBucket::ThisWeek) => grouped.this_week.push(view),
                None => dropped += 1,
            }
        }

        (grouped, dropped)
    }
}

/// Short "time ago" label shown next to each activity.
pub fn relative_time(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);

    if elapsed < Duration::minutes(1) {
        "just now".to_string()
    } else if elapsed < Duration::hours(1) {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed < Duration::days(1) {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed < Duration::days(7) {
        format!("{}d ago", elapsed.num_days())
    } else {
        then.format("%b %-d, %Y").to_string()
    }
}

/// Human-readable sentence for an activity, rendered at read time.
pub fn render_message(activity: &Activity, actor: Option<&ActorSummary>) -> String {
    let actor_name = actor.map_or(UNKNOWN_ACTOR, |actor| actor.name.as_str());

    let Some(payload) = &activity.payload else {
        return render_legacy(activity, actor_name);
    };

    match payload {
        ActivityPayload::FriendRequest { .. } => format!("{actor_name} wants to follow you"),
        ActivityPayload::CircleInvite { circle_name, .. } => {
            format!("{actor_name} invited you to join \"{circle_name}\"")
        }
        ActivityPayload::CircleJoinRequest { circle_name, .. } => {
            format!("{actor_name} wants to join \"{circle_name}\"")
        }
        ActivityPayload::Followed { accepted_request: false, .. } => {
            format!("{actor_name} started following you")
        }
        ActivityPayload::Followed { accepted_request: true, .. } => {
            format!("{actor_name} accepted your follow request")
        }
        ActivityPayload::CircleJoin { actor_id, circle_name, .. } => {
            let who = if *actor_id == activity.user_id { "You" } else { actor_name };
            format!("{who} joined the circle \"{circle_name}\"")
        }
        ActivityPayload::CircleNewMember { circle_name, .. } => {
            format!("{actor_name} joined your circle \"{circle_name}\"")
        }
        ActivityPayload::AlbumLike { album_title, .. } => {
            format!("{actor_name} liked your album \"{album_title}\"")
        }
        ActivityPayload::AlbumComment { album_title, .. } => {
            format!("{actor_name} commented on your album \"{album_title}\"")
        }
    }
}

fn render_legacy(activity: &Activity, actor_name: &str) -> String {
    let actor_id = activity.actor_id();
    let stripped = content::strip_requester_suffix(&activity.content);

    content::substitute_user_tokens(&stripped, |id| {
        if id == activity.user_id {
            "you".to_string()
        } else if Some(id) == actor_id {
            actor_name.to_string()
        } else {
            UNKNOWN_ACTOR.to_string()
        }
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub user_id: i64,
    pub circle_id: Option<i64>,
    pub circle_name: Option<String>,
    pub content: String,
    pub message: String,
    pub status: Option<ActivityStatus>,
    pub created_at: DateTime<Utc>,
    pub relative_time: String,
    pub actor: Option<ActorSummary>,
    /// Username to link to, from the resolved actor or a sentence-encoded row.
    pub actor_handle: Option<String>,
}

impl ActivityView {
    pub fn new(activity: Activity, actor: Option<ActorSummary>, now: DateTime<Utc>) -> Self {
        let actor_handle = match &actor {
            Some(actor) => Some(actor.username.clone()),
            None if activity.payload.is_none() && activity.kind == ActivityKind::Followed => {
                content::decode_follower_handle(&activity.content)
            }
            None => None,
        };

        Self {
            message: render_message(&activity, actor.as_ref()),
            actor_handle,
            circle_name: activity.circle_name(),
            relative_time: relative_time(now, activity.created_at),
            id: activity.id,
            kind: activity.kind,
            user_id: activity.user_id,
            circle_id: activity.circle_id,
            content: activity.content,
            status: activity.status,
            created_at: activity.created_at,
            actor,
        }
    }
}

/// Friend request or circle join request with its requester merged in.
#[derive(Debug, Serialize)]
pub struct RequestView {
    #[serde(flatten)]
    pub activity: ActivityView,
    pub requester: Option<ActorSummary>,
}

impl From<ActivityView> for RequestView {
    fn from(activity: ActivityView) -> Self {
        Self {
            requester: activity.actor.clone(),
            activity,
        }
    }
}

/// Circle invite with its inviter merged in.
#[derive(Debug, Serialize)]
pub struct InviteView {
    #[serde(flatten)]
    pub activity: ActivityView,
    pub inviter: Option<ActorSummary>,
}

impl From<ActivityView> for InviteView {
    fn from(activity: ActivityView) -> Self {
        Self {
            inviter: activity.actor.clone(),
            activity,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub activities: Vec<ActivityView>,
    pub has_follow_requests: bool,
    pub has_circle_invites: bool,
    pub follow_requests_count: u64,
    pub circle_invites_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn activity(kind: ActivityKind, content: &str, created_at: DateTime<Utc>) -> Activity {
        Activity {
            id: 1,
            kind,
            user_id: 99,
            circle_id: None,
            content: content.to_string(),
            payload: None,
            status: kind.is_request().then_some(ActivityStatus::Pending),
            created_at,
            resolved_at: None,
        }
    }

    fn ana() -> ActorSummary {
        ActorSummary {
            id: 7,
            name: "Ana".to_string(),
            username: "ana".to_string(),
            avatar: None,
        }
    }

    #[test]
    fn test_recency_buckets() {
        assert_eq!(RecencyBucket::for_age(Duration::minutes(30)), Some(RecencyBucket::New));
        assert_eq!(RecencyBucket::for_age(Duration::hours(5)), Some(RecencyBucket::Today));
        assert_eq!(RecencyBucket::for_age(Duration::days(3)), Some(RecencyBucket::ThisWeek));
        assert_eq!(RecencyBucket::for_age(Duration::days(10)), None);

        assert_eq!(RecencyBucket::for_age(Duration::hours(1)), Some(RecencyBucket::Today));
        assert_eq!(RecencyBucket::for_age(Duration::hours(168)), None);
    }

    #[test]
    fn test_grouping_drops_old_activities() {
        let now = Utc::now();
        let views = [30, 5 * 60, 3 * 24 * 60, 10 * 24 * 60]
            .into_iter()
            .map(|minutes| {
                let row = activity(ActivityKind::Followed, "Ana (ana) started following you", now - Duration::minutes(minutes));
                ActivityView::new(row, None, now)
            })
            .collect();

        let (grouped, dropped) = GroupedActivities::group(now, views);
        assert_eq!(grouped.new.len(), 1);
        assert_eq!(grouped.today.len(), 1);
        assert_eq!(grouped.this_week.len(), 1);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_relative_time() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        assert_eq!(relative_time(now, now - Duration::seconds(20)), "just now");
        assert_eq!(relative_time(now, now - Duration::minutes(30)), "30m ago");
        assert_eq!(relative_time(now, now - Duration::hours(5)), "5h ago");
        assert_eq!(relative_time(now, now - Duration::days(3)), "3d ago");
        assert_eq!(relative_time(now, now - Duration::days(10)), "May 10, 2024");
    }

    #[test]
    fn test_render_payload_messages() {
        let mut row = activity(ActivityKind::CircleInvite, "", Utc::now());
        row.payload = Some(ActivityPayload::CircleInvite {
            inviter_id: 7,
            invitee_id: 99,
            circle_id: 3,
            circle_name: "Rock Fans".to_string(),
        });
        assert_eq!(render_message(&row, Some(&ana())), r#"Ana invited you to join "Rock Fans""#);
        assert_eq!(render_message(&row, None), r#"Someone invited you to join "Rock Fans""#);

        row.kind = ActivityKind::CircleJoin;
        row.payload = Some(ActivityPayload::CircleJoin {
            actor_id: 99,
            circle_id: 3,
            circle_name: "Rock Fans".to_string(),
        });
        assert_eq!(render_message(&row, None), r#"You joined the circle "Rock Fans""#);
    }

    #[test]
    fn test_render_legacy_content() {
        let invite = activity(
            ActivityKind::CircleInvite,
            r#"user:7 invited user:99 to join "Rock Fans""#,
            Utc::now(),
        );
        assert_eq!(render_message(&invite, Some(&ana())), r#"Ana invited you to join "Rock Fans""#);

        let join_request = activity(
            ActivityKind::CircleJoinRequest,
            r#"user:7 wants to join "Hikers" (requester:7)"#,
            Utc::now(),
        );
        assert_eq!(render_message(&join_request, None), r#"Someone wants to join "Hikers""#);

        let followed = activity(ActivityKind::Followed, "Ana (ana) started following you", Utc::now());
        assert_eq!(render_message(&followed, None), "Ana (ana) started following you");
    }

    #[test]
    fn test_request_view_exposes_requester() {
        let now = Utc::now();
        let row = activity(ActivityKind::FriendRequest, "user:7 wants to follow you", now);
        let view = RequestView::from(ActivityView::new(row, Some(ana()), now));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "friend_request");
        assert_eq!(json["requester"]["username"], "ana");
        assert_eq!(json["message"], "Ana wants to follow you");
        assert_eq!(json["relativeTime"], "just now");
        assert_eq!(json["actorHandle"], "ana");
    }

    #[test]
    fn test_handle_from_sentence_content() {
        let now = Utc::now();
        let row = activity(ActivityKind::Followed, "Ana Lima (analima) started following you", now);
        let view = ActivityView::new(row, None, now);
        assert_eq!(view.actor_handle.as_deref(), Some("analima"));
    }
}
