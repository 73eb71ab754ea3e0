//! Encoding and decoding of the free-text `content` carried by activities.
//!
//! Two conventions live side by side in stored rows. Request-shaped types use a
//! structured prefix (`user:<id> ...`) that can be parsed back into ids, while
//! informational types store a pre-rendered sentence that only yields names.
//! Every decoder returns `None` when its pattern is absent.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::models::activity::ActivityKind;

static USER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"user:(\d+)").expect("user token pattern"));
static INVITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"user:(\d+) invited").expect("inviter pattern"));
static INVITE_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"invited user:(\d+)").expect("invite target pattern"));
static REQUESTER_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(requester:(\d+)\)").expect("requester suffix pattern"));
static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").expect("parenthesized pattern"));

// Order matters, the first pattern that matches wins.
static CIRCLE_NAME: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r#"your circle "([^"]+)""#).expect("your circle pattern"),
        Regex::new(r#"joined the circle "([^"]+)""#).expect("quoted circle pattern"),
        Regex::new(r"joined the circle (.+)$").expect("bare circle pattern"),
    ]
});

const STARTED_FOLLOWING: &str = " started following";
const ACCEPTED: &str = " accepted";

pub fn encode_friend_request(requester_id: i64) -> String {
    format!("user:{requester_id} wants to follow you")
}

pub fn encode_circle_invite(inviter_id: i64, target_id: i64, circle_name: &str) -> String {
    format!("user:{inviter_id} invited user:{target_id} to join \"{circle_name}\"")
}

/// The trailing `(requester:<id>)` suffix is machine-readable and is removed
/// by [`strip_requester_suffix`] before display.
pub fn encode_circle_join_request(requester_id: i64, circle_name: &str) -> String {
    format!("user:{requester_id} wants to join \"{circle_name}\" (requester:{requester_id})")
}

pub fn encode_followed(actor_name: &str, actor_username: &str, accepted_request: bool) -> String {
    if accepted_request {
        format!("{actor_name} ({actor_username}) accepted your follow request")
    } else {
        format!("{actor_name} ({actor_username}) started following you")
    }
}

pub fn encode_circle_join(actor_name: &str, circle_name: &str) -> String {
    format!("{actor_name} joined the circle \"{circle_name}\"")
}

pub fn encode_circle_new_member(actor_name: &str, circle_name: &str) -> String {
    format!("{actor_name} joined your circle \"{circle_name}\"")
}

pub fn encode_album_like(actor_name: &str, actor_username: &str, album_title: &str) -> String {
    format!("{actor_name} ({actor_username}) liked your album \"{album_title}\"")
}

pub fn encode_album_comment(actor_name: &str, actor_username: &str, album_title: &str) -> String {
    format!("{actor_name} ({actor_username}) commented on your album \"{album_title}\"")
}

fn capture_id(pattern: &Regex, content: &str) -> Option<i64> {
    pattern
        .captures(content)
        .and_then(|caps| caps.get(1))
        .and_then(|id| id.as_str().parse().ok())
}

/// First `user:<id>` token in the content.
pub fn decode_actor_id(content: &str) -> Option<i64> {
    capture_id(&USER_TOKEN, content)
}

pub fn decode_inviter_id(content: &str) -> Option<i64> {
    capture_id(&INVITER, content)
}

pub fn decode_invite_target_id(content: &str) -> Option<i64> {
    capture_id(&INVITE_TARGET, content)
}

pub fn decode_requester_suffix(content: &str) -> Option<i64> {
    capture_id(&REQUESTER_SUFFIX, content)
}

pub fn decode_circle_name(content: &str) -> Option<String> {
    CIRCLE_NAME
        .iter()
        .find_map(|pattern| pattern.captures(content))
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Handle of whoever followed the recipient, used to link to their profile.
///
/// Prefers the parenthesized username and falls back to the display name in
/// front of the verb.
pub fn decode_follower_handle(content: &str) -> Option<String> {
    if let Some(handle) = PARENTHESIZED.captures(content).and_then(|caps| caps.get(1)) {
        return Some(handle.as_str().to_string());
    }

    [STARTED_FOLLOWING, ACCEPTED]
        .iter()
        .find_map(|verb| content.find(*verb))
        .map(|end| content[..end].trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Actor id recoverable from the content of a row of the given kind.
///
/// Sentence-encoded kinds never carry an id and always yield `None`.
pub fn decode_actor_for(kind: ActivityKind, content: &str) -> Option<i64> {
    match kind {
        ActivityKind::CircleInvite => decode_inviter_id(content),
        ActivityKind::FriendRequest => decode_actor_id(content),
        ActivityKind::CircleJoinRequest => {
            decode_requester_suffix(content).or_else(|| decode_actor_id(content))
        }
        ActivityKind::Followed
        | ActivityKind::CircleJoin
        | ActivityKind::CircleNewMember
        | ActivityKind::AlbumLike
        | ActivityKind::AlbumComment => None,
    }
}

pub fn strip_requester_suffix(content: &str) -> String {
    REQUESTER_SUFFIX.replace_all(content, "").trim().to_string()
}

/// Replaces every `user:<id>` token with the name `resolve` returns for it.
pub fn substitute_user_tokens<F>(content: &str, resolve: F) -> String
where
    F: Fn(i64) -> String,
{
    USER_TOKEN
        .replace_all(content, |caps: &Captures<'_>| match caps[1].parse() {
            Ok(id) => resolve(id),
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}
