use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::config::FeedConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    activity::{
        Activity, ActivityKind, ActivityPayload, AlbumEventRequest, ImportActivity, NewActivity,
        RequestAction,
    },
    circle::{Circle, JoinOutcome, MemberRole, NewFollow, NewMembership},
    common::CurrentUser,
    content,
    feed::{ActivityView, FeedResponse, GroupedActivities},
    profile::{ActorSummary, FollowOutcome, Profile},
};
use crate::services::database::{DatabaseService, PreparedWrite, RequestGuard, Write};

/// Kinds shown in the combined feed. Pending friend requests and circle
/// invites have their own lists.
const FEED_KINDS: [ActivityKind; 6] = [
    ActivityKind::CircleJoin,
    ActivityKind::CircleJoinRequest,
    ActivityKind::Followed,
    ActivityKind::AlbumLike,
    ActivityKind::AlbumComment,
    ActivityKind::CircleNewMember,
];

/// Batched profile access used to attach actors to feed rows.
#[allow(async_fn_in_trait)]
pub trait ProfileLookup {
    async fn lookup_profiles(&self, ids: &[i64]) -> anyhow::Result<Vec<Profile>>;
}

impl ProfileLookup for DatabaseService {
    async fn lookup_profiles(&self, ids: &[i64]) -> anyhow::Result<Vec<Profile>> {
        self.profiles_by_ids(ids).await
    }
}

/// Resolves every distinct actor with one lookup and merges them into views.
/// No lookup happens when no actor can be recovered; unknown actors stay `None`.
pub async fn attach_actors<L: ProfileLookup>(
    lookup: &L,
    activities: Vec<Activity>,
    now: DateTime<Utc>,
) -> anyhow::Result<Vec<ActivityView>> {
    let mut ids: Vec<i64> = activities.iter().filter_map(Activity::actor_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let actors: HashMap<i64, ActorSummary> = if ids.is_empty() {
        HashMap::new()
    } else {
        lookup
            .lookup_profiles(&ids)
            .await?
            .iter()
            .map(|profile| (profile.id, ActorSummary::from(profile)))
            .collect()
    };

    Ok(activities
        .into_iter()
        .map(|activity| {
            let actor = activity.actor_id().and_then(|id| actors.get(&id).cloned());
            ActivityView::new(activity, actor, now)
        })
        .collect())
}

#[derive(Clone)]
pub struct ActivityService {
    db: DatabaseService,
    feed: FeedConfig,
}

impl ActivityService {
    pub fn new(db: DatabaseService, feed: FeedConfig) -> Self {
        Self { db, feed }
    }

    pub fn database(&self) -> &DatabaseService {
        &self.db
    }

    pub async fn feed(&self, user: &CurrentUser, limit: Option<u32>) -> AppResult<FeedResponse> {
        let take = limit
            .unwrap_or(self.feed.default_limit)
            .clamp(1, self.feed.max_limit);

        // Two separate reads: profiles may be newer than the activity rows.
        let activities = self.db.list_activities(user.id, &FEED_KINDS, Some(take)).await?;
        let activities = attach_actors(&self.db, activities, Utc::now()).await?;

        let follow_requests_count = self.db.count_pending(user.id, ActivityKind::FriendRequest).await?;
        let circle_invites_count = self.db.count_pending(user.id, ActivityKind::CircleInvite).await?;

        Ok(FeedResponse {
            activities,
            has_follow_requests: follow_requests_count > 0,
            has_circle_invites: circle_invites_count > 0,
            follow_requests_count,
            circle_invites_count,
        })
    }

    pub async fn grouped_feed(&self, user: &CurrentUser) -> AppResult<GroupedActivities> {
        let now = Utc::now();
        let activities = self
            .db
            .list_activities(user.id, &FEED_KINDS, Some(self.feed.max_limit))
            .await?;
        let views = attach_actors(&self.db, activities, now).await?;

        let (grouped, dropped) = GroupedActivities::group(now, views);
        if dropped > 0 {
            log::debug!(
                "Omitted {} activities older than a week from grouped feed of user {}",
                dropped,
                user.id
            );
        }

        Ok(grouped)
    }

    /// Pending requests of `kind` addressed to the user, with actors attached.
    pub async fn pending_requests(
        &self,
        user: &CurrentUser,
        kind: ActivityKind,
    ) -> AppResult<Vec<ActivityView>> {
        if !kind.is_request() {
            return Err(AppError::bad_request(format!("{kind} is not a request type")));
        }

        let activities = self.db.list_activities(user.id, &[kind], None).await?;
        Ok(attach_actors(&self.db, activities, Utc::now()).await?)
    }

    /// Accepts or declines a pending request. Missing rows, rows addressed to
    /// someone else, rows of another kind and already resolved rows are all
    /// reported as not found.
    pub async fn resolve(
        &self,
        user: &CurrentUser,
        kind: ActivityKind,
        request_id: i64,
        action: RequestAction,
    ) -> AppResult<()> {
        let request = self
            .db
            .find_pending_request(request_id, user.id, kind)
            .await?
            .ok_or(AppError::NotFound)?;

        let effects = match action {
            RequestAction::Accept => self.acceptance_effects(&request).await?,
            RequestAction::Decline => Vec::new(),
        };

        let guard = RequestGuard {
            activity_id: request.id,
            recipient_id: user.id,
            kind,
        };
        let resolved = self
            .db
            .resolve_request(guard, action.resulting_status(), effects)
            .await?;

        if !resolved {
            log::warn!("Request {} was resolved concurrently", request.id);
            return Err(AppError::NotFound);
        }

        log::info!(
            "User {} resolved {} {} as {}",
            user.id,
            kind,
            request.id,
            action.resulting_status().as_str()
        );
        Ok(())
    }

    async fn acceptance_effects(&self, request: &Activity) -> AppResult<Vec<PreparedWrite>> {
        let actor_id = request
            .actor_id()
            .ok_or_else(|| AppError::bad_request("request is missing its actor"))?;
        let recipient_id = request.user_id;

        match request.kind {
            ActivityKind::FriendRequest => {
                let requester = self.profile(actor_id).await?;
                let recipient = self.profile(recipient_id).await?;

                let mut writes = Vec::new();
                if self.db.find_follow(requester.id, recipient.id).await?.is_none() {
                    writes.push(Write::Follow(NewFollow::new(requester.id, recipient.id)));
                }
                writes.push(Write::Activity(NewActivity::new(
                    requester.id,
                    ActivityPayload::Followed {
                        actor_id: recipient.id,
                        accepted_request: true,
                    },
                    &recipient,
                )));
                writes.push(Write::Activity(NewActivity::new(
                    recipient.id,
                    ActivityPayload::Followed {
                        actor_id: requester.id,
                        accepted_request: false,
                    },
                    &requester,
                )));

                self.prepare_all(writes).await
            }
            ActivityKind::CircleInvite => {
                if request.payload.is_none() {
                    let target = content::decode_invite_target_id(&request.content);
                    if target.is_some_and(|target| target != recipient_id) {
                        log::warn!(
                            "Invite {} names user {:?} but is addressed to {}",
                            request.id,
                            target,
                            recipient_id
                        );
                    }
                }
                let circle = self.request_circle(request).await?;
                let invitee = self.profile(recipient_id).await?;

                let mut writes = Vec::new();
                if self.db.find_membership(circle.id, invitee.id).await?.is_none() {
                    writes.push(Write::Membership(NewMembership::new(
                        circle.id,
                        invitee.id,
                        MemberRole::Member,
                    )));
                }
                writes.push(Write::Activity(NewActivity::new(
                    circle.creator_id,
                    ActivityPayload::CircleJoin {
                        actor_id: invitee.id,
                        circle_id: circle.id,
                        circle_name: circle.name.clone(),
                    },
                    &invitee,
                )));

                self.prepare_all(writes).await
            }
            ActivityKind::CircleJoinRequest => {
                let circle = self.request_circle(request).await?;
                let requester = self.profile(actor_id).await?;

                let mut writes = Vec::new();
                if self.db.find_membership(circle.id, requester.id).await?.is_none() {
                    writes.push(Write::Membership(NewMembership::new(
                        circle.id,
                        requester.id,
                        MemberRole::Member,
                    )));
                }
                writes.push(Write::Activity(NewActivity::new(
                    requester.id,
                    ActivityPayload::CircleJoin {
                        actor_id: requester.id,
                        circle_id: circle.id,
                        circle_name: circle.name.clone(),
                    },
                    &requester,
                )));

                self.prepare_all(writes).await
            }
            other => Err(AppError::bad_request(format!("{other} is not a request type"))),
        }
    }

    async fn request_circle(&self, request: &Activity) -> AppResult<Circle> {
        let circle_id = request
            .payload
            .as_ref()
            .and_then(ActivityPayload::circle_id)
            .or(request.circle_id)
            .ok_or_else(|| AppError::bad_request("request is missing its circle"))?;

        self.db.get_circle(circle_id).await?.ok_or(AppError::NotFound)
    }

    async fn profile(&self, profile_id: i64) -> AppResult<Profile> {
        self.db.get_profile(profile_id).await?.ok_or(AppError::NotFound)
    }

    async fn prepare_all(&self, writes: Vec<Write>) -> AppResult<Vec<PreparedWrite>> {
        let mut prepared = Vec::with_capacity(writes.len());
        for write in writes {
            prepared.push(self.db.prepare(write).await?);
        }
        Ok(prepared)
    }

    // Producers

    pub async fn follow(&self, user: &CurrentUser, target_id: i64) -> AppResult<FollowOutcome> {
        if user.id == target_id {
            return Err(AppError::bad_request("You cannot follow yourself"));
        }

        let target = self.profile(target_id).await?;
        let follower = self.profile(user.id).await?;

        if self.db.find_follow(follower.id, target.id).await?.is_some() {
            return Ok(FollowOutcome::AlreadyFollowing);
        }

        if target.is_private {
            let open = self
                .db
                .find_open_request(target.id, ActivityKind::FriendRequest, follower.id, None)
                .await?;
            if open.is_none() {
                self.db
                    .create_activity(NewActivity::new(
                        target.id,
                        ActivityPayload::FriendRequest {
                            requester_id: follower.id,
                        },
                        &follower,
                    ))
                    .await?;
                log::info!("User {} requested to follow {}", follower.id, target.id);
            }
            return Ok(FollowOutcome::Requested);
        }

        let writes = self
            .prepare_all(vec![
                Write::Follow(NewFollow::new(follower.id, target.id)),
                Write::Activity(NewActivity::new(
                    target.id,
                    ActivityPayload::Followed {
                        actor_id: follower.id,
                        accepted_request: false,
                    },
                    &follower,
                )),
            ])
            .await?;
        self.db.execute_batch(writes).await?;

        log::info!("User {} followed {}", follower.id, target.id);
        Ok(FollowOutcome::Followed)
    }

    pub async fn invite_to_circle(
        &self,
        user: &CurrentUser,
        circle_id: i64,
        invitee_id: i64,
    ) -> AppResult<Activity> {
        let circle = self.db.get_circle(circle_id).await?.ok_or(AppError::NotFound)?;
        if self.db.find_membership(circle.id, user.id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let inviter = self.profile(user.id).await?;
        let invitee = self.profile(invitee_id).await?;
        if self.db.find_membership(circle.id, invitee.id).await?.is_some() {
            return Err(AppError::bad_request("User is already a member of this circle"));
        }

        if let Some(open) = self
            .db
            .find_open_request(invitee.id, ActivityKind::CircleInvite, inviter.id, Some(circle.id))
            .await?
        {
            return Ok(open);
        }

        let invite = self
            .db
            .create_activity(NewActivity::new(
                invitee.id,
                ActivityPayload::CircleInvite {
                    inviter_id: inviter.id,
                    invitee_id: invitee.id,
                    circle_id: circle.id,
                    circle_name: circle.name,
                },
                &inviter,
            ))
            .await?;

        log::info!("User {} invited {} to circle {}", inviter.id, invitee.id, circle.id);
        Ok(invite)
    }

    pub async fn join_circle(&self, user: &CurrentUser, circle_id: i64) -> AppResult<JoinOutcome> {
        let circle = self.db.get_circle(circle_id).await?.ok_or(AppError::NotFound)?;
        if self.db.find_membership(circle.id, user.id).await?.is_some() {
            return Err(AppError::bad_request("You are already a member of this circle"));
        }

        let member = self.profile(user.id).await?;

        if circle.is_private {
            let open = self
                .db
                .find_open_request(
                    circle.creator_id,
                    ActivityKind::CircleJoinRequest,
                    member.id,
                    Some(circle.id),
                )
                .await?;
            if open.is_none() {
                self.db
                    .create_activity(NewActivity::new(
                        circle.creator_id,
                        ActivityPayload::CircleJoinRequest {
                            requester_id: member.id,
                            circle_id: circle.id,
                            circle_name: circle.name,
                        },
                        &member,
                    ))
                    .await?;
                log::info!("User {} requested to join circle {}", member.id, circle.id);
            }
            return Ok(JoinOutcome::Requested);
        }

        let writes = self
            .prepare_all(vec![
                Write::Membership(NewMembership::new(circle.id, member.id, MemberRole::Member)),
                Write::Activity(NewActivity::new(
                    circle.creator_id,
                    ActivityPayload::CircleNewMember {
                        actor_id: member.id,
                        circle_id: circle.id,
                        circle_name: circle.name,
                    },
                    &member,
                )),
            ])
            .await?;
        self.db.execute_batch(writes).await?;

        log::info!("User {} joined circle {}", member.id, circle.id);
        Ok(JoinOutcome::Joined)
    }

    /// Notifies the album owner of a like or comment. Self-events produce nothing.
    pub async fn notify_album_event(
        &self,
        user: &CurrentUser,
        album_id: i64,
        kind: ActivityKind,
        event: AlbumEventRequest,
    ) -> AppResult<Option<Activity>> {
        if event.owner_id == user.id {
            return Ok(None);
        }

        let actor = self.profile(user.id).await?;
        let owner = self.profile(event.owner_id).await?;

        let payload = match kind {
            ActivityKind::AlbumLike => ActivityPayload::AlbumLike {
                actor_id: actor.id,
                album_id,
                album_title: event.album_title,
            },
            ActivityKind::AlbumComment => ActivityPayload::AlbumComment {
                actor_id: actor.id,
                album_id,
                album_title: event.album_title,
            },
            other => return Err(AppError::bad_request(format!("{other} is not an album event"))),
        };

        let activity = self
            .db
            .create_activity(NewActivity::new(owner.id, payload, &actor))
            .await?;
        Ok(Some(activity))
    }

    /// Stores rows in the free-text encoding only, all or nothing.
    ///
    /// Only informational rows addressed to the caller are accepted, and a
    /// row's circle must be one the caller belongs to. Pending requests come
    /// from the producers above only.
    pub async fn import_legacy(
        &self,
        user: &CurrentUser,
        rows: Vec<ImportActivity>,
    ) -> AppResult<usize> {
        if rows.is_empty() {
            return Err(AppError::bad_request("No activities to import"));
        }

        for row in &rows {
            if row.user_id != user.id {
                log::warn!("User {} tried to import an activity for user {}", user.id, row.user_id);
                return Err(AppError::bad_request("Activities can only be imported for yourself"));
            }
            if row.kind.is_request() {
                log::warn!("User {} tried to import a {} row", user.id, row.kind);
                return Err(AppError::bad_request(format!("{} rows cannot be imported", row.kind)));
            }
            if let Some(circle_id) = row.circle_id {
                if self.db.find_membership(circle_id, user.id).await?.is_none() {
                    log::warn!("User {} tried to import a row for circle {}", user.id, circle_id);
                    return Err(AppError::bad_request("You are not a member of this circle"));
                }
            }
        }

        let count = rows.len();
        let writes = self
            .prepare_all(
                rows.into_iter()
                    .map(|row| Write::Activity(NewActivity::from(row)))
                    .collect(),
            )
            .await?;
        self.db.execute_batch(writes).await?;

        log::info!("Imported {} legacy activities", count);
        Ok(count)
    }
}
