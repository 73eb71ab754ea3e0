use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::{
    engine::any::{self, Any},
    opt::auth::Root,
    sql::{Id, Thing},
    Surreal,
};

use crate::config::DatabaseConfig;
use crate::models::{
    activity::{Activity, ActivityKind, ActivityPayload, ActivityStatus, NewActivity},
    circle::{Circle, Follow, MemberRole, Membership, NewCircle, NewFollow, NewMembership},
    profile::{NewProfile, Profile},
};

const SEQUENCE_TABLE: &str = "id_sequence";
const SEQUENCED_TABLES: [&str; 5] = ["activity", "profile", "circle", "membership", "follow"];

#[derive(Clone)]
pub struct DatabaseService {
    db: Surreal<Any>,
}

/// A row created as part of a multi-row write.
#[derive(Debug, Clone)]
pub enum Write {
    Activity(NewActivity),
    Circle(NewCircle),
    Follow(NewFollow),
    Membership(NewMembership),
}

impl Write {
    fn table(&self) -> &'static str {
        match self {
            Write::Activity(_) => "activity",
            Write::Circle(_) => "circle",
            Write::Follow(_) => "follow",
            Write::Membership(_) => "membership",
        }
    }

    fn content(&self) -> Result<serde_json::Value> {
        let value = match self {
            Write::Activity(row) => serde_json::to_value(row)?,
            Write::Circle(row) => serde_json::to_value(row)?,
            Write::Follow(row) => serde_json::to_value(row)?,
            Write::Membership(row) => serde_json::to_value(row)?,
        };
        Ok(value)
    }
}

/// A write with its record id already allocated.
#[derive(Debug, Clone)]
pub struct PreparedWrite {
    pub id: i64,
    table: &'static str,
    content: serde_json::Value,
}

/// Identifies the pending request a resolution applies to.
#[derive(Debug, Clone, Copy)]
pub struct RequestGuard {
    pub activity_id: i64,
    pub recipient_id: i64,
    pub kind: ActivityKind,
}

#[derive(Debug, Serialize, Deserialize)]
struct SequenceRow {
    value: i64,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct ActivityRecord {
    id: Thing,
    user_id: i64,
    kind: ActivityKind,
    circle_id: Option<i64>,
    content: String,
    payload: Option<ActivityPayload>,
    status: Option<ActivityStatus>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ProfileRecord {
    id: Thing,
    name: String,
    username: String,
    avatar: Option<String>,
    is_private: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct CircleRecord {
    id: Thing,
    name: String,
    creator_id: i64,
    is_private: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct MembershipRecord {
    id: Thing,
    circle_id: i64,
    user_id: i64,
    role: MemberRole,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct FollowRecord {
    id: Thing,
    follower_id: i64,
    following_id: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}

fn record_id(thing: &Thing) -> Result<i64> {
    match &thing.id {
        Id::Number(id) => Ok(*id),
        other => Err(anyhow!("Record in {} has a non-numeric id: {}", thing.tb, other)),
    }
}

impl TryFrom<ActivityRecord> for Activity {
    type Error = anyhow::Error;

    fn try_from(record: ActivityRecord) -> Result<Self> {
        Ok(Activity {
            id: record_id(&record.id)?,
            kind: record.kind,
            user_id: record.user_id,
            circle_id: record.circle_id,
            content: record.content,
            payload: record.payload,
            status: record.status,
            created_at: record.created_at,
            resolved_at: record.resolved_at,
        })
    }
}

impl TryFrom<ProfileRecord> for Profile {
    type Error = anyhow::Error;

    fn try_from(record: ProfileRecord) -> Result<Self> {
        Ok(Profile {
            id: record_id(&record.id)?,
            name: record.name,
            username: record.username,
            avatar: record.avatar,
            is_private: record.is_private,
            created_at: record.created_at,
        })
    }
}

impl TryFrom<CircleRecord> for Circle {
    type Error = anyhow::Error;

    fn try_from(record: CircleRecord) -> Result<Self> {
        Ok(Circle {
            id: record_id(&record.id)?,
            name: record.name,
            creator_id: record.creator_id,
            is_private: record.is_private,
            created_at: record.created_at,
        })
    }
}

impl TryFrom<MembershipRecord> for Membership {
    type Error = anyhow::Error;

    fn try_from(record: MembershipRecord) -> Result<Self> {
        Ok(Membership {
            id: record_id(&record.id)?,
            circle_id: record.circle_id,
            user_id: record.user_id,
            role: record.role,
            created_at: record.created_at,
        })
    }
}

impl TryFrom<FollowRecord> for Follow {
    type Error = anyhow::Error;

    fn try_from(record: FollowRecord) -> Result<Self> {
        Ok(Follow {
            id: record_id(&record.id)?,
            follower_id: record.follower_id,
            following_id: record.following_id,
            created_at: record.created_at,
        })
    }
}

fn convert_all<R, T>(records: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = anyhow::Error>,
{
    records.into_iter().map(T::try_from).collect()
}

fn create_statements(writes: &[PreparedWrite]) -> String {
    writes
        .iter()
        .enumerate()
        .map(|(index, write)| {
            format!(
                "CREATE type::thing('{}', $w{index}_id) CONTENT $w{index};\n",
                write.table
            )
        })
        .collect()
}

impl DatabaseService {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let endpoint = if config.url.starts_with("memory://") || config.url.starts_with("mem://") {
            "mem://".to_string()
        } else if config.url.starts_with("ws://") || config.url.starts_with("wss://") {
            config.url.clone()
        } else {
            return Err(anyhow!("Unsupported database URL: {}", config.url));
        };

        let db = any::connect(endpoint.as_str()).await?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        let service = Self { db };
        service.initialize_schema().await?;

        Ok(service)
    }

    async fn initialize_schema(&self) -> Result<()> {
        self.db
            .query(
                "
            DEFINE TABLE activity SCHEMALESS;
            DEFINE INDEX activity_recipient ON activity COLUMNS user_id, kind;
            DEFINE TABLE profile SCHEMALESS;
            DEFINE INDEX unique_username ON profile COLUMNS username UNIQUE;
            DEFINE TABLE circle SCHEMALESS;
            DEFINE TABLE membership SCHEMALESS;
            DEFINE INDEX unique_membership ON membership COLUMNS circle_id, user_id UNIQUE;
            DEFINE TABLE follow SCHEMALESS;
            DEFINE INDEX unique_follow ON follow COLUMNS follower_id, following_id UNIQUE;
            DEFINE TABLE id_sequence SCHEMALESS;
        ",
            )
            .await?
            .check()?;

        for table in SEQUENCED_TABLES {
            let existing: Option<SequenceRow> = self.db.select((SEQUENCE_TABLE, table)).await?;
            if existing.is_none() {
                let _: Option<SequenceRow> = self
                    .db
                    .create((SEQUENCE_TABLE, table))
                    .content(SequenceRow { value: 0 })
                    .await?;
            }
        }

        log::info!("Database schema initialized successfully");
        Ok(())
    }

    async fn next_id(&self, table: &str) -> Result<i64> {
        let advanced: Option<SequenceRow> = self
            .db
            .query("UPDATE type::thing('id_sequence', $table) SET value += 1 RETURN AFTER")
            .bind(("table", table.to_string()))
            .await?
            .take(0)?;

        advanced
            .map(|row| row.value)
            .ok_or_else(|| anyhow!("Id sequence for {} is missing", table))
    }

    /// Allocates the record id for a write so callers can reference it before commit.
    pub async fn prepare(&self, write: Write) -> Result<PreparedWrite> {
        let table = write.table();
        Ok(PreparedWrite {
            id: self.next_id(table).await?,
            table,
            content: write.content()?,
        })
    }

    /// Creates every row in a single transaction.
    pub async fn execute_batch(&self, writes: Vec<PreparedWrite>) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "BEGIN TRANSACTION;\n{}COMMIT TRANSACTION;\n",
            create_statements(&writes)
        );

        let mut query = self.db.query(sql);
        for (index, write) in writes.into_iter().enumerate() {
            query = query
                .bind((format!("w{index}_id"), write.id))
                .bind((format!("w{index}"), write.content));
        }

        query.await?.check()?;
        Ok(())
    }

    /// Moves a pending request to `status` and creates `effects`, all in one
    /// transaction. Returns false, writing nothing, when no pending row
    /// matched the guard.
    pub async fn resolve_request(
        &self,
        guard: RequestGuard,
        status: ActivityStatus,
        effects: Vec<PreparedWrite>,
    ) -> Result<bool> {
        let sql = format!(
            "BEGIN TRANSACTION;
LET $resolved = (UPDATE activity SET status = $status, resolved_at = $resolved_at
    WHERE id = type::thing('activity', $activity_id) AND user_id = $recipient_id
    AND kind = $kind AND status = 'pending' RETURN AFTER);
IF array::len($resolved) > 0 {{
{}    true
}} ELSE {{
    false
}};
COMMIT TRANSACTION;
",
            create_statements(&effects)
        );

        let mut query = self
            .db
            .query(sql)
            .bind(("status", status.as_str()))
            .bind(("resolved_at", Utc::now().timestamp_millis()))
            .bind(("activity_id", guard.activity_id))
            .bind(("recipient_id", guard.recipient_id))
            .bind(("kind", guard.kind.as_str()));
        for (index, write) in effects.into_iter().enumerate() {
            query = query
                .bind((format!("w{index}_id"), write.id))
                .bind((format!("w{index}"), write.content));
        }

        let mut response = query.await?.check()?;
        let last = response.num_statements().saturating_sub(1);
        let resolved: Option<bool> = response.take(last)?;

        Ok(resolved.unwrap_or(false))
    }

    // Profile operations
    pub async fn create_profile(&self, profile: NewProfile) -> Result<Profile> {
        let id = self.next_id("profile").await?;
        let created: Option<ProfileRecord> = self
            .db
            .create(("profile", id))
            .content(serde_json::to_value(&profile)?)
            .await?;

        created
            .ok_or_else(|| anyhow!("Failed to create profile"))?
            .try_into()
    }

    pub async fn get_profile(&self, profile_id: i64) -> Result<Option<Profile>> {
        let record: Option<ProfileRecord> = self.db.select(("profile", profile_id)).await?;
        record.map(Profile::try_from).transpose()
    }

    pub async fn get_profile_by_username(&self, username: &str) -> Result<Option<Profile>> {
        let record: Option<ProfileRecord> = self
            .db
            .query("SELECT * FROM profile WHERE username = $username LIMIT 1")
            .bind(("username", username.to_string()))
            .await?
            .take(0)?;
        record.map(Profile::try_from).transpose()
    }

    /// One lookup for every id in `ids`; unknown ids are simply absent.
    pub async fn profiles_by_ids(&self, ids: &[i64]) -> Result<Vec<Profile>> {
        let records: Vec<ProfileRecord> = self
            .db
            .query("SELECT * FROM profile WHERE meta::id(id) INSIDE $ids")
            .bind(("ids", ids.to_vec()))
            .await?
            .take(0)?;
        convert_all(records)
    }

    // Circle operations
    pub async fn create_circle(&self, circle: NewCircle) -> Result<Circle> {
        let creator_id = circle.creator_id;
        let circle_write = self.prepare(Write::Circle(circle)).await?;
        let circle_id = circle_write.id;
        let admin = self
            .prepare(Write::Membership(NewMembership::new(
                circle_id,
                creator_id,
                MemberRole::Admin,
            )))
            .await?;

        self.execute_batch(vec![circle_write, admin]).await?;

        self.get_circle(circle_id)
            .await?
            .ok_or_else(|| anyhow!("Failed to create circle"))
    }

    pub async fn get_circle(&self, circle_id: i64) -> Result<Option<Circle>> {
        let record: Option<CircleRecord> = self.db.select(("circle", circle_id)).await?;
        record.map(Circle::try_from).transpose()
    }

    pub async fn find_membership(&self, circle_id: i64, user_id: i64) -> Result<Option<Membership>> {
        let record: Option<MembershipRecord> = self
            .db
            .query("SELECT * FROM membership WHERE circle_id = $circle_id AND user_id = $user_id LIMIT 1")
            .bind(("circle_id", circle_id))
            .bind(("user_id", user_id))
            .await?
            .take(0)?;
        record.map(Membership::try_from).transpose()
    }

    pub async fn find_follow(&self, follower_id: i64, following_id: i64) -> Result<Option<Follow>> {
        let record: Option<FollowRecord> = self
            .db
            .query("SELECT * FROM follow WHERE follower_id = $follower_id AND following_id = $following_id LIMIT 1")
            .bind(("follower_id", follower_id))
            .bind(("following_id", following_id))
            .await?
            .take(0)?;
        record.map(Follow::try_from).transpose()
    }

    // Activity operations
    pub async fn create_activity(&self, activity: NewActivity) -> Result<Activity> {
        let id = self.next_id("activity").await?;
        let created: Option<ActivityRecord> = self
            .db
            .create(("activity", id))
            .content(serde_json::to_value(&activity)?)
            .await?;

        created
            .ok_or_else(|| anyhow!("Failed to create activity"))?
            .try_into()
    }

    /// Unresolved activities of the given kinds addressed to `user_id`, newest first.
    pub async fn list_activities(
        &self,
        user_id: i64,
        kinds: &[ActivityKind],
        take: Option<u32>,
    ) -> Result<Vec<Activity>> {
        let mut sql = "SELECT * FROM activity WHERE user_id = $user_id AND kind INSIDE $kinds \
                       AND status != 'accepted' AND status != 'declined' \
                       ORDER BY created_at DESC, id DESC"
            .to_string();
        if take.is_some() {
            sql.push_str(" LIMIT $take");
        }

        let kinds: Vec<&'static str> = kinds.iter().map(|kind| kind.as_str()).collect();
        let mut query = self
            .db
            .query(sql)
            .bind(("user_id", user_id))
            .bind(("kinds", kinds));
        if let Some(take) = take {
            query = query.bind(("take", take));
        }

        let records: Vec<ActivityRecord> = query.await?.take(0)?;
        convert_all(records)
    }

    pub async fn count_pending(&self, user_id: i64, kind: ActivityKind) -> Result<u64> {
        let rows: Vec<CountRow> = self
            .db
            .query("SELECT count() FROM activity WHERE user_id = $user_id AND kind = $kind AND status = 'pending' GROUP ALL")
            .bind(("user_id", user_id))
            .bind(("kind", kind.as_str()))
            .await?
            .take(0)?;

        Ok(rows.first().map_or(0, |row| row.count))
    }

    /// The pending request `activity_id` if it is addressed to `user_id` and has `kind`.
    pub async fn find_pending_request(
        &self,
        activity_id: i64,
        user_id: i64,
        kind: ActivityKind,
    ) -> Result<Option<Activity>> {
        let record: Option<ActivityRecord> = self
            .db
            .query("SELECT * FROM activity WHERE id = type::thing('activity', $activity_id) \
                    AND user_id = $user_id AND kind = $kind AND status = 'pending'")
            .bind(("activity_id", activity_id))
            .bind(("user_id", user_id))
            .bind(("kind", kind.as_str()))
            .await?
            .take(0)?;
        record.map(Activity::try_from).transpose()
    }

    /// A pending request of `kind` to `user_id` whose payload names `actor_id`
    /// (and `circle_id` when given).
    pub async fn find_open_request(
        &self,
        user_id: i64,
        kind: ActivityKind,
        actor_id: i64,
        circle_id: Option<i64>,
    ) -> Result<Option<Activity>> {
        let pending: Vec<ActivityRecord> = self
            .db
            .query("SELECT * FROM activity WHERE user_id = $user_id AND kind = $kind AND status = 'pending'")
            .bind(("user_id", user_id))
            .bind(("kind", kind.as_str()))
            .await?
            .take(0)?;

        let activities: Vec<Activity> = convert_all(pending)?;
        Ok(activities.into_iter().find(|activity| {
            activity.actor_id() == Some(actor_id)
                && (circle_id.is_none() || activity.circle_id == circle_id)
        }))
    }

    pub async fn health_check(&self) -> Result<()> {
        self.db.health().await?;
        Ok(())
    }
}

#[cfg(test)]
impl DatabaseService {
    pub async fn new(database_url: &str) -> Result<Self> {
        Self::connect(&DatabaseConfig::with_url(database_url)).await
    }

    pub async fn get_activity(&self, activity_id: i64) -> Result<Option<Activity>> {
        let record: Option<ActivityRecord> = self.db.select(("activity", activity_id)).await?;
        record.map(Activity::try_from).transpose()
    }

    pub async fn count_rows(&self, table: &str) -> Result<u64> {
        let rows: Vec<CountRow> = self
            .db
            .query(format!("SELECT count() FROM {table} GROUP ALL"))
            .await?
            .take(0)?;
        Ok(rows.first().map_or(0, |row| row.count))
    }

    pub async fn activities_for(&self, user_id: i64, kind: ActivityKind) -> Result<Vec<Activity>> {
        let records: Vec<ActivityRecord> = self
            .db
            .query("SELECT * FROM activity WHERE user_id = $user_id AND kind = $kind")
            .bind(("user_id", user_id))
            .bind(("kind", kind.as_str()))
            .await?
            .take(0)?;
        convert_all(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::CreateProfileRequest;

    async fn profile(db: &DatabaseService, name: &str, username: &str) -> Profile {
        db.create_profile(NewProfile::new(CreateProfileRequest {
            name: name.to_string(),
            username: username.to_string(),
            avatar: None,
            is_private: None,
        }))
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_profile_operations() {
        let db = DatabaseService::new("memory://").await.unwrap();

        let ana = profile(&db, "Ana", "Ana").await;
        let ben = profile(&db, "Ben", "ben").await;
        assert_eq!(ana.username, "ana");
        assert_ne!(ana.id, ben.id);

        let retrieved = db.get_profile(ana.id).await.unwrap();
        assert_eq!(retrieved.map(|p| p.name), Some("Ana".to_string()));

        let by_username = db.get_profile_by_username("ben").await.unwrap();
        assert_eq!(by_username.map(|p| p.id), Some(ben.id));

        let mut batch = db.profiles_by_ids(&[ana.id, ben.id, 999]).await.unwrap();
        batch.sort_by_key(|p| p.id);
        assert_eq!(batch.iter().map(|p| p.id).collect::<Vec<_>>(), vec![ana.id, ben.id]);
    }

    #[tokio::test]
    async fn test_create_circle_adds_admin() {
        let db = DatabaseService::new("memory://").await.unwrap();
        let ana = profile(&db, "Ana", "ana").await;

        let circle = db
            .create_circle(NewCircle::new(
                crate::models::circle::CreateCircleRequest {
                    name: " Rock Fans ".to_string(),
                    is_private: Some(true),
                },
                ana.id,
            ))
            .await
            .unwrap();
        assert_eq!(circle.name, "Rock Fans");
        assert!(circle.is_private);

        let membership = db.find_membership(circle.id, ana.id).await.unwrap().unwrap();
        assert_eq!(membership.role, MemberRole::Admin);
    }

    #[tokio::test]
    async fn test_list_activities_filters_and_orders() {
        let db = DatabaseService::new("memory://").await.unwrap();
        let now = Utc::now();

        for (minutes, kind, content) in [
            (30, ActivityKind::FriendRequest, "user:2 wants to follow you"),
            (10, ActivityKind::Followed, "Ben (ben) started following you"),
            (5, ActivityKind::AlbumLike, "Ben (ben) liked your album \"Trip\""),
        ] {
            db.create_activity(NewActivity::legacy(
                1,
                kind,
                None,
                content.to_string(),
                now - chrono::Duration::minutes(minutes),
            ))
            .await
            .unwrap();
        }
        db.create_activity(NewActivity::legacy(
            2,
            ActivityKind::Followed,
            None,
            "Ana (ana) started following you".to_string(),
            now,
        ))
        .await
        .unwrap();

        let feed = db
            .list_activities(1, &[ActivityKind::Followed, ActivityKind::AlbumLike], None)
            .await
            .unwrap();
        assert_eq!(
            feed.iter().map(|a| a.kind).collect::<Vec<_>>(),
            vec![ActivityKind::AlbumLike, ActivityKind::Followed]
        );

        let limited = db.list_activities(1, &[ActivityKind::FriendRequest, ActivityKind::Followed, ActivityKind::AlbumLike], Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].kind, ActivityKind::AlbumLike);

        assert_eq!(db.count_pending(1, ActivityKind::FriendRequest).await.unwrap(), 1);
        assert_eq!(db.count_pending(2, ActivityKind::FriendRequest).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_resolve_request_is_guarded() {
        let db = DatabaseService::new("memory://").await.unwrap();
        let request = db
            .create_activity(NewActivity::legacy(
                1,
                ActivityKind::FriendRequest,
                None,
                "user:2 wants to follow you".to_string(),
                Utc::now(),
            ))
            .await
            .unwrap();
        let guard = RequestGuard {
            activity_id: request.id,
            recipient_id: 1,
            kind: ActivityKind::FriendRequest,
        };

        let follow = db.prepare(Write::Follow(NewFollow::new(2, 1))).await.unwrap();
        let resolved = db
            .resolve_request(guard, ActivityStatus::Accepted, vec![follow])
            .await
            .unwrap();
        assert!(resolved);
        assert!(db.find_follow(2, 1).await.unwrap().is_some());

        let stored = db.get_activity(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, Some(ActivityStatus::Accepted));
        assert!(stored.resolved_at.is_some());

        let again = db.prepare(Write::Follow(NewFollow::new(3, 1))).await.unwrap();
        let resolved = db
            .resolve_request(guard, ActivityStatus::Declined, vec![again])
            .await
            .unwrap();
        assert!(!resolved);
        assert!(db.find_follow(3, 1).await.unwrap().is_none());
        assert_eq!(db.count_rows("follow").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resolve_request_rejects_wrong_owner_and_kind() {
        let db = DatabaseService::new("memory://").await.unwrap();
        let request = db
            .create_activity(NewActivity::legacy(
                1,
                ActivityKind::FriendRequest,
                None,
                "user:2 wants to follow you".to_string(),
                Utc::now(),
            ))
            .await
            .unwrap();

        let other_user = RequestGuard {
            activity_id: request.id,
            recipient_id: 5,
            kind: ActivityKind::FriendRequest,
        };
        assert!(!db
            .resolve_request(other_user, ActivityStatus::Declined, Vec::new())
            .await
            .unwrap());

        let wrong_kind = RequestGuard {
            kind: ActivityKind::CircleInvite,
            ..other_user
        };
        assert!(!db
            .resolve_request(wrong_kind, ActivityStatus::Declined, Vec::new())
            .await
            .unwrap());

        let missing = RequestGuard {
            activity_id: 4242,
            recipient_id: 1,
            kind: ActivityKind::FriendRequest,
        };
        assert!(!db
            .resolve_request(missing, ActivityStatus::Declined, Vec::new())
            .await
            .unwrap());
        assert!(db.get_activity(4242).await.unwrap().is_none());

        let stored = db.get_activity(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, Some(ActivityStatus::Pending));
    }
}
