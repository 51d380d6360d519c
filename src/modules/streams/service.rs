use luv_core::{AppError, contains_pattern};
use luv_models::streams::{
    CreateStreamDto, PaginatedStreamsResponse, Stream, StreamFilterParams, StreamStats,
    StreamStatus, UpdateStreamDto,
};
use luv_models::users::User;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::modules::streamers::service::StreamerService;

pub const STREAM_COLUMNS: &str = "id, user_id, title, description, category, status, privacy, thumbnail_url, media_url, scheduled_at, started_at, ended_at, created_at, updated_at";

/// Which streams a listing may return regardless of the requested filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Public and private; an explicit `privacy` filter still applies.
    All,
    /// Public streams only; the `privacy` filter is ignored.
    PublicOnly,
}

impl Visibility {
    /// Admins see everything, users listing their own streams see all of
    /// them, everyone else sees public streams.
    pub fn for_listing(viewer: Option<&User>, filters: &StreamFilterParams) -> Self {
        match viewer {
            Some(user) if user.is_admin() => Visibility::All,
            Some(user) if filters.user_id == Some(user.id) => Visibility::All,
            _ => Visibility::PublicOnly,
        }
    }
}

fn stream_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Stream not found"))
}

/// Owner or admin may act on a stream.
pub fn ensure_stream_owner(actor: &User, stream: &Stream, action: &str) -> Result<(), AppError> {
    if actor.can_manage(stream.user_id) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "You can only {} your own streams",
            action
        )))
    }
}

/// Private streams are visible to their owner and to admins.
pub fn ensure_can_view(viewer: Option<&User>, stream: &Stream) -> Result<(), AppError> {
    if stream.is_public() || viewer.is_some_and(|user| user.can_manage(stream.user_id)) {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "You do not have permission to view this private stream",
        ))
    }
}

pub struct StreamService;

impl StreamService {
    #[instrument(skip(db, owner, dto), fields(user.id = %owner.id, stream.title = %dto.title, db.operation = "INSERT", db.table = "streams"))]
    pub async fn create_stream(
        db: &PgPool,
        owner: &User,
        dto: CreateStreamDto,
    ) -> Result<Stream, AppError> {
        let status = dto.status.unwrap_or_default();
        if status == StreamStatus::Ended {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "A new stream cannot be created as ended"
            )));
        }

        let stream = sqlx::query_as::<_, Stream>(&format!(
            "INSERT INTO streams (user_id, title, description, category, status, privacy, thumbnail_url, media_url, scheduled_at, started_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, CASE WHEN $5 = 'live'::stream_status THEN NOW() END)
             RETURNING {}",
            STREAM_COLUMNS
        ))
        .bind(owner.id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.category)
        .bind(status)
        .bind(dto.privacy.unwrap_or_default())
        .bind(&dto.thumbnail_url)
        .bind(&dto.media_url)
        .bind(dto.scheduled_at)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error creating stream");
            AppError::from(e)
        })?;

        if stream.status == StreamStatus::Live {
            luv_observability::track_stream_started();
        }

        info!(stream.id = %stream.id, stream.status = %stream.status, "Stream created");
        Ok(stream)
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "streams"))]
    pub async fn list_streams(
        db: &PgPool,
        filters: StreamFilterParams,
        visibility: Visibility,
    ) -> Result<PaginatedStreamsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        debug!(
            limit = %limit,
            offset = %offset,
            filter.search = ?filters.search,
            filter.status = ?filters.status,
            filter.privacy = ?filters.privacy,
            filter.user_id = ?filters.user_id,
            "Fetching streams with pagination"
        );

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        match visibility {
            Visibility::PublicOnly => where_clause.push_str(" AND privacy = 'public'"),
            Visibility::All => {
                if let Some(privacy) = filters.privacy {
                    params.push(privacy.as_str().to_string());
                    where_clause
                        .push_str(&format!(" AND privacy = ${}::stream_privacy", params.len()));
                }
            }
        }

        if let Some(status) = filters.status {
            params.push(status.as_str().to_string());
            where_clause.push_str(&format!(" AND status = ${}::stream_status", params.len()));
        }

        if let Some(category) = filters.category.as_deref().filter(|c| !c.trim().is_empty()) {
            params.push(contains_pattern(category.trim()));
            where_clause.push_str(&format!(" AND category ILIKE ${}", params.len()));
        }

        if let Some(user_id) = filters.user_id {
            params.push(user_id.to_string());
            where_clause.push_str(&format!(" AND user_id = ${}::uuid", params.len()));
        }

        if let Some(search) = filters.search.as_deref().filter(|s| !s.trim().is_empty()) {
            params.push(contains_pattern(search.trim()));
            let n = params.len();
            where_clause.push_str(&format!(
                " AND (title ILIKE ${n} OR description ILIKE ${n} OR category ILIKE ${n})"
            ));
        }

        let count_query = format!("SELECT COUNT(*) FROM streams{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await.map_err(|e| {
            error!(error = %e, "Database error counting streams");
            AppError::from(e)
        })?;

        let sort_by = filters.sort_by.unwrap_or_default();
        let sort_order = filters.sort_order.unwrap_or_default();
        let data_query = format!(
            "SELECT {} FROM streams{} ORDER BY {} {}, id LIMIT {} OFFSET {}",
            STREAM_COLUMNS,
            where_clause,
            sort_by.as_column(),
            sort_order.as_sql(),
            limit,
            offset
        );

        let mut data_sql = sqlx::query_as::<_, Stream>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let streams = data_sql.fetch_all(db).await.map_err(|e| {
            error!(error = %e, "Database error fetching streams");
            AppError::from(e)
        })?;

        debug!(total = %total, returned = %streams.len(), "Streams fetched");

        Ok(PaginatedStreamsResponse {
            data: streams,
            meta: filters.pagination.meta(total),
        })
    }

    /// Public streams of one user, newest first.
    #[instrument(skip(db))]
    pub async fn list_public_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Stream>, AppError> {
        let streams = sqlx::query_as::<_, Stream>(&format!(
            "SELECT {} FROM streams
             WHERE user_id = $1 AND privacy = 'public'
             ORDER BY created_at DESC",
            STREAM_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(streams)
    }

    /// Counts over every stream, or over one owner's streams.
    #[instrument(skip(db))]
    pub async fn get_stats(db: &PgPool, owner_id: Option<Uuid>) -> Result<StreamStats, AppError> {
        let stats = sqlx::query_as::<_, StreamStats>(
            "SELECT
                 COUNT(*) AS total,
                 COUNT(*) FILTER (WHERE status = 'scheduled') AS scheduled,
                 COUNT(*) FILTER (WHERE status = 'live') AS live,
                 COUNT(*) FILTER (WHERE status = 'ended') AS ended,
                 COUNT(*) FILTER (WHERE privacy = 'public') AS public,
                 COUNT(*) FILTER (WHERE privacy = 'private') AS private
             FROM streams
             WHERE $1::uuid IS NULL OR user_id = $1",
        )
        .bind(owner_id)
        .fetch_one(db)
        .await?;

        Ok(stats)
    }

    pub async fn find_stream(db: &PgPool, id: Uuid) -> Result<Stream, AppError> {
        sqlx::query_as::<_, Stream>(&format!(
            "SELECT {} FROM streams WHERE id = $1",
            STREAM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(stream_not_found)
    }

    /// Loads a stream and checks `viewer` may see it.
    #[instrument(skip(db, viewer))]
    pub async fn get_stream(
        db: &PgPool,
        id: Uuid,
        viewer: Option<&User>,
    ) -> Result<Stream, AppError> {
        let stream = Self::find_stream(db, id).await?;
        ensure_can_view(viewer, &stream)?;
        Ok(stream)
    }

    #[instrument(skip(db, actor, dto), fields(actor.id = %actor.id, db.operation = "UPDATE", db.table = "streams"))]
    pub async fn update_stream(
        db: &PgPool,
        actor: &User,
        id: Uuid,
        dto: UpdateStreamDto,
    ) -> Result<Stream, AppError> {
        let stream = Self::find_stream(db, id).await?;
        ensure_stream_owner(actor, &stream, "update")?;

        let stream = sqlx::query_as::<_, Stream>(&format!(
            "UPDATE streams SET
                 title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 category = COALESCE($4, category),
                 privacy = COALESCE($5, privacy),
                 thumbnail_url = COALESCE($6, thumbnail_url),
                 media_url = COALESCE($7, media_url),
                 scheduled_at = COALESCE($8, scheduled_at),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            STREAM_COLUMNS
        ))
        .bind(id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.category)
        .bind(dto.privacy)
        .bind(&dto.thumbnail_url)
        .bind(&dto.media_url)
        .bind(dto.scheduled_at)
        .fetch_optional(db)
        .await?
        .ok_or_else(stream_not_found)?;

        info!(stream.id = %stream.id, "Stream updated");
        Ok(stream)
    }

    #[instrument(skip(db, actor), fields(actor.id = %actor.id, db.operation = "DELETE", db.table = "streams"))]
    pub async fn delete_stream(db: &PgPool, actor: &User, id: Uuid) -> Result<(), AppError> {
        let stream = Self::find_stream(db, id).await?;
        ensure_stream_owner(actor, &stream, "delete")?;

        sqlx::query("DELETE FROM streams WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if stream.status == StreamStatus::Live {
            luv_observability::track_stream_ended();
        }

        info!(stream.id = %id, "Stream deleted");
        Ok(())
    }

    /// Scheduled -> live.
    #[instrument(skip(db, actor), fields(actor.id = %actor.id))]
    pub async fn start_stream(db: &PgPool, actor: &User, id: Uuid) -> Result<Stream, AppError> {
        let stream = Self::find_stream(db, id).await?;
        ensure_stream_owner(actor, &stream, "start")?;

        match stream.status {
            StreamStatus::Live => {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "Stream is already live"
                )));
            }
            StreamStatus::Ended => {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "Stream has already ended"
                )));
            }
            StreamStatus::Scheduled => {}
        }

        // Only one of two concurrent starts matches the status guard.
        let stream = sqlx::query_as::<_, Stream>(&format!(
            "UPDATE streams SET status = 'live', started_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND status = 'scheduled'
             RETURNING {}",
            STREAM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Stream is no longer scheduled")))?;

        luv_observability::track_stream_started();
        info!(stream.id = %id, "Stream started");
        Ok(stream)
    }

    /// Any non-ended status -> ended.
    #[instrument(skip(db, actor), fields(actor.id = %actor.id))]
    pub async fn end_stream(db: &PgPool, actor: &User, id: Uuid) -> Result<Stream, AppError> {
        let stream = Self::find_stream(db, id).await?;
        ensure_stream_owner(actor, &stream, "end")?;

        if stream.status == StreamStatus::Ended {
            warn!(stream.id = %id, "Stream already ended");
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Stream has already ended"
            )));
        }

        let ended = sqlx::query_as::<_, Stream>(&format!(
            "UPDATE streams SET status = 'ended', ended_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND status <> 'ended'
             RETURNING {}",
            STREAM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Stream has already ended")))?;

        if stream.status == StreamStatus::Live {
            luv_observability::track_stream_ended();
        }

        info!(stream.id = %id, "Stream ended");
        Ok(ended)
    }

    /// Counts a view against the owner's streamer profile.
    #[instrument(skip(db, viewer))]
    pub async fn record_view(db: &PgPool, id: Uuid, viewer: Option<&User>) -> Result<(), AppError> {
        let stream = Self::get_stream(db, id, viewer).await?;
        StreamerService::increment_views(db, stream.user_id).await?;
        debug!(stream.id = %id, "View recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use luv_models::streams::StreamPrivacy;
    use luv_models::users::UserRole;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            username: "someone".into(),
            email: "someone@example.com".into(),
            google_id: None,
            avatar_url: None,
            display_name: None,
            role,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn stream(owner: Uuid, privacy: StreamPrivacy) -> Stream {
        Stream {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "Speedrun".into(),
            description: None,
            category: None,
            status: StreamStatus::Live,
            privacy,
            thumbnail_url: None,
            media_url: None,
            scheduled_at: None,
            started_at: None,
            ended_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_listing_visibility() {
        let admin = user(UserRole::Admin);
        let streamer = user(UserRole::Streamer);

        let mut filters = StreamFilterParams::default();
        assert_eq!(Visibility::for_listing(None, &filters), Visibility::PublicOnly);
        assert_eq!(Visibility::for_listing(Some(&admin), &filters), Visibility::All);
        assert_eq!(
            Visibility::for_listing(Some(&streamer), &filters),
            Visibility::PublicOnly
        );

        filters.user_id = Some(streamer.id);
        assert_eq!(Visibility::for_listing(Some(&streamer), &filters), Visibility::All);
        assert_eq!(Visibility::for_listing(None, &filters), Visibility::PublicOnly);
    }

    #[test]
    fn test_private_stream_visibility() {
        let owner = user(UserRole::Streamer);
        let other = user(UserRole::Viewer);
        let admin = user(UserRole::Admin);
        let private = stream(owner.id, StreamPrivacy::Private);

        assert!(ensure_can_view(Some(&owner), &private).is_ok());
        assert!(ensure_can_view(Some(&admin), &private).is_ok());
        assert_eq!(
            ensure_can_view(Some(&other), &private).unwrap_err().status.as_u16(),
            403
        );
        assert!(ensure_can_view(None, &private).is_err());
        assert!(ensure_can_view(None, &stream(owner.id, StreamPrivacy::Public)).is_ok());
    }

    #[test]
    fn test_stream_owner_guard_message() {
        let owner = user(UserRole::Streamer);
        let other = user(UserRole::Streamer);
        let s = stream(owner.id, StreamPrivacy::Public);

        assert!(ensure_stream_owner(&owner, &s, "end").is_ok());
        let err = ensure_stream_owner(&other, &s, "end").unwrap_err();
        assert_eq!(err.error.to_string(), "You can only end your own streams");
    }
}
