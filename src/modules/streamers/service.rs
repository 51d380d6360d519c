use luv_core::AppError;
use luv_models::streamers::{CreateStreamerProfileDto, StreamerProfile, UpdateStreamerProfileDto};
use luv_models::users::User;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::middleware::role::ensure_owner_or_admin;

pub const STREAMER_COLUMNS: &str =
    "id, user_id, stage_name, bio, is_verified, total_followers, total_views, created_at, updated_at";

const STAGE_NAME_TAKEN: &str = "Stage name already taken";
const PROFILE_EXISTS: &str = "User already has a streamer profile";

fn streamer_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Streamer not found"))
}

fn map_profile_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return match db_err.constraint() {
            Some("streamer_profiles_user_id_key") => AppError::conflict(PROFILE_EXISTS),
            _ => AppError::conflict(STAGE_NAME_TAKEN),
        };
    }
    error!(error = %e, "Database error writing streamer profile");
    AppError::from(e)
}

pub struct StreamerService;

impl StreamerService {
    /// Creates a profile for `actor`, or for `dto.user_id` when the actor is
    /// an admin.
    #[instrument(skip(db, actor, dto), fields(actor.id = %actor.id, streamer.stage_name = %dto.stage_name))]
    pub async fn create_profile(
        db: &PgPool,
        actor: &User,
        dto: CreateStreamerProfileDto,
    ) -> Result<StreamerProfile, AppError> {
        let user_id = match dto.user_id {
            Some(user_id) if user_id != actor.id => {
                if !actor.is_admin() {
                    return Err(AppError::forbidden(
                        "Only administrators can create profiles for other users",
                    ));
                }
                user_id
            }
            _ => actor.id,
        };

        let user_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(db)
                .await?;
        if !user_exists {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        if Self::find_by_user_id(db, user_id).await?.is_some() {
            warn!(user.id = %user_id, "Duplicate streamer profile");
            return Err(AppError::conflict(PROFILE_EXISTS));
        }

        if Self::stage_name_taken(db, &dto.stage_name, None).await? {
            return Err(AppError::conflict(STAGE_NAME_TAKEN));
        }

        let profile = sqlx::query_as::<_, StreamerProfile>(&format!(
            "INSERT INTO streamer_profiles (user_id, stage_name, bio)
             VALUES ($1, $2, $3)
             RETURNING {}",
            STREAMER_COLUMNS
        ))
        .bind(user_id)
        .bind(&dto.stage_name)
        .bind(&dto.bio)
        .fetch_one(db)
        .await
        .map_err(map_profile_write_error)?;

        info!(streamer.id = %profile.id, user.id = %user_id, "Streamer profile created");
        Ok(profile)
    }

    /// Most followed first.
    #[instrument(skip(db))]
    pub async fn list_profiles(
        db: &PgPool,
        verified_only: bool,
    ) -> Result<Vec<StreamerProfile>, AppError> {
        let query = format!(
            "SELECT {} FROM streamer_profiles {} ORDER BY total_followers DESC, created_at DESC",
            STREAMER_COLUMNS,
            if verified_only { "WHERE is_verified" } else { "" }
        );

        let profiles = sqlx::query_as::<_, StreamerProfile>(&query)
            .fetch_all(db)
            .await?;

        debug!(returned = %profiles.len(), "Streamer profiles fetched");
        Ok(profiles)
    }

    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, id: Uuid) -> Result<StreamerProfile, AppError> {
        Self::find_by_id(db, id).await?.ok_or_else(streamer_not_found)
    }

    #[instrument(skip(db))]
    pub async fn get_profile_by_user(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<StreamerProfile, AppError> {
        Self::find_by_user_id(db, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Streamer profile not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_profile_by_stage_name(
        db: &PgPool,
        stage_name: &str,
    ) -> Result<StreamerProfile, AppError> {
        sqlx::query_as::<_, StreamerProfile>(&format!(
            "SELECT {} FROM streamer_profiles WHERE stage_name = $1",
            STREAMER_COLUMNS
        ))
        .bind(stage_name)
        .fetch_optional(db)
        .await?
        .ok_or_else(streamer_not_found)
    }

    #[instrument(skip(db, actor, dto), fields(actor.id = %actor.id, streamer.id = %id))]
    pub async fn update_profile(
        db: &PgPool,
        actor: &User,
        id: Uuid,
        dto: UpdateStreamerProfileDto,
    ) -> Result<StreamerProfile, AppError> {
        let profile = Self::get_profile(db, id).await?;
        ensure_owner_or_admin(actor, profile.user_id)?;

        if dto.is_verified.is_some() && !actor.is_admin() {
            return Err(AppError::forbidden(
                "Only administrators can change verification",
            ));
        }

        if let Some(stage_name) = dto.stage_name.as_deref()
            && Self::stage_name_taken(db, stage_name, Some(id)).await?
        {
            return Err(AppError::conflict(STAGE_NAME_TAKEN));
        }

        let profile = sqlx::query_as::<_, StreamerProfile>(&format!(
            "UPDATE streamer_profiles SET
                 stage_name = COALESCE($2, stage_name),
                 bio = COALESCE($3, bio),
                 is_verified = COALESCE($4, is_verified),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            STREAMER_COLUMNS
        ))
        .bind(id)
        .bind(&dto.stage_name)
        .bind(&dto.bio)
        .bind(dto.is_verified)
        .fetch_optional(db)
        .await
        .map_err(map_profile_write_error)?
        .ok_or_else(streamer_not_found)?;

        info!(streamer.id = %profile.id, "Streamer profile updated");
        Ok(profile)
    }

    #[instrument(skip(db, actor), fields(actor.id = %actor.id))]
    pub async fn delete_profile(db: &PgPool, actor: &User, id: Uuid) -> Result<(), AppError> {
        let profile = Self::get_profile(db, id).await?;
        ensure_owner_or_admin(actor, profile.user_id)?;

        sqlx::query("DELETE FROM streamer_profiles WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        info!(streamer.id = %id, "Streamer profile deleted");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn verify_profile(db: &PgPool, id: Uuid) -> Result<StreamerProfile, AppError> {
        let profile = sqlx::query_as::<_, StreamerProfile>(&format!(
            "UPDATE streamer_profiles SET is_verified = TRUE, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            STREAMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(streamer_not_found)?;

        info!(streamer.id = %id, "Streamer verified");
        Ok(profile)
    }

    /// Adds one view to the profile owned by `user_id`. Users without a
    /// profile are ignored.
    pub async fn increment_views(db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE streamer_profiles SET total_views = total_views + 1 WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(db)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<StreamerProfile>, AppError> {
        let profile = sqlx::query_as::<_, StreamerProfile>(&format!(
            "SELECT {} FROM streamer_profiles WHERE id = $1",
            STREAMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(profile)
    }

    pub async fn find_by_user_id(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<StreamerProfile>, AppError> {
        let profile = sqlx::query_as::<_, StreamerProfile>(&format!(
            "SELECT {} FROM streamer_profiles WHERE user_id = $1",
            STREAMER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        Ok(profile)
    }

    async fn stage_name_taken(
        db: &PgPool,
        stage_name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM streamer_profiles
                 WHERE stage_name = $1 AND ($2::uuid IS NULL OR id <> $2)
             )",
        )
        .bind(stage_name)
        .bind(exclude_id)
        .fetch_one(db)
        .await?;

        Ok(taken)
    }
}
