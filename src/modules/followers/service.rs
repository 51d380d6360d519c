use luv_core::{AppError, PaginationParams};
use luv_models::followers::{FollowResponse, FollowerEntry, PaginatedFollowersResponse};
use luv_models::users::User;
use sqlx::PgPool;
use tracing::{error, info, instrument};
use uuid::Uuid;

fn streamer_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Streamer not found"))
}

pub struct FollowerService;

impl FollowerService {
    /// Inserts the follow row and bumps `total_followers` in one transaction.
    #[instrument(skip(db, follower), fields(follower.id = %follower.id, streamer.id = %streamer_id))]
    pub async fn follow(
        db: &PgPool,
        follower: &User,
        streamer_id: Uuid,
    ) -> Result<FollowResponse, AppError> {
        let mut tx = db.begin().await?;

        let owner_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM streamer_profiles WHERE id = $1 FOR UPDATE",
        )
        .bind(streamer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(streamer_not_found)?;

        if owner_id == follower.id {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "You cannot follow yourself"
            )));
        }

        sqlx::query("INSERT INTO followers (follower_id, streamer_id) VALUES ($1, $2)")
            .bind(follower.id)
            .bind(streamer_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::conflict("You are already following this streamer");
                }
                error!(error = %e, "Database error following streamer");
                AppError::from(e)
            })?;

        let total_followers = sqlx::query_scalar::<_, i64>(
            "UPDATE streamer_profiles SET total_followers = total_followers + 1
             WHERE id = $1
             RETURNING total_followers",
        )
        .bind(streamer_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(total_followers, "Streamer followed");
        Ok(FollowResponse {
            streamer_id,
            following: true,
            total_followers,
        })
    }

    #[instrument(skip(db, follower), fields(follower.id = %follower.id, streamer.id = %streamer_id))]
    pub async fn unfollow(
        db: &PgPool,
        follower: &User,
        streamer_id: Uuid,
    ) -> Result<FollowResponse, AppError> {
        let mut tx = db.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM streamer_profiles WHERE id = $1)",
        )
        .bind(streamer_id)
        .fetch_one(&mut *tx)
        .await?;
        if !exists {
            return Err(streamer_not_found());
        }

        let deleted = sqlx::query("DELETE FROM followers WHERE follower_id = $1 AND streamer_id = $2")
            .bind(follower.id)
            .bind(streamer_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "You are not following this streamer"
            )));
        }

        let total_followers = sqlx::query_scalar::<_, i64>(
            "UPDATE streamer_profiles SET total_followers = GREATEST(total_followers - 1, 0)
             WHERE id = $1
             RETURNING total_followers",
        )
        .bind(streamer_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(total_followers, "Streamer unfollowed");
        Ok(FollowResponse {
            streamer_id,
            following: false,
            total_followers,
        })
    }

    /// Newest followers first.
    #[instrument(skip(db, pagination))]
    pub async fn list_followers(
        db: &PgPool,
        streamer_id: Uuid,
        pagination: PaginationParams,
    ) -> Result<PaginatedFollowersResponse, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM streamer_profiles WHERE id = $1)",
        )
        .bind(streamer_id)
        .fetch_one(db)
        .await?;
        if !exists {
            return Err(streamer_not_found());
        }

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM followers WHERE streamer_id = $1")
                .bind(streamer_id)
                .fetch_one(db)
                .await?;

        let followers = sqlx::query_as::<_, FollowerEntry>(
            "SELECT f.follower_id, u.username, u.display_name, u.avatar_url, f.followed_at
             FROM followers f
             JOIN users u ON u.id = f.follower_id
             WHERE f.streamer_id = $1
             ORDER BY f.followed_at DESC, f.follower_id
             LIMIT $2 OFFSET $3",
        )
        .bind(streamer_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedFollowersResponse {
            data: followers,
            meta: pagination.meta(total),
        })
    }
}
