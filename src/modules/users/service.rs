use luv_core::{AppError, PaginationParams, contains_pattern, hash_password, verify_password};
use luv_models::users::{
    ChangePasswordDto, CreateUserDto, DeactivateUserResponse, PaginatedUsersResponse,
    UpdateUserDto, USER_COLUMNS, User, UserFilterParams, UserRole, UserStats,
};
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

pub struct UserService;

fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::conflict("Username or email already exists");
    }
    error!(error = %e, "Database error writing user");
    AppError::from(e)
}

impl UserService {
    #[instrument(skip(db, dto), fields(user.username = %dto.username, db.operation = "INSERT", db.table = "users"))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let password_hash = dto.password.as_deref().map(hash_password).transpose()?;
        let email = dto.email.trim().to_lowercase();
        let display_name = dto.display_name.unwrap_or_else(|| dto.username.clone());

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, google_id, avatar_url, display_name, role, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&dto.username)
        .bind(&email)
        .bind(password_hash)
        .bind(&dto.google_id)
        .bind(&dto.avatar_url)
        .bind(&display_name)
        .bind(dto.role.unwrap_or_default())
        .bind(dto.is_active.unwrap_or(true))
        .fetch_one(db)
        .await
        .map_err(map_unique_violation)?;

        info!(user.id = %user.id, user.role = %user.role, "User created");
        Ok(user)
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn list_users(
        db: &PgPool,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        debug!(
            limit = %limit,
            offset = %offset,
            filter.search = ?filters.search,
            filter.role = ?filters.role,
            filter.is_active = ?filters.is_active,
            "Fetching users with pagination"
        );

        let mut where_clause = String::from(" WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = filters.search.as_deref().filter(|s| !s.trim().is_empty()) {
            params.push(contains_pattern(search.trim()));
            let n = params.len();
            where_clause.push_str(&format!(
                " AND (username ILIKE ${n} OR email ILIKE ${n} OR display_name ILIKE ${n})"
            ));
        }

        if let Some(role) = filters.role {
            params.push(role.as_str().to_string());
            where_clause.push_str(&format!(" AND role = ${}::user_role", params.len()));
        }

        if let Some(is_active) = filters.is_active {
            params.push(is_active.to_string());
            where_clause.push_str(&format!(" AND is_active = ${}::boolean", params.len()));
        }

        let count_query = format!("SELECT COUNT(*) FROM users{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await.map_err(|e| {
            error!(error = %e, "Database error counting users");
            AppError::from(e)
        })?;

        let sort_by = filters.sort_by.unwrap_or_default();
        let sort_order = filters.sort_order.unwrap_or_default();
        let data_query = format!(
            "SELECT {} FROM users{} ORDER BY {} {}, id LIMIT {} OFFSET {}",
            USER_COLUMNS,
            where_clause,
            sort_by.as_column(),
            sort_order.as_sql(),
            limit,
            offset
        );

        let mut data_sql = sqlx::query_as::<_, User>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let users = data_sql.fetch_all(db).await.map_err(|e| {
            error!(error = %e, "Database error fetching users");
            AppError::from(e)
        })?;

        debug!(total = %total, returned = %users.len(), "Users fetched");

        Ok(PaginatedUsersResponse {
            data: users,
            meta: filters.pagination.meta(total),
        })
    }

    #[instrument(skip(db))]
    pub async fn list_active_users(
        db: &PgPool,
        pagination: PaginationParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_active")
            .fetch_one(db)
            .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE is_active ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
            USER_COLUMNS
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedUsersResponse {
            data: users,
            meta: pagination.meta(total),
        })
    }

    #[instrument(skip(db), fields(user.id = %user_id))]
    pub async fn get_user(db: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_active_by_username(db: &PgPool, username: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1 AND is_active",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    /// Partial update. Fields left out of `dto` keep their value.
    #[instrument(skip(db, dto), fields(user.id = %user_id, db.operation = "UPDATE", db.table = "users"))]
    pub async fn update_user(
        db: &PgPool,
        user_id: Uuid,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        let email = dto.email.as_deref().map(|e| e.trim().to_lowercase());

        if dto.username.is_some() || email.is_some() {
            let taken = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(
                     SELECT 1 FROM users
                     WHERE id <> $1 AND (username = $2 OR email = $3)
                 )",
            )
            .bind(user_id)
            .bind(&dto.username)
            .bind(&email)
            .fetch_one(db)
            .await?;

            if taken {
                warn!(user.id = %user_id, "Update collides with another user's username or email");
                return Err(AppError::conflict("Username or email already exists"));
            }
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                 username = COALESCE($2, username),
                 email = COALESCE($3, email),
                 avatar_url = COALESCE($4, avatar_url),
                 display_name = COALESCE($5, display_name),
                 is_active = COALESCE($6, is_active),
                 role = COALESCE($7, role),
                 google_id = COALESCE($8, google_id),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(&dto.username)
        .bind(&email)
        .bind(&dto.avatar_url)
        .bind(&dto.display_name)
        .bind(dto.is_active)
        .bind(dto.role)
        .bind(&dto.google_id)
        .fetch_optional(db)
        .await
        .map_err(map_unique_violation)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        info!(user.id = %user.id, "User updated");
        Ok(user)
    }

    #[instrument(skip(db, dto), fields(user.id = %user_id))]
    pub async fn change_password(
        db: &PgPool,
        user_id: Uuid,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let current_hash = sqlx::query_scalar::<_, Option<String>>(
            "SELECT password_hash FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        let valid = match current_hash {
            Some(hash) => verify_password(&dto.current_password, &hash)?,
            None => false,
        };
        if !valid {
            warn!(user.id = %user_id, "Password change with wrong current password");
            return Err(AppError::unauthorized("Invalid password"));
        }

        let new_hash = hash_password(&dto.new_password)?;
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(new_hash)
            .execute(db)
            .await?;

        info!(user.id = %user_id, "Password changed");
        Ok(())
    }

    /// Soft delete. An already inactive user reports `deactivated: false`.
    #[instrument(skip(db), fields(user.id = %user_id))]
    pub async fn deactivate_user(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<DeactivateUserResponse, AppError> {
        let user = Self::get_user(db, user_id).await?;
        if !user.is_active {
            return Ok(DeactivateUserResponse {
                deactivated: false,
                user,
            });
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(db)
        .await?;

        info!(user.id = %user_id, "User deactivated");
        Ok(DeactivateUserResponse {
            deactivated: true,
            user,
        })
    }

    #[instrument(skip(db), fields(user.id = %user_id, db.operation = "DELETE", db.table = "users"))]
    pub async fn delete_user(db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
        let user = Self::get_user(db, user_id).await?;
        if user.role == UserRole::Admin {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Cannot delete admin users"
            )));
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(db)
            .await?;

        info!(user.id = %user_id, "User permanently deleted");
        Ok(())
    }

    #[instrument(skip(db), fields(user.id = %user_id, user.role = %role))]
    pub async fn set_role(db: &PgPool, user_id: Uuid, role: UserRole) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(role)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        info!(user.id = %user.id, user.role = %user.role, "User role changed");
        Ok(user)
    }

    /// Role counts cover active users only.
    #[instrument(skip(db))]
    pub async fn get_stats(db: &PgPool) -> Result<UserStats, AppError> {
        let stats = sqlx::query_as::<_, UserStats>(
            "SELECT
                 COUNT(*) AS total_users,
                 COUNT(*) FILTER (WHERE is_active) AS active_users,
                 COUNT(*) FILTER (WHERE is_active AND role = 'streamer') AS streamers,
                 COUNT(*) FILTER (WHERE is_active AND role = 'viewer') AS viewers,
                 COUNT(*) FILTER (WHERE is_active AND role = 'admin') AS admins
             FROM users",
        )
        .fetch_one(db)
        .await?;

        Ok(stats)
    }
}
