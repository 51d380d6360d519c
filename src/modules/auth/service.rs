use std::collections::HashSet;

use luv_auth::{create_token_pair, verify_refresh_token};
use luv_config::JwtConfig;
use luv_core::{AppError, hash_password, verify_password};
use luv_models::auth::{AuthResponse, GoogleProfile, LoginRequest, RegisterRequest};
use luv_models::users::{USER_COLUMNS, User, UserWithPassword};
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::middleware::auth::INACTIVE_ACCOUNT;

use super::google::{username_base_from_email, username_candidate};

const INVALID_CREDENTIALS: &str = "Email or password is incorrect";
const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";
const USERNAME_CONSTRAINT: &str = "users_username_key";
const MAX_GOOGLE_SIGNUP_ATTEMPTS: usize = 5;

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto, jwt_config), fields(user.username = %dto.username))]
    pub async fn register(
        db: &PgPool,
        dto: RegisterRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let email = dto.email.trim().to_lowercase();
        debug!(user.email = %email, "Registering user");

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(&dto.username)
        .bind(&email)
        .fetch_one(db)
        .await?;

        if exists {
            warn!(user.email = %email, "Registration with existing username or email");
            return Err(AppError::conflict("Username or email already exists"));
        }

        let password_hash = hash_password(&dto.password)?;
        let display_name = dto.display_name.unwrap_or_else(|| dto.username.clone());

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, display_name, avatar_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&dto.username)
        .bind(&email)
        .bind(&password_hash)
        .bind(&display_name)
        .bind(&dto.avatar_url)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict("Username or email already exists");
            }
            error!(error = %e, "Database error creating user");
            AppError::from(e)
        })?;

        luv_observability::track_user_registered("password");
        info!(user.id = %user.id, "User registered");

        Self::complete_login(db, user, jwt_config).await
    }

    #[instrument(skip(db, dto, jwt_config))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let email = dto.email.trim().to_lowercase();

        let found = sqlx::query_as::<_, UserWithPassword>(&format!(
            "SELECT {}, password_hash FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(&email)
        .fetch_optional(db)
        .await?;

        let Some(UserWithPassword {
            user,
            password_hash,
        }) = found
        else {
            luv_observability::track_login_failure("unknown_email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        // Google-only accounts have no password and never match.
        let Some(hash) = password_hash else {
            luv_observability::track_login_failure("no_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &hash)? {
            warn!(user.id = %user.id, "Invalid password");
            luv_observability::track_login_failure("invalid_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        if !user.is_active {
            luv_observability::track_login_failure("inactive");
            return Err(AppError::unauthorized(INACTIVE_ACCOUNT));
        }

        luv_observability::track_login_success(user.role.as_str(), "password");
        info!(user.id = %user.id, "User logged in");

        Self::complete_login(db, user, jwt_config).await
    }

    /// Exchanges a refresh token for a new pair. The old refresh token is
    /// superseded but, being stateless, stays valid until it expires.
    #[instrument(skip(db, refresh_token, jwt_config))]
    pub async fn refresh(
        db: &PgPool,
        refresh_token: &str,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let claims = verify_refresh_token(refresh_token, jwt_config)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized(INVALID_REFRESH_TOKEN))?;

        let user = Self::find_user(db, user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_REFRESH_TOKEN))?;

        if !user.is_active {
            return Err(AppError::unauthorized(INACTIVE_ACCOUNT));
        }

        let tokens = create_token_pair(user.id, &user.email, user.role.as_str(), jwt_config)?;
        luv_observability::track_jwt_issued("refresh");
        debug!(user.id = %user.id, "Tokens refreshed");

        Ok(AuthResponse::new(tokens, user))
    }

    /// Signs in with a Google profile, linking or creating the local account.
    #[instrument(skip(db, profile, jwt_config), fields(google.id = %profile.google_id))]
    pub async fn google_login(
        db: &PgPool,
        profile: GoogleProfile,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let email = profile
            .verified_email()
            .map(|email| email.trim().to_lowercase())
            .ok_or_else(|| AppError::unauthorized("Email not verified by Google"))?;

        if let Some(user) = Self::find_by_google_id(db, &profile.google_id).await? {
            if !user.is_active {
                return Err(AppError::unauthorized(INACTIVE_ACCOUNT));
            }
            luv_observability::track_google_login("existing");
            luv_observability::track_login_success(user.role.as_str(), "google");
            return Self::complete_login(db, user, jwt_config).await;
        }

        let by_email = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(&email)
        .fetch_optional(db)
        .await?;

        let user = match by_email {
            Some(user) => {
                if user.google_id.is_some() {
                    warn!(user.id = %user.id, "Email already linked to another Google account");
                    return Err(AppError::conflict(
                        "This email is already linked to a different Google account",
                    ));
                }
                if !user.is_active {
                    return Err(AppError::unauthorized(INACTIVE_ACCOUNT));
                }

                let linked = Self::link_google_account(db, user.id, &profile).await?;
                luv_observability::track_google_login("linked");
                info!(user.id = %linked.id, "Linked Google account to existing user");
                linked
            }
            None => {
                let created = Self::create_google_user(db, &email, &profile).await?;
                luv_observability::track_user_registered("google");
                luv_observability::track_google_login("created");
                info!(user.id = %created.id, user.username = %created.username, "Created user from Google profile");
                created
            }
        };

        luv_observability::track_login_success(user.role.as_str(), "google");
        Self::complete_login(db, user, jwt_config).await
    }

    async fn complete_login(
        db: &PgPool,
        user: User,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET last_login_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.id)
        .fetch_one(db)
        .await?;

        let tokens = create_token_pair(user.id, &user.email, user.role.as_str(), jwt_config)?;
        luv_observability::track_jwt_issued("pair");

        Ok(AuthResponse::new(tokens, user))
    }

    async fn find_user(db: &PgPool, user_id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    async fn find_by_google_id(db: &PgPool, google_id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE google_id = $1",
            USER_COLUMNS
        ))
        .bind(google_id)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    async fn link_google_account(
        db: &PgPool,
        user_id: Uuid,
        profile: &GoogleProfile,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET google_id = $2,
                 avatar_url = COALESCE(NULLIF(avatar_url, ''), $3),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(&profile.google_id)
        .bind(&profile.picture)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::conflict("Google account is already linked to another user");
            }
            AppError::from(e)
        })?;

        Ok(user)
    }

    /// Inserts a password-less viewer. Username collisions lost to a
    /// concurrent signup are retried with the next free candidate.
    async fn create_google_user(
        db: &PgPool,
        email: &str,
        profile: &GoogleProfile,
    ) -> Result<User, AppError> {
        let base = username_base_from_email(email);

        for attempt in 1..=MAX_GOOGLE_SIGNUP_ATTEMPTS {
            let username = Self::next_free_username(db, &base).await?;

            let result = sqlx::query_as::<_, User>(&format!(
                "INSERT INTO users (username, email, google_id, avatar_url, display_name)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING {}",
                USER_COLUMNS
            ))
            .bind(&username)
            .bind(email)
            .bind(&profile.google_id)
            .bind(&profile.picture)
            .bind(profile.display_name().unwrap_or_else(|| username.clone()))
            .fetch_one(db)
            .await;

            match result {
                Ok(user) => return Ok(user),
                Err(sqlx::Error::Database(db_err))
                    if db_err.is_unique_violation()
                        && db_err.constraint() == Some(USERNAME_CONSTRAINT) =>
                {
                    warn!(attempt, username = %username, "Username taken concurrently, retrying");
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    return Err(AppError::conflict("Username or email already exists"));
                }
                Err(e) => {
                    error!(error = %e, "Database error creating Google user");
                    return Err(AppError::from(e));
                }
            }
        }

        Err(AppError::conflict(
            "Could not allocate a unique username, please try again",
        ))
    }

    /// First of `base`, `base1`, `base2`, ... not held by any user.
    async fn next_free_username(db: &PgPool, base: &str) -> Result<String, AppError> {
        let taken: HashSet<String> =
            sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE username LIKE $1")
                .bind(format!("{}%", base))
                .fetch_all(db)
                .await?
                .into_iter()
                .collect();

        let mut attempt = 0;
        loop {
            let candidate = username_candidate(base, attempt);
            if !taken.contains(&candidate) {
                return Ok(candidate);
            }
            attempt += 1;
        }
    }
}
