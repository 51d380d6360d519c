//! Fake data for local development.
//!
//! Seeded accounts use `@example.com` addresses so they can be removed again
//! without touching real users.

pub mod models;
pub mod streams;
pub mod users;

use luv_core::hash_password;
use luv_models::users::UserRole;
use sqlx::PgPool;
use std::time::Instant;

pub use models::SeedConfig;

use crate::CliError;

pub const SEED_EMAIL_DOMAIN: &str = "example.com";

/// Password shared by every seeded account.
pub const SEED_PASSWORD: &str = "Password123!";

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), CliError> {
    let start_time = Instant::now();
    println!("🌱 Seeding database...\n");

    let password_hash =
        hash_password(SEED_PASSWORD).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let users = users::seed_users(db, config.viewers, config.streamers, &password_hash).await?;
    let (streamer_ids, viewer_ids): (Vec<_>, Vec<_>) = users
        .into_iter()
        .partition(|(_, role)| *role == UserRole::Streamer);
    let streamer_ids: Vec<_> = streamer_ids.into_iter().map(|(id, _)| id).collect();
    let viewer_ids: Vec<_> = viewer_ids.into_iter().map(|(id, _)| id).collect();

    let profile_ids = streams::seed_profiles(db, &streamer_ids).await?;
    streams::seed_streams(db, &streamer_ids, config.streams_per_streamer).await?;
    streams::seed_follows(db, &viewer_ids, &profile_ids, config.follows_per_viewer).await?;

    println!(
        "\n✅ Seeding finished in {:?} (password for all accounts: {})",
        start_time.elapsed(),
        SEED_PASSWORD
    );
    Ok(())
}

pub async fn clear_all(db: &PgPool) -> Result<(), CliError> {
    users::clear_users(db).await?;
    println!("✅ Seeded data cleared");
    Ok(())
}
