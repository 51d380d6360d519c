//! Fake viewer and streamer accounts.

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use luv_models::users::UserRole;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::SEED_EMAIL_DOMAIN;
use super::models::UserSeed;
use crate::CliError;

pub fn generate_users(
    count: usize,
    role: UserRole,
    password_hash: &str,
) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| generate_user(role, idx, password_hash))
        .collect()
}

fn generate_user(role: UserRole, idx: usize, password_hash: &str) -> UserSeed {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();

    let handle: String = first_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(20)
        .collect();
    let username = format!("{}_{}{}", handle, role.as_str(), idx);

    UserSeed {
        email: format!("{}@{}", username, SEED_EMAIL_DOMAIN),
        display_name: format!("{} {}", first_name, last_name),
        username,
        password_hash: password_hash.to_string(),
        role,
    }
}

/// Inserts users, skipping any whose username or email is taken.
pub async fn insert_users_batch(
    db: &PgPool,
    users: &[UserSeed],
) -> Result<Vec<(Uuid, UserRole)>, CliError> {
    let mut tx = db.begin().await?;

    // 5 params per user
    const BATCH_SIZE: usize = 1000;

    let mut inserted = Vec::with_capacity(users.len());
    for chunk in users.chunks(BATCH_SIZE) {
        inserted.extend(insert_users_chunk(&mut tx, chunk).await?);
    }

    tx.commit().await?;
    Ok(inserted)
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> Result<Vec<(Uuid, UserRole)>, CliError> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let mut query =
        String::from("INSERT INTO users (username, email, display_name, password_hash, role) VALUES ");
    for i in 0..users.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 5;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${})",
            p + 1,
            p + 2,
            p + 3,
            p + 4,
            p + 5
        ));
    }
    query.push_str(" ON CONFLICT DO NOTHING RETURNING id, role");

    let mut q = sqlx::query_as::<_, (Uuid, UserRole)>(&query);
    for user in users {
        q = q
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.display_name)
            .bind(&user.password_hash)
            .bind(user.role);
    }

    Ok(q.fetch_all(&mut **tx).await?)
}

pub async fn seed_users(
    db: &PgPool,
    viewers: usize,
    streamers: usize,
    password_hash: &str,
) -> Result<Vec<(Uuid, UserRole)>, CliError> {
    let start_time = Instant::now();
    println!(
        "👥 Seeding {} users ({} viewers, {} streamers)...",
        viewers + streamers,
        viewers,
        streamers
    );

    let mut users = generate_users(viewers, UserRole::Viewer, password_hash);
    users.extend(generate_users(streamers, UserRole::Streamer, password_hash));
    let inserted = insert_users_batch(db, &users).await?;

    println!(
        "   ✓ Inserted {} users in {:?}",
        inserted.len(),
        start_time.elapsed()
    );
    Ok(inserted)
}

/// Deletes seeded accounts. Admins are kept; everything owned by the
/// deleted users goes with them.
pub async fn clear_users(db: &PgPool) -> Result<u64, CliError> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded users...");

    let deleted = sqlx::query("DELETE FROM users WHERE email LIKE $1 AND role <> 'admin'")
        .bind(format!("%@{}", SEED_EMAIL_DOMAIN))
        .execute(db)
        .await?
        .rows_affected();

    println!("   ✓ Deleted {} users in {:?}", deleted, start_time.elapsed());
    Ok(deleted)
}
