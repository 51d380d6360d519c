//! Streamer profiles, streams and follows for seeded accounts.

use chrono::{Duration, Utc};
use fake::Fake;
use fake::faker::company::en::Buzzword;
use fake::faker::lorem::en::Sentence;
use luv_models::streams::{StreamPrivacy, StreamStatus};
use rayon::prelude::*;
use sqlx::PgPool;
use std::time::Instant;
use uuid::Uuid;

use super::models::{StreamSeed, StreamerSeed};
use crate::CliError;

const CATEGORIES: &[&str] = &["Gaming", "Music", "Just Chatting", "Art", "Sports", "Education"];

pub fn generate_profiles(user_ids: &[Uuid]) -> Vec<StreamerSeed> {
    user_ids
        .par_iter()
        .enumerate()
        .map(|(idx, &user_id)| {
            let word: String = Buzzword().fake();
            StreamerSeed {
                user_id,
                stage_name: format!("{} {}", word, idx),
                bio: Sentence(5..12).fake(),
            }
        })
        .collect()
}

/// Cycles through scheduled, live and ended; every fifth stream is private.
pub fn generate_streams(user_ids: &[Uuid], per_streamer: usize) -> Vec<StreamSeed> {
    user_ids
        .par_iter()
        .enumerate()
        .flat_map(|(streamer_idx, &user_id)| {
            (0..per_streamer)
                .map(|stream_idx| {
                    let n = streamer_idx * per_streamer + stream_idx;
                    let now = Utc::now();
                    let status = match n % 3 {
                        0 => StreamStatus::Scheduled,
                        1 => StreamStatus::Live,
                        _ => StreamStatus::Ended,
                    };
                    let (scheduled_at, started_at, ended_at) = match status {
                        StreamStatus::Scheduled => (Some(now + Duration::days(1)), None, None),
                        StreamStatus::Live => (None, Some(now - Duration::minutes(30)), None),
                        StreamStatus::Ended => (
                            None,
                            Some(now - Duration::hours(3)),
                            Some(now - Duration::hours(1)),
                        ),
                    };

                    StreamSeed {
                        user_id,
                        title: Sentence(2..6).fake(),
                        description: Sentence(6..15).fake(),
                        category: CATEGORIES[n % CATEGORIES.len()].to_string(),
                        status,
                        privacy: if n % 5 == 4 {
                            StreamPrivacy::Private
                        } else {
                            StreamPrivacy::Public
                        },
                        scheduled_at,
                        started_at,
                        ended_at,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Returns the ids of the profiles that were created.
pub async fn seed_profiles(db: &PgPool, user_ids: &[Uuid]) -> Result<Vec<Uuid>, CliError> {
    let start_time = Instant::now();
    println!("🎙️  Seeding {} streamer profiles...", user_ids.len());

    let profiles = generate_profiles(user_ids);
    let mut ids = Vec::with_capacity(profiles.len());
    let mut tx = db.begin().await?;

    // 3 params per profile
    for chunk in profiles.chunks(1000) {
        let mut query =
            String::from("INSERT INTO streamer_profiles (user_id, stage_name, bio) VALUES ");
        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            let p = i * 3;
            query.push_str(&format!("(${}, ${}, ${})", p + 1, p + 2, p + 3));
        }
        query.push_str(" ON CONFLICT DO NOTHING RETURNING id");

        let mut q = sqlx::query_scalar::<_, Uuid>(&query);
        for profile in chunk {
            q = q
                .bind(profile.user_id)
                .bind(&profile.stage_name)
                .bind(&profile.bio);
        }
        ids.extend(q.fetch_all(&mut *tx).await?);
    }

    tx.commit().await?;
    println!(
        "   ✓ Inserted {} profiles in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

pub async fn seed_streams(
    db: &PgPool,
    user_ids: &[Uuid],
    per_streamer: usize,
) -> Result<u64, CliError> {
    let start_time = Instant::now();
    println!(
        "📺 Seeding {} streams ({} per streamer)...",
        user_ids.len() * per_streamer,
        per_streamer
    );

    let streams = generate_streams(user_ids, per_streamer);
    let mut inserted = 0;
    let mut tx = db.begin().await?;

    // 9 params per stream
    for chunk in streams.chunks(1000) {
        let mut query = String::from(
            "INSERT INTO streams (user_id, title, description, category, status, privacy, scheduled_at, started_at, ended_at) VALUES ",
        );
        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            let p = i * 9;
            let placeholders: Vec<String> = (1..=9).map(|k| format!("${}", p + k)).collect();
            query.push('(');
            query.push_str(&placeholders.join(", "));
            query.push(')');
        }

        let mut q = sqlx::query(&query);
        for stream in chunk {
            q = q
                .bind(stream.user_id)
                .bind(&stream.title)
                .bind(&stream.description)
                .bind(&stream.category)
                .bind(stream.status)
                .bind(stream.privacy)
                .bind(stream.scheduled_at)
                .bind(stream.started_at)
                .bind(stream.ended_at);
        }
        inserted += q.execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;
    println!(
        "   ✓ Inserted {} streams in {:?}",
        inserted,
        start_time.elapsed()
    );
    Ok(inserted)
}

/// Pairs each viewer with `per_viewer` consecutive profiles, wrapping around.
pub fn follow_pairs(viewer_ids: &[Uuid], profile_ids: &[Uuid], per_viewer: usize) -> Vec<(Uuid, Uuid)> {
    if profile_ids.is_empty() {
        return Vec::new();
    }
    let per_viewer = per_viewer.min(profile_ids.len());

    viewer_ids
        .iter()
        .enumerate()
        .flat_map(|(idx, &viewer)| {
            (0..per_viewer).map(move |k| (viewer, profile_ids[(idx + k) % profile_ids.len()]))
        })
        .collect()
}

/// Inserts follows and recomputes `total_followers` from the table.
pub async fn seed_follows(
    db: &PgPool,
    viewer_ids: &[Uuid],
    profile_ids: &[Uuid],
    per_viewer: usize,
) -> Result<u64, CliError> {
    let start_time = Instant::now();
    let pairs = follow_pairs(viewer_ids, profile_ids, per_viewer);
    println!("❤️  Seeding {} follows...", pairs.len());

    let mut inserted = 0;
    let mut tx = db.begin().await?;

    for chunk in pairs.chunks(2000) {
        if chunk.is_empty() {
            continue;
        }
        let mut query = String::from("INSERT INTO followers (follower_id, streamer_id) VALUES ");
        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            query.push_str(&format!("(${}, ${})", i * 2 + 1, i * 2 + 2));
        }
        query.push_str(" ON CONFLICT DO NOTHING");

        let mut q = sqlx::query(&query);
        for (follower, streamer) in chunk {
            q = q.bind(follower).bind(streamer);
        }
        inserted += q.execute(&mut *tx).await?.rows_affected();
    }

    sqlx::query(
        "UPDATE streamer_profiles sp
         SET total_followers = (SELECT COUNT(*) FROM followers f WHERE f.streamer_id = sp.id)
         WHERE sp.id = ANY($1)",
    )
    .bind(profile_ids)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    println!(
        "   ✓ Inserted {} follows in {:?}",
        inserted,
        start_time.elapsed()
    );
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_mix() {
        let owners = vec![Uuid::new_v4(), Uuid::new_v4()];
        let streams = generate_streams(&owners, 5);
        assert_eq!(streams.len(), 10);

        assert!(streams.iter().any(|s| s.status == StreamStatus::Live));
        assert!(streams.iter().any(|s| s.privacy == StreamPrivacy::Private));
        for stream in &streams {
            match stream.status {
                StreamStatus::Scheduled => assert!(stream.started_at.is_none()),
                StreamStatus::Live => assert!(stream.started_at.is_some() && stream.ended_at.is_none()),
                StreamStatus::Ended => assert!(stream.ended_at.is_some()),
            }
        }
    }

    #[test]
    fn test_follow_pairs_wrap_and_cap() {
        let viewers = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let profiles = vec![Uuid::new_v4(), Uuid::new_v4()];

        let pairs = follow_pairs(&viewers, &profiles, 5);
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[2], (viewers[1], profiles[1]));
        assert_eq!(pairs[3], (viewers[1], profiles[0]));

        assert!(follow_pairs(&viewers, &[], 3).is_empty());
    }
}
