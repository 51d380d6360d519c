//! # Luv CLI
//!
//! Administrative commands and database seeding for local development.
//!
//! ```ignore
//! use luv_cli::seeder::{seed_all, SeedConfig};
//!
//! seed_all(&pool, SeedConfig::default()).await?;
//! ```

pub mod admin;
pub mod seeder;

/// Error type shared by the CLI commands.
pub type CliError = Box<dyn std::error::Error + Send + Sync>;
