//! # Luv API
//!
//! Backend for the Luv livestreaming platform: accounts with password or
//! Google sign-in, streamer profiles, follows, streams with chat and
//! donation records. Built on Axum and PostgreSQL.
//!
//! ## Layout
//!
//! ```text
//! src/
//! ├── middleware/       # Auth extractors, role guards
//! ├── modules/          # Feature modules
//! │   ├── auth/        # Register, login, refresh, logout, Google OAuth
//! │   ├── users/       # Profiles and admin user management
//! │   ├── streamers/   # Streamer profiles
//! │   ├── followers/   # Follow / unfollow
//! │   ├── streams/     # Streams and their lifecycle
//! │   ├── chat/        # Stream chat messages
//! │   └── donations/   # Donation records
//! ├── docs.rs           # OpenAPI document
//! ├── router.rs         # Route tree, CORS, rate limiting
//! ├── state.rs          # Shared application state
//! └── validator.rs      # Validated JSON and query extractors
//! ```
//!
//! Each feature module has `controller.rs` (handlers), `service.rs`
//! (queries and rules) and `router.rs`. Entities and DTOs live in the
//! `luv-models` crate.
//!
//! ## Roles
//!
//! | Role | Can |
//! |------|-----|
//! | Admin | Everything, including role changes and donation settlement |
//! | Streamer | Create and run streams |
//! | Viewer | Follow, chat and donate |
//!
//! Admins are created with `cargo run -p luv-cli -- create-admin`.
//!
//! ## Authentication
//!
//! Access tokens (15 minutes by default) are accepted from the
//! `Authorization: Bearer` header or the `accessToken` cookie. Refresh
//! tokens (7 days) are signed with a separate secret and exchanged at
//! `POST /api/auth/refresh` for a new pair.
//!
//! ## API documentation
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`

pub mod docs;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

// Re-export workspace crates for convenience
pub use luv_auth;
pub use luv_config;
pub use luv_core;
pub use luv_db;
pub use luv_models;
