//! Authentication and authorization for request handlers.
//!
//! - [`auth`]: token extraction and the `AuthUser` / `CurrentUser` /
//!   `MaybeCurrentUser` extractors
//! - [`role`]: role middleware, `RequireAdmin` / `RequireStreamer` extractors
//!   and ownership checks
//!
//! ```ignore
//! async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
//!     Json(user)
//! }
//! ```

pub mod auth;
pub mod role;
