//! # Luv Config
//!
//! Configuration structures loaded from environment variables. Every
//! struct exposes a `from_env()` constructor that falls back to development
//! defaults when a variable is missing or unparsable.
//!
//! - [`app`]: Runtime environment, port, and frontend URL
//! - [`jwt`]: Access/refresh token secrets and lifetimes
//! - [`google`]: Google OAuth client credentials and endpoints
//! - [`cors`]: Allowed browser origins
//! - [`rate_limit`]: API rate limiting buckets
//!
//! # Example
//!
//! ```ignore
//! use luv_config::{AppConfig, CorsConfig, GoogleOAuthConfig, JwtConfig, RateLimitConfig};
//!
//! let app_config = AppConfig::from_env();
//! let jwt_config = JwtConfig::from_env();
//! let google_config = GoogleOAuthConfig::from_env();
//! let cors_config = CorsConfig::from_env();
//! let rate_limit_config = RateLimitConfig::from_env();
//! ```

pub mod app;
pub mod cors;
pub mod google;
pub mod jwt;
pub mod rate_limit;

// Re-export commonly used types at crate root
pub use app::{AppConfig, Environment};
pub use cors::CorsConfig;
pub use google::GoogleOAuthConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
