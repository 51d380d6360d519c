//! # Luv Core
//!
//! Core types, errors, and utilities shared by every Luv crate.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Page-based pagination parameters and response metadata
//! - [`password`]: bcrypt password hashing and verification
//! - [`serde`]: Query-string friendly deserializers
//!
//! # Example
//!
//! ```ignore
//! use luv_core::errors::AppError;
//! use luv_core::pagination::{PaginationMeta, PaginationParams};
//! use luv_core::password::{hash_password, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Stream not found"));
//!
//! let hash = hash_password("Sup3r$ecret")?;
//!
//! let params = PaginationParams::default();
//! let meta = PaginationMeta::new(params.page(), params.limit(), 42);
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams, SortOrder, contains_pattern};
pub use password::{hash_password, verify_password};
