//! # Luv Models
//!
//! Database entities and request/response DTOs for the Luv API.
//!
//! # Modules
//!
//! - [`auth`]: registration, login, refresh and Google profile payloads
//! - [`users`]: the user entity, roles and user management DTOs
//! - [`streamers`]: streamer profiles
//! - [`followers`]: follow relationships
//! - [`streams`]: streams, their lifecycle status and privacy
//! - [`chat`]: chat messages attached to a stream
//! - [`donations`]: donation records and their status
//! - [`validation`]: custom `validator` rules shared by the DTOs
//!
//! # Example
//!
//! ```ignore
//! use luv_models::users::{User, UserRole};
//! use luv_models::streams::{CreateStreamDto, StreamStatus};
//!
//! if user.role == UserRole::Streamer {
//!     // ...
//! }
//! ```

pub mod auth;
pub mod chat;
pub mod donations;
pub mod followers;
pub mod streamers;
pub mod streams;
pub mod users;
pub mod validation;

// Re-export commonly used types at crate root
pub use auth::{
    AuthResponse, Claims, GoogleCallbackParams, GoogleProfile, LoginRequest, MessageResponse,
    RefreshTokenClaims, RefreshTokenRequest, RegisterRequest,
};
pub use chat::{ChatMessage, CreateChatMessageDto, PaginatedChatMessagesResponse};
pub use donations::{
    CreateDonationDto, Donation, DonationStatus, PaginatedDonationsResponse,
    UpdateDonationStatusDto,
};
pub use followers::{FollowResponse, FollowerEntry, PaginatedFollowersResponse};
pub use streamers::{CreateStreamerProfileDto, StreamerProfile, UpdateStreamerProfileDto};
pub use streams::{
    CreateStreamDto, PaginatedStreamsResponse, Stream, StreamFilterParams, StreamPrivacy,
    StreamSortField, StreamStats, StreamStatus, UpdateStreamDto,
};
pub use users::{
    ChangePasswordDto, CreateUserDto, DeactivateUserResponse, PaginatedUsersResponse,
    UpdateUserDto, User, UserFilterParams, UserRole, UserSortField, UserStats,
    UserWithPassword,
};
