use luv_core::{PaginationMeta, PaginationParams, SortOrder};
use luv_models::auth::{
    AuthResponse, LoginRequest, MessageResponse, RefreshTokenRequest, RegisterRequest,
};
use luv_models::chat::{ChatMessage, CreateChatMessageDto, PaginatedChatMessagesResponse};
use luv_models::donations::{
    CreateDonationDto, Donation, DonationStatus, PaginatedDonationsResponse,
    UpdateDonationStatusDto,
};
use luv_models::followers::{FollowResponse, FollowerEntry, PaginatedFollowersResponse};
use luv_models::streamers::{CreateStreamerProfileDto, StreamerProfile, UpdateStreamerProfileDto};
use luv_models::streams::{
    CreateStreamDto, PaginatedStreamsResponse, Stream, StreamPrivacy, StreamSortField,
    StreamStats, StreamStatus, UpdateStreamDto,
};
use luv_models::users::{
    ChangePasswordDto, CreateUserDto, DeactivateUserResponse, PaginatedUsersResponse,
    UpdateUserDto, User, UserRole, UserSortField, UserStats,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::refresh,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::me,
        crate::modules::auth::controller::google_auth,
        crate::modules::auth::controller::google_callback,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::list_active_users,
        crate::modules::users::controller::get_stats,
        crate::modules::users::controller::get_me,
        crate::modules::users::controller::update_me,
        crate::modules::users::controller::change_password,
        crate::modules::users::controller::get_by_username,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::deactivate_user,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::promote_to_streamer,
        crate::modules::users::controller::promote_to_admin,
        crate::modules::users::controller::demote_to_viewer,
        crate::modules::streamers::controller::create_profile,
        crate::modules::streamers::controller::list_profiles,
        crate::modules::streamers::controller::list_verified_profiles,
        crate::modules::streamers::controller::get_profile,
        crate::modules::streamers::controller::get_profile_by_user,
        crate::modules::streamers::controller::get_profile_by_stage_name,
        crate::modules::streamers::controller::update_profile,
        crate::modules::streamers::controller::delete_profile,
        crate::modules::streamers::controller::verify_profile,
        crate::modules::followers::controller::follow,
        crate::modules::followers::controller::unfollow,
        crate::modules::followers::controller::list_followers,
        crate::modules::streams::controller::create_stream,
        crate::modules::streams::controller::list_streams,
        crate::modules::streams::controller::list_my_streams,
        crate::modules::streams::controller::my_stats,
        crate::modules::streams::controller::global_stats,
        crate::modules::streams::controller::list_by_user,
        crate::modules::streams::controller::get_stream,
        crate::modules::streams::controller::update_stream,
        crate::modules::streams::controller::delete_stream,
        crate::modules::streams::controller::start_stream,
        crate::modules::streams::controller::end_stream,
        crate::modules::streams::controller::record_view,
        crate::modules::chat::controller::post_message,
        crate::modules::chat::controller::list_messages,
        crate::modules::donations::controller::create_donation,
        crate::modules::donations::controller::list_stream_donations,
        crate::modules::donations::controller::update_donation_status,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            AuthResponse,
            User,
            UserRole,
            UserSortField,
            CreateUserDto,
            UpdateUserDto,
            ChangePasswordDto,
            PaginatedUsersResponse,
            UserStats,
            DeactivateUserResponse,
            StreamerProfile,
            CreateStreamerProfileDto,
            UpdateStreamerProfileDto,
            FollowResponse,
            FollowerEntry,
            PaginatedFollowersResponse,
            Stream,
            StreamStatus,
            StreamPrivacy,
            StreamSortField,
            CreateStreamDto,
            UpdateStreamDto,
            PaginatedStreamsResponse,
            StreamStats,
            ChatMessage,
            CreateChatMessageDto,
            PaginatedChatMessagesResponse,
            Donation,
            DonationStatus,
            CreateDonationDto,
            UpdateDonationStatusDto,
            PaginatedDonationsResponse,
            PaginationMeta,
            PaginationParams,
            SortOrder,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login, token refresh and Google sign-in"),
        (name = "Users", description = "User accounts and role management"),
        (name = "Streamers", description = "Streamer profiles"),
        (name = "Followers", description = "Following streamers"),
        (name = "Streams", description = "Streams and their lifecycle"),
        (name = "Chat", description = "Stream chat messages"),
        (name = "Donations", description = "Donations to streamers")
    ),
    info(
        title = "Luv API",
        version = "0.1.0",
        description = "Livestreaming backend built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
