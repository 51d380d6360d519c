//! Donation records.
//!
//! No money moves here: a donation is a record whose status is settled by an
//! administrator (or, later, a payment provider callback).

use chrono::{DateTime, Utc};
use luv_core::PaginationMeta;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Upper bound for a single donation, in cents.
pub const MAX_DONATION_CENTS: i64 = 100_000_000;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "donation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl DonationStatus {
    /// Pending donations settle exactly once.
    pub fn can_transition_to(&self, next: DonationStatus) -> bool {
        *self == DonationStatus::Pending && next != DonationStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Donation {
    pub id: Uuid,
    pub stream_id: Uuid,
    pub donor_id: Uuid,
    /// Streamer profile receiving the donation
    pub streamer_id: Uuid,
    /// Amount in cents
    pub amount_cents: i64,
    pub message: Option<String>,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDonationDto {
    #[validate(range(
        min = 1,
        max = MAX_DONATION_CENTS,
        message = "Amount must be a positive number of cents"
    ))]
    #[schema(example = 500)]
    pub amount_cents: i64,
    #[validate(length(max = 500, message = "Message must not exceed 500 characters"))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateDonationStatusDto {
    pub status: DonationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedDonationsResponse {
    pub data: Vec<Donation>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use DonationStatus::*;

        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Completed));
    }

    #[test]
    fn test_amount_must_be_positive() {
        let dto = CreateDonationDto {
            amount_cents: 0,
            message: None,
        };
        assert!(dto.validate().is_err());

        let dto = CreateDonationDto {
            amount_cents: 250,
            message: Some("gg".into()),
        };
        assert!(dto.validate().is_ok());
    }
}
