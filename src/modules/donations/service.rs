use luv_core::{AppError, PaginationParams};
use luv_models::donations::{
    CreateDonationDto, Donation, DonationStatus, PaginatedDonationsResponse,
};
use luv_models::users::User;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::modules::streamers::service::StreamerService;
use crate::modules::streams::service::{StreamService, ensure_stream_owner};

const DONATION_COLUMNS: &str =
    "id, stream_id, donor_id, streamer_id, amount_cents, message, status, created_at, updated_at";

pub struct DonationService;

impl DonationService {
    /// Records a pending donation to the owner of `stream_id`.
    #[instrument(skip(db, donor, dto), fields(donor.id = %donor.id, stream.id = %stream_id, amount_cents = dto.amount_cents, db.operation = "INSERT", db.table = "donations"))]
    pub async fn create_donation(
        db: &PgPool,
        donor: &User,
        stream_id: Uuid,
        dto: CreateDonationDto,
    ) -> Result<Donation, AppError> {
        let stream = StreamService::get_stream(db, stream_id, Some(donor)).await?;

        if stream.user_id == donor.id {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "You cannot donate to your own stream"
            )));
        }

        let Some(profile) = StreamerService::find_by_user_id(db, stream.user_id).await? else {
            warn!(owner.id = %stream.user_id, "Donation to a stream whose owner has no streamer profile");
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Stream owner does not have a streamer profile"
            )));
        };

        let message = dto
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        let donation = sqlx::query_as::<_, Donation>(&format!(
            "INSERT INTO donations (stream_id, donor_id, streamer_id, amount_cents, message)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            DONATION_COLUMNS
        ))
        .bind(stream_id)
        .bind(donor.id)
        .bind(profile.id)
        .bind(dto.amount_cents)
        .bind(message)
        .fetch_one(db)
        .await?;

        luv_observability::track_donation_created();
        info!(donation.id = %donation.id, "Donation recorded");
        Ok(donation)
    }

    /// Newest first. Only the stream owner and admins may list.
    #[instrument(skip(db, actor, pagination), fields(actor.id = %actor.id))]
    pub async fn list_for_stream(
        db: &PgPool,
        actor: &User,
        stream_id: Uuid,
        pagination: PaginationParams,
    ) -> Result<PaginatedDonationsResponse, AppError> {
        let stream = StreamService::find_stream(db, stream_id).await?;
        ensure_stream_owner(actor, &stream, "view donations for")?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM donations WHERE stream_id = $1")
                .bind(stream_id)
                .fetch_one(db)
                .await?;

        let donations = sqlx::query_as::<_, Donation>(&format!(
            "SELECT {} FROM donations
             WHERE stream_id = $1
             ORDER BY created_at DESC, id
             LIMIT $2 OFFSET $3",
            DONATION_COLUMNS
        ))
        .bind(stream_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedDonationsResponse {
            data: donations,
            meta: pagination.meta(total),
        })
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "donations"))]
    pub async fn update_status(
        db: &PgPool,
        id: Uuid,
        status: DonationStatus,
    ) -> Result<Donation, AppError> {
        let current = sqlx::query_scalar::<_, DonationStatus>(
            "SELECT status FROM donations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Donation not found")))?;

        if !current.can_transition_to(status) {
            return Err(invalid_transition());
        }

        // Another admin may settle the donation between the read and the write.
        let donation = sqlx::query_as::<_, Donation>(&format!(
            "UPDATE donations SET status = $2, updated_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {}",
            DONATION_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(db)
        .await?
        .ok_or_else(invalid_transition)?;

        info!(donation.id = %id, status = ?status, "Donation status updated");
        Ok(donation)
    }
}

fn invalid_transition() -> AppError {
    AppError::bad_request(anyhow::anyhow!(
        "Only pending donations can change status"
    ))
}
