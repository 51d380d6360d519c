use luv_core::{AppError, PaginationParams};
use luv_models::chat::{ChatMessage, CreateChatMessageDto, PaginatedChatMessagesResponse};
use luv_models::streams::StreamStatus;
use luv_models::users::User;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::modules::streams::service::StreamService;

pub struct ChatService;

impl ChatService {
    #[instrument(skip(db, sender, dto), fields(sender.id = %sender.id, stream.id = %stream_id, db.operation = "INSERT", db.table = "chat_messages"))]
    pub async fn post_message(
        db: &PgPool,
        sender: &User,
        stream_id: Uuid,
        dto: CreateChatMessageDto,
    ) -> Result<ChatMessage, AppError> {
        let text = dto.message.trim();
        if text.is_empty() {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Message must not be blank"
            )));
        }

        let stream = StreamService::get_stream(db, stream_id, Some(sender)).await?;
        if stream.status == StreamStatus::Ended {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Cannot post chat messages to an ended stream"
            )));
        }

        let message = sqlx::query_as::<_, ChatMessage>(
            "WITH inserted AS (
                 INSERT INTO chat_messages (stream_id, sender_id, message)
                 VALUES ($1, $2, $3)
                 RETURNING id, stream_id, sender_id, message, created_at
             )
             SELECT i.id, i.stream_id, i.sender_id, u.username AS sender_username, i.message, i.created_at
             FROM inserted i
             JOIN users u ON u.id = i.sender_id",
        )
        .bind(stream_id)
        .bind(sender.id)
        .bind(text)
        .fetch_one(db)
        .await?;

        debug!(message.id = %message.id, "Chat message posted");
        Ok(message)
    }

    /// Oldest first, so a client can page forward through the conversation.
    #[instrument(skip(db, viewer, pagination))]
    pub async fn list_messages(
        db: &PgPool,
        stream_id: Uuid,
        viewer: Option<&User>,
        pagination: PaginationParams,
    ) -> Result<PaginatedChatMessagesResponse, AppError> {
        StreamService::get_stream(db, stream_id, viewer).await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM chat_messages WHERE stream_id = $1",
        )
        .bind(stream_id)
        .fetch_one(db)
        .await?;

        let messages = sqlx::query_as::<_, ChatMessage>(
            "SELECT c.id, c.stream_id, c.sender_id, u.username AS sender_username, c.message, c.created_at
             FROM chat_messages c
             JOIN users u ON u.id = c.sender_id
             WHERE c.stream_id = $1
             ORDER BY c.created_at ASC, c.id
             LIMIT $2 OFFSET $3",
        )
        .bind(stream_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedChatMessagesResponse {
            data: messages,
            meta: pagination.meta(total),
        })
    }
}
