// ABOUTME: Chat messages exchanged between linked trainers and clients
// ABOUTME: Messages are append-only; the table rejects updates through a trigger
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::clients::linked_either_way;
use super::now_timestamp;
use crate::constants::database::{DEFAULT_CONVERSATION_LIMIT, MAX_CONVERSATION_LIMIT};
use crate::context::CallerContext;
use crate::errors::{AppError, AppResult};
use crate::models::lookup_id;

// ============================================================================
// Database Record Types
// ============================================================================

/// Stored chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: String,
    /// Profile that sent the message
    pub sender_id: String,
    /// Profile the message is addressed to
    pub receiver_id: String,
    /// Message text
    pub content: String,
    /// When the message was sent (RFC 3339)
    pub created_at: String,
}

// ============================================================================
// Chat Manager
// ============================================================================

/// Chat database operations manager
pub struct ChatManager {
    pool: SqlitePool,
}

impl ChatManager {
    /// Create a new chat manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Send a message from the caller to a linked trainer or client
    ///
    /// # Errors
    ///
    /// Returns invalid input for blank content or a message to oneself, and
    /// permission denied when the two profiles are not linked
    pub async fn send_message(
        &self,
        caller: &CallerContext,
        receiver_id: &str,
        content: &str,
    ) -> AppResult<ChatMessage> {
        let receiver_id = lookup_id(receiver_id);
        let receiver_id = receiver_id.as_str();
        if content.trim().is_empty() {
            return Err(AppError::invalid_input("Message content must not be empty"));
        }
        if receiver_id == caller.profile_id {
            return Err(AppError::invalid_input("Cannot send a message to yourself"));
        }
        if !linked_either_way(&self.pool, &caller.profile_id, receiver_id).await? {
            return Err(AppError::permission_denied(
                "Messages can only be sent between a trainer and their client",
            ));
        }

        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            sender_id: caller.profile_id.clone(),
            receiver_id: receiver_id.to_owned(),
            content: content.to_owned(),
            created_at: now_timestamp(),
        };

        sqlx::query(
            r"
            INSERT INTO chat_messages (id, sender_id, receiver_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&message.id)
        .bind(&message.sender_id)
        .bind(&message.receiver_id)
        .bind(&message.content)
        .bind(&message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to send message: {e}")))?;

        info!(message_id = %message.id, receiver_id = %receiver_id, "Sent chat message");
        Ok(message)
    }

    /// Get the last `limit` messages between the caller and a peer in
    /// chronological order
    ///
    /// # Errors
    ///
    /// Returns permission denied when the two profiles are not linked, or a
    /// database error
    pub async fn conversation(
        &self,
        caller: &CallerContext,
        peer_id: &str,
        limit: Option<u32>,
    ) -> AppResult<Vec<ChatMessage>> {
        let peer_id = lookup_id(peer_id);
        let peer_id = peer_id.as_str();
        if !linked_either_way(&self.pool, &caller.profile_id, peer_id).await? {
            return Err(AppError::permission_denied(
                "Conversations are visible to a trainer and their client only",
            ));
        }
        let limit = limit
            .unwrap_or(DEFAULT_CONVERSATION_LIMIT)
            .clamp(1, MAX_CONVERSATION_LIMIT);

        let rows = sqlx::query(
            r"
            SELECT id, sender_id, receiver_id, content, created_at
            FROM chat_messages
            WHERE (sender_id = $1 AND receiver_id = $2) OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at DESC, rowid DESC
            LIMIT $3
            ",
        )
        .bind(&caller.profile_id)
        .bind(peer_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get conversation: {e}")))?;

        // Reverse to get chronological order
        let mut messages = rows
            .iter()
            .map(|r| {
                Ok(ChatMessage {
                    id: r.try_get("id")?,
                    sender_id: r.try_get("sender_id")?,
                    receiver_id: r.try_get("receiver_id")?,
                    content: r.try_get("content")?,
                    created_at: r.try_get("created_at")?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        messages.reverse();

        Ok(messages)
    }
}
