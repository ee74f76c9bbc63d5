//! Store models for group messages. Messages are append-only.

use crate::types::{GroupId, MessageId, UserId};
use chrono::{DateTime, Utc};

/// Store request for posting a message to a group board
#[derive(Debug, Clone)]
pub struct MessageCreateDBRequest {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub text: String,
}

/// Store response for a message
#[derive(Debug, Clone)]
pub struct MessageDBResponse {
    pub id: MessageId,
    pub group_id: GroupId,
    pub user_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
