//! API request/response models for group messages.

use crate::db::models::messages::MessageDBResponse;
use crate::types::{GroupId, MessageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for posting a message to a group. Messages are immutable
/// once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreate {
    pub text: String,
}

/// A single message returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: MessageId,
    pub group_id: GroupId,
    pub user_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<MessageDBResponse> for MessageResponse {
    fn from(db: MessageDBResponse) -> Self {
        Self {
            id: db.id,
            group_id: db.group_id,
            user_id: db.user_id,
            text: db.text,
            created_at: db.created_at,
        }
    }
}
