//! Store models for groups and memberships.

use crate::api::models::groups::GroupRole;
use crate::types::{GroupId, UserId};
use chrono::{DateTime, Utc};

/// Store request for creating a new group. The creator is inserted as the
/// first `GroupAdmin` member in the same atomic operation.
#[derive(Debug, Clone)]
pub struct GroupCreateDBRequest {
    pub name: String,
    pub created_by: UserId,
}

/// Store request for updating a group
#[derive(Debug, Clone, Default)]
pub struct GroupUpdateDBRequest {
    pub name: Option<String>,
}

/// Store response for a group
#[derive(Debug, Clone)]
pub struct GroupDBResponse {
    pub id: GroupId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store response for a membership row
#[derive(Debug, Clone)]
pub struct MembershipDBResponse {
    pub user_id: UserId,
    pub group_id: GroupId,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Outcome of removing a member. Removing the last remaining member deletes
/// the group itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRemoval {
    Removed,
    GroupDeleted,
}
