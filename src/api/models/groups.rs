//! API request/response models for groups and memberships.

use crate::db::models::groups::{GroupDBResponse, MembershipDBResponse};
use crate::types::{GroupId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-group privilege level, scoped to one group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GroupRole {
    #[serde(rename = "GroupAdmin")]
    GroupAdmin,
    #[serde(rename = "user")]
    User,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::GroupAdmin => "GroupAdmin",
            GroupRole::User => "user",
        }
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GroupAdmin" => Ok(GroupRole::GroupAdmin),
            "user" => Ok(GroupRole::User),
            other => Err(anyhow::anyhow!("unknown group role: {other}")),
        }
    }
}

/// Request body for creating a new group. The creator becomes its first
/// `GroupAdmin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupCreate {
    pub name: String,
}

/// Request body for updating an existing group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupUpdate {
    pub name: Option<String>,
}

/// Full group details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResponse {
    pub id: GroupId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupDBResponse> for GroupResponse {
    fn from(db: GroupDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Request body for adding a member to a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberAdd {
    pub user_id: UserId,
    pub role: GroupRole,
}

/// Request body for changing a member's group role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRoleUpdate {
    pub role: GroupRole,
}

/// A single membership row returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberResponse {
    pub user_id: UserId,
    pub group_id: GroupId,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

impl From<MembershipDBResponse> for MemberResponse {
    fn from(db: MembershipDBResponse) -> Self {
        Self {
            user_id: db.user_id,
            group_id: db.group_id,
            role: db.role,
            joined_at: db.joined_at,
        }
    }
}
