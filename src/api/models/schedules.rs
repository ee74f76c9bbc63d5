//! API request/response models for group schedules.

use crate::db::models::schedules::ScheduleDBResponse;
use crate::types::{GroupId, ScheduleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for creating a schedule. `start_date` must be strictly
/// before `end_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleCreate {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Request body for updating a schedule. The date ordering invariant is
/// re-checked against the merged result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Full schedule details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub id: ScheduleId,
    pub group_id: GroupId,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScheduleDBResponse> for ScheduleResponse {
    fn from(db: ScheduleDBResponse) -> Self {
        Self {
            id: db.id,
            group_id: db.group_id,
            name: db.name,
            start_date: db.start_date,
            end_date: db.end_date,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
