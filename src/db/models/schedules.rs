//! Store models for shopping schedules.

use crate::types::{GroupId, ScheduleId};
use chrono::{DateTime, Utc};

/// Store request for creating a schedule. Callers validate that
/// `start_date` precedes `end_date` before the request reaches the store.
#[derive(Debug, Clone)]
pub struct ScheduleCreateDBRequest {
    pub group_id: GroupId,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Store request for updating a schedule
#[derive(Debug, Clone, Default)]
pub struct ScheduleUpdateDBRequest {
    pub name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Store response for a schedule
#[derive(Debug, Clone)]
pub struct ScheduleDBResponse {
    pub id: ScheduleId,
    pub group_id: GroupId,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
