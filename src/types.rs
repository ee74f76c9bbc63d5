//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases for better type safety:
//!
//! - [`UserId`]: User account identifier
//! - [`GroupId`]: Group identifier (the tenancy boundary)
//! - [`ListId`]: Grocery list identifier
//! - [`ItemId`]: Catalog item identifier
//! - [`MessageId`]: Group message identifier
//! - [`ScheduleId`]: Schedule identifier

use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type GroupId = Uuid;
pub type ListId = Uuid;
pub type ItemId = Uuid;
pub type MessageId = Uuid;
pub type ScheduleId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
