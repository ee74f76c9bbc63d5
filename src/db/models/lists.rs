//! Store models for grocery lists.

use crate::types::{GroupId, ItemId, ListId};
use chrono::{DateTime, Utc};

/// Store request for creating a grocery list with its initial item
/// references. Referenced items must belong to the same group.
#[derive(Debug, Clone)]
pub struct GroceryListCreateDBRequest {
    pub group_id: GroupId,
    pub name: String,
    pub items: Vec<ItemId>,
}

/// Store request for updating a grocery list. `items`, when present,
/// replaces the full reference set.
#[derive(Debug, Clone, Default)]
pub struct GroceryListUpdateDBRequest {
    pub name: Option<String>,
    pub items: Option<Vec<ItemId>>,
}

/// Store response for a grocery list
#[derive(Debug, Clone)]
pub struct GroceryListDBResponse {
    pub id: ListId,
    pub group_id: GroupId,
    pub name: String,
    pub items: Vec<ItemId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
