//! API request/response models for grocery lists.

use crate::db::models::lists::GroceryListDBResponse;
use crate::types::{GroupId, ItemId, ListId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for creating a grocery list. A list must reference at least
/// one catalog item at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroceryListCreate {
    pub name: String,
    pub items: Vec<ItemId>,
}

/// Request body for updating a grocery list. `items`, when present, replaces
/// the full set of item references (and may be empty: the one-item floor only
/// applies at creation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroceryListUpdate {
    pub name: Option<String>,
    pub items: Option<Vec<ItemId>>,
}

/// Full grocery list details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroceryListResponse {
    pub id: ListId,
    pub group_id: GroupId,
    pub name: String,
    pub items: Vec<ItemId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroceryListDBResponse> for GroceryListResponse {
    fn from(db: GroceryListDBResponse) -> Self {
        Self {
            id: db.id,
            group_id: db.group_id,
            name: db.name,
            items: db.items,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
