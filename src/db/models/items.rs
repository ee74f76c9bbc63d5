//! Store models for catalog items.

use crate::api::models::items::ConsumableType;
use crate::types::{GroupId, ItemId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Store request for creating an item in a group's catalog
#[derive(Debug, Clone)]
pub struct ItemCreateDBRequest {
    pub group_id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub consumable_type: ConsumableType,
    pub price: Decimal,
    pub weight: Option<Decimal>,
    pub quantity: i32,
}

/// Store request for updating an item
#[derive(Debug, Clone, Default)]
pub struct ItemUpdateDBRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub consumable_type: Option<ConsumableType>,
    pub price: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub quantity: Option<i32>,
    pub is_completed: Option<bool>,
}

/// Store response for an item
#[derive(Debug, Clone)]
pub struct ItemDBResponse {
    pub id: ItemId,
    pub group_id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub consumable_type: ConsumableType,
    pub price: Decimal,
    pub weight: Option<Decimal>,
    pub quantity: i32,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
