//! API request/response models for catalog items.

use crate::db::models::items::ItemDBResponse;
use crate::types::{GroupId, ItemId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rough classification of what an item is consumed as.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConsumableType {
    Food,
    Drink,
    Household,
    Other,
}

impl ConsumableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumableType::Food => "food",
            ConsumableType::Drink => "drink",
            ConsumableType::Household => "household",
            ConsumableType::Other => "other",
        }
    }
}

impl fmt::Display for ConsumableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsumableType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "food" => Ok(ConsumableType::Food),
            "drink" => Ok(ConsumableType::Drink),
            "household" => Ok(ConsumableType::Household),
            "other" => Ok(ConsumableType::Other),
            other => Err(anyhow::anyhow!("unknown consumable type: {other}")),
        }
    }
}

/// Request body for adding an item to a group's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub consumable_type: ConsumableType,
    pub price: Decimal,
    pub weight: Option<Decimal>,
    pub quantity: i32,
}

/// Request body for updating an item. All fields are optional; only provided
/// fields are changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub consumable_type: Option<ConsumableType>,
    pub price: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub quantity: Option<i32>,
    pub is_completed: Option<bool>,
}

/// Full item details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse {
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

impl From<ItemDBResponse> for ItemResponse {
    fn from(db: ItemDBResponse) -> Self {
        Self {
            id: db.id,
            group_id: db.group_id,
            name: db.name,
            description: db.description,
            consumable_type: db.consumable_type,
            price: db.price,
            weight: db.weight,
            quantity: db.quantity,
            is_completed: db.is_completed,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
