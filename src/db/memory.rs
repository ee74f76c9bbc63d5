//! In-memory [`Store`] implementation.
//!
//! Backs development mode and the test suite. All state lives in a
//! single `RwLock` so each operation is atomic with respect to every
//! other, which is what the membership invariants rely on. Constraint
//! violations are reported with the same constraint names the Postgres
//! schema produces so error mapping stays uniform across backends.

use crate::api::models::groups::GroupRole;
use crate::db::errors::{Result, StoreError};
use crate::db::models::{
    groups::{
        GroupCreateDBRequest, GroupDBResponse, GroupUpdateDBRequest, MemberRemoval,
        MembershipDBResponse,
    },
    items::{ItemCreateDBRequest, ItemDBResponse, ItemUpdateDBRequest},
    lists::{GroceryListCreateDBRequest, GroceryListDBResponse, GroceryListUpdateDBRequest},
    messages::{MessageCreateDBRequest, MessageDBResponse},
    schedules::{ScheduleCreateDBRequest, ScheduleDBResponse, ScheduleUpdateDBRequest},
    users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use crate::db::store::Store;
use crate::types::{GroupId, ItemId, ListId, ScheduleId, UserId};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemState {
    users: HashMap<UserId, UserDBResponse>,
    groups: HashMap<GroupId, GroupDBResponse>,
    memberships: HashMap<(GroupId, UserId), MembershipDBResponse>,
    items: HashMap<ItemId, ItemDBResponse>,
    lists: HashMap<ListId, GroceryListDBResponse>,
    messages: Vec<MessageDBResponse>,
    schedules: HashMap<ScheduleId, ScheduleDBResponse>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unique_violation(constraint: &str, table: &str, message: &str) -> StoreError {
    StoreError::UniqueViolation {
        constraint: Some(constraint.to_string()),
        table: Some(table.to_string()),
        message: message.to_string(),
    }
}

fn foreign_key_violation(constraint: &str, table: &str, message: &str) -> StoreError {
    StoreError::ForeignKeyViolation {
        constraint: Some(constraint.to_string()),
        table: Some(table.to_string()),
        message: message.to_string(),
    }
}

fn check_violation(constraint: &str, table: &str, message: &str) -> StoreError {
    StoreError::CheckViolation {
        constraint: Some(constraint.to_string()),
        table: Some(table.to_string()),
        message: message.to_string(),
    }
}

impl MemState {
    /// Admin count and total member count for a group.
    fn member_counts(&self, group_id: GroupId) -> (usize, usize) {
        let mut admins = 0;
        let mut total = 0;
        for m in self.memberships.values() {
            if m.group_id == group_id {
                total += 1;
                if m.role == GroupRole::GroupAdmin {
                    admins += 1;
                }
            }
        }
        (admins, total)
    }

    /// Removes a group and everything scoped to it.
    fn purge_group(&mut self, group_id: GroupId) {
        self.groups.remove(&group_id);
        self.memberships.retain(|(g, _), _| *g != group_id);
        self.items.retain(|_, i| i.group_id != group_id);
        self.lists.retain(|_, l| l.group_id != group_id);
        self.messages.retain(|m| m.group_id != group_id);
        self.schedules.retain(|_, s| s.group_id != group_id);
    }

    /// Verifies every referenced item exists and belongs to the group.
    fn check_list_items(&self, group_id: GroupId, items: &[ItemId]) -> Result<()> {
        for id in items {
            match self.items.get(id) {
                Some(item) if item.group_id == group_id => {}
                _ => {
                    return Err(foreign_key_violation(
                        "grocery_list_items_item_id_fkey",
                        "grocery_list_items",
                        &format!("item {id} does not exist in this group"),
                    ))
                }
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.nickname == request.nickname) {
            return Err(unique_violation(
                "users_nickname_key",
                "users",
                "nickname already taken",
            ));
        }
        if state.users.values().any(|u| u.email == request.email) {
            return Err(unique_violation(
                "users_email_key",
                "users",
                "email already registered",
            ));
        }
        let now = Utc::now();
        let user = UserDBResponse {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            email: request.email.clone(),
            nickname: request.nickname.clone(),
            global_role: request.global_role,
            secret_hash: request.secret_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<UserDBResponse> {
        let state = self.state.read().await;
        state.users.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn get_user_by_nickname(&self, nickname: &str) -> Result<UserDBResponse> {
        let state = self.state.read().await;
        state
            .users
            .values()
            .find(|u| u.nickname == nickname)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_user(
        &self,
        id: UserId,
        request: &UserUpdateDBRequest,
    ) -> Result<UserDBResponse> {
        let mut state = self.state.write().await;
        if let Some(email) = &request.email {
            if state
                .users
                .values()
                .any(|u| u.id != id && &u.email == email)
            {
                return Err(unique_violation(
                    "users_email_key",
                    "users",
                    "email already registered",
                ));
            }
        }
        let user = state.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = &request.name {
            user.name = name.clone();
        }
        if let Some(email) = &request.email {
            user.email = email.clone();
        }
        if let Some(hash) = &request.secret_hash {
            user.secret_hash = hash.clone();
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn create_group(&self, request: &GroupCreateDBRequest) -> Result<GroupDBResponse> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&request.created_by) {
            return Err(foreign_key_violation(
                "memberships_user_id_fkey",
                "memberships",
                "creating user does not exist",
            ));
        }
        let now = Utc::now();
        let group = GroupDBResponse {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            created_at: now,
            updated_at: now,
        };
        state.groups.insert(group.id, group.clone());
        state.memberships.insert(
            (group.id, request.created_by),
            MembershipDBResponse {
                user_id: request.created_by,
                group_id: group.id,
                role: GroupRole::GroupAdmin,
                joined_at: now,
            },
        );
        Ok(group)
    }

    async fn get_group(&self, id: GroupId) -> Result<GroupDBResponse> {
        let state = self.state.read().await;
        state.groups.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_group(
        &self,
        id: GroupId,
        request: &GroupUpdateDBRequest,
    ) -> Result<GroupDBResponse> {
        let mut state = self.state.write().await;
        let group = state.groups.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = &request.name {
            group.name = name.clone();
        }
        group.updated_at = Utc::now();
        Ok(group.clone())
    }

    async fn delete_group(&self, id: GroupId) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        state.purge_group(id);
        Ok(())
    }

    async fn groups_for_user(&self, user_id: UserId) -> Result<Vec<GroupDBResponse>> {
        let state = self.state.read().await;
        let mut groups: Vec<GroupDBResponse> = state
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| state.groups.get(&m.group_id).cloned())
            .collect();
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(groups)
    }

    async fn add_member(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<MembershipDBResponse> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&group_id) {
            return Err(StoreError::NotFound);
        }
        if !state.users.contains_key(&user_id) {
            return Err(foreign_key_violation(
                "memberships_user_id_fkey",
                "memberships",
                "user does not exist",
            ));
        }
        if state.memberships.contains_key(&(group_id, user_id)) {
            return Err(unique_violation(
                "memberships_pkey",
                "memberships",
                "user is already a member of this group",
            ));
        }
        let membership = MembershipDBResponse {
            user_id,
            group_id,
            role,
            joined_at: Utc::now(),
        };
        state.memberships.insert((group_id, user_id), membership.clone());
        Ok(membership)
    }

    async fn remove_member(&self, group_id: GroupId, user_id: UserId) -> Result<MemberRemoval> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&group_id) {
            return Err(StoreError::NotFound);
        }
        let member = state
            .memberships
            .get(&(group_id, user_id))
            .cloned()
            .ok_or(StoreError::NotFound)?;
        let (admins, total) = state.member_counts(group_id);
        if total == 1 {
            // Last member out turns off the lights.
            state.purge_group(group_id);
            return Ok(MemberRemoval::GroupDeleted);
        }
        if member.role == GroupRole::GroupAdmin && admins == 1 {
            return Err(StoreError::LastAdmin { group_id });
        }
        state.memberships.remove(&(group_id, user_id));
        Ok(MemberRemoval::Removed)
    }

    async fn set_member_role(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<MembershipDBResponse> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&group_id) {
            return Err(StoreError::NotFound);
        }
        let current = state
            .memberships
            .get(&(group_id, user_id))
            .cloned()
            .ok_or(StoreError::NotFound)?;
        if current.role == GroupRole::GroupAdmin && role != GroupRole::GroupAdmin {
            let (admins, total) = state.member_counts(group_id);
            if admins == 1 && total > 1 {
                return Err(StoreError::LastAdmin { group_id });
            }
        }
        let membership = state
            .memberships
            .get_mut(&(group_id, user_id))
            .ok_or(StoreError::NotFound)?;
        membership.role = role;
        Ok(membership.clone())
    }

    async fn role_of(&self, group_id: GroupId, user_id: UserId) -> Result<GroupRole> {
        let state = self.state.read().await;
        if !state.groups.contains_key(&group_id) {
            return Err(StoreError::NotFound);
        }
        state
            .memberships
            .get(&(group_id, user_id))
            .map(|m| m.role)
            .ok_or(StoreError::NotFound)
    }

    async fn members(&self, group_id: GroupId) -> Result<Vec<MembershipDBResponse>> {
        let state = self.state.read().await;
        if !state.groups.contains_key(&group_id) {
            return Err(StoreError::NotFound);
        }
        let mut members: Vec<MembershipDBResponse> = state
            .memberships
            .values()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(members)
    }

    async fn create_item(&self, request: &ItemCreateDBRequest) -> Result<ItemDBResponse> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&request.group_id) {
            return Err(StoreError::NotFound);
        }
        if request.price < rust_decimal::Decimal::ZERO {
            return Err(check_violation(
                "items_price_check",
                "items",
                "price must not be negative",
            ));
        }
        let now = Utc::now();
        let item = ItemDBResponse {
            id: Uuid::new_v4(),
            group_id: request.group_id,
            name: request.name.clone(),
            description: request.description.clone(),
            consumable_type: request.consumable_type,
            price: request.price,
            weight: request.weight,
            quantity: request.quantity,
            is_completed: false,
            created_at: now,
            updated_at: now,
        };
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get_item(&self, group_id: GroupId, id: ItemId) -> Result<ItemDBResponse> {
        let state = self.state.read().await;
        state
            .items
            .get(&id)
            .filter(|i| i.group_id == group_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_item(
        &self,
        group_id: GroupId,
        id: ItemId,
        request: &ItemUpdateDBRequest,
    ) -> Result<ItemDBResponse> {
        let mut state = self.state.write().await;
        let item = state
            .items
            .get_mut(&id)
            .filter(|i| i.group_id == group_id)
            .ok_or(StoreError::NotFound)?;
        if let Some(price) = request.price {
            if price < rust_decimal::Decimal::ZERO {
                return Err(check_violation(
                    "items_price_check",
                    "items",
                    "price must not be negative",
                ));
            }
            item.price = price;
        }
        if let Some(name) = &request.name {
            item.name = name.clone();
        }
        if let Some(description) = &request.description {
            item.description = Some(description.clone());
        }
        if let Some(consumable_type) = request.consumable_type {
            item.consumable_type = consumable_type;
        }
        if let Some(weight) = request.weight {
            item.weight = Some(weight);
        }
        if let Some(quantity) = request.quantity {
            item.quantity = quantity;
        }
        if let Some(is_completed) = request.is_completed {
            item.is_completed = is_completed;
        }
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete_item(&self, group_id: GroupId, id: ItemId) -> Result<()> {
        let mut state = self.state.write().await;
        match state.items.get(&id) {
            Some(item) if item.group_id == group_id => {}
            _ => return Err(StoreError::NotFound),
        }
        state.items.remove(&id);
        // Drop dangling references from lists, like ON DELETE CASCADE
        // on the join table.
        for list in state.lists.values_mut() {
            list.items.retain(|i| *i != id);
        }
        Ok(())
    }

    async fn list_items(&self, group_id: GroupId) -> Result<Vec<ItemDBResponse>> {
        let state = self.state.read().await;
        if !state.groups.contains_key(&group_id) {
            return Err(StoreError::NotFound);
        }
        let mut items: Vec<ItemDBResponse> = state
            .items
            .values()
            .filter(|i| i.group_id == group_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(items)
    }

    async fn create_list(
        &self,
        request: &GroceryListCreateDBRequest,
    ) -> Result<GroceryListDBResponse> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&request.group_id) {
            return Err(StoreError::NotFound);
        }
        state.check_list_items(request.group_id, &request.items)?;
        let now = Utc::now();
        let list = GroceryListDBResponse {
            id: Uuid::new_v4(),
            group_id: request.group_id,
            name: request.name.clone(),
            items: request.items.clone(),
            created_at: now,
            updated_at: now,
        };
        state.lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn get_list(&self, group_id: GroupId, id: ListId) -> Result<GroceryListDBResponse> {
        let state = self.state.read().await;
        state
            .lists
            .get(&id)
            .filter(|l| l.group_id == group_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_list(
        &self,
        group_id: GroupId,
        id: ListId,
        request: &GroceryListUpdateDBRequest,
    ) -> Result<GroceryListDBResponse> {
        let mut state = self.state.write().await;
        match state.lists.get(&id) {
            Some(list) if list.group_id == group_id => {}
            _ => return Err(StoreError::NotFound),
        }
        if let Some(items) = &request.items {
            state.check_list_items(group_id, items)?;
        }
        let list = state.lists.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = &request.name {
            list.name = name.clone();
        }
        if let Some(items) = &request.items {
            list.items = items.clone();
        }
        list.updated_at = Utc::now();
        Ok(list.clone())
    }

    async fn delete_list(&self, group_id: GroupId, id: ListId) -> Result<()> {
        let mut state = self.state.write().await;
        match state.lists.get(&id) {
            Some(list) if list.group_id == group_id => {}
            _ => return Err(StoreError::NotFound),
        }
        state.lists.remove(&id);
        Ok(())
    }

    async fn list_lists(&self, group_id: GroupId) -> Result<Vec<GroceryListDBResponse>> {
        let state = self.state.read().await;
        if !state.groups.contains_key(&group_id) {
            return Err(StoreError::NotFound);
        }
        let mut lists: Vec<GroceryListDBResponse> = state
            .lists
            .values()
            .filter(|l| l.group_id == group_id)
            .cloned()
            .collect();
        lists.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(lists)
    }

    async fn create_message(&self, request: &MessageCreateDBRequest) -> Result<MessageDBResponse> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&request.group_id) {
            return Err(StoreError::NotFound);
        }
        let message = MessageDBResponse {
            id: Uuid::new_v4(),
            group_id: request.group_id,
            user_id: request.user_id,
            text: request.text.clone(),
            created_at: Utc::now(),
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, group_id: GroupId) -> Result<Vec<MessageDBResponse>> {
        let state = self.state.read().await;
        if !state.groups.contains_key(&group_id) {
            return Err(StoreError::NotFound);
        }
        Ok(state
            .messages
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn create_schedule(
        &self,
        request: &ScheduleCreateDBRequest,
    ) -> Result<ScheduleDBResponse> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&request.group_id) {
            return Err(StoreError::NotFound);
        }
        if request.start_date >= request.end_date {
            return Err(check_violation(
                "schedules_date_check",
                "schedules",
                "start date must precede end date",
            ));
        }
        let now = Utc::now();
        let schedule = ScheduleDBResponse {
            id: Uuid::new_v4(),
            group_id: request.group_id,
            name: request.name.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            created_at: now,
            updated_at: now,
        };
        state.schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn get_schedule(&self, group_id: GroupId, id: ScheduleId) -> Result<ScheduleDBResponse> {
        let state = self.state.read().await;
        state
            .schedules
            .get(&id)
            .filter(|s| s.group_id == group_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_schedule(
        &self,
        group_id: GroupId,
        id: ScheduleId,
        request: &ScheduleUpdateDBRequest,
    ) -> Result<ScheduleDBResponse> {
        let mut state = self.state.write().await;
        let schedule = state
            .schedules
            .get_mut(&id)
            .filter(|s| s.group_id == group_id)
            .ok_or(StoreError::NotFound)?;
        let start = request.start_date.unwrap_or(schedule.start_date);
        let end = request.end_date.unwrap_or(schedule.end_date);
        if start >= end {
            return Err(check_violation(
                "schedules_date_check",
                "schedules",
                "start date must precede end date",
            ));
        }
        if let Some(name) = &request.name {
            schedule.name = name.clone();
        }
        schedule.start_date = start;
        schedule.end_date = end;
        schedule.updated_at = Utc::now();
        Ok(schedule.clone())
    }

    async fn delete_schedule(&self, group_id: GroupId, id: ScheduleId) -> Result<()> {
        let mut state = self.state.write().await;
        match state.schedules.get(&id) {
            Some(schedule) if schedule.group_id == group_id => {}
            _ => return Err(StoreError::NotFound),
        }
        state.schedules.remove(&id);
        Ok(())
    }

    async fn list_schedules(&self, group_id: GroupId) -> Result<Vec<ScheduleDBResponse>> {
        let state = self.state.read().await;
        if !state.groups.contains_key(&group_id) {
            return Err(StoreError::NotFound);
        }
        let mut schedules: Vec<ScheduleDBResponse> = state
            .schedules
            .values()
            .filter(|s| s.group_id == group_id)
            .cloned()
            .collect();
        schedules.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        Ok(schedules)
    }
}
