//! Storage abstraction for the service.
//!
//! Handlers never talk to a database driver directly; everything goes
//! through [`Store`]. The Postgres implementation backs real
//! deployments, the in-memory implementation backs development mode
//! and the test suite. Membership invariants (no duplicate members,
//! never orphaning a group's last admin) are enforced inside the store
//! so the check and the write happen in one atomic step.

use crate::api::models::groups::GroupRole;
use crate::db::errors::Result;
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
use crate::types::{GroupId, ItemId, ListId, ScheduleId, UserId};

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // Users

    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse>;
    async fn get_user(&self, id: UserId) -> Result<UserDBResponse>;
    /// Credential lookup for login. Nickname is the login identifier.
    async fn get_user_by_nickname(&self, nickname: &str) -> Result<UserDBResponse>;
    async fn update_user(
        &self,
        id: UserId,
        request: &UserUpdateDBRequest,
    ) -> Result<UserDBResponse>;

    // Groups

    /// Creates a group and enrols the creator as its first GroupAdmin
    /// in the same atomic step.
    async fn create_group(&self, request: &GroupCreateDBRequest) -> Result<GroupDBResponse>;
    async fn get_group(&self, id: GroupId) -> Result<GroupDBResponse>;
    async fn update_group(
        &self,
        id: GroupId,
        request: &GroupUpdateDBRequest,
    ) -> Result<GroupDBResponse>;
    /// Deletes a group and everything scoped to it.
    async fn delete_group(&self, id: GroupId) -> Result<()>;
    /// Groups the given user belongs to, for the own-groups listing.
    async fn groups_for_user(&self, user_id: UserId) -> Result<Vec<GroupDBResponse>>;

    // Memberships

    async fn add_member(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<MembershipDBResponse>;
    /// Removes a member. Fails with `LastAdmin` when the member is the
    /// sole GroupAdmin and other members remain; deletes the group
    /// when the member was the last one left.
    async fn remove_member(&self, group_id: GroupId, user_id: UserId) -> Result<MemberRemoval>;
    /// Changes a member's role. Demoting the sole GroupAdmin while
    /// other members remain fails with `LastAdmin`.
    async fn set_member_role(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<MembershipDBResponse>;
    /// The caller's role inside a group, or `NotFound` if they are not
    /// a member. Used by the access guards.
    async fn role_of(&self, group_id: GroupId, user_id: UserId) -> Result<GroupRole>;
    async fn members(&self, group_id: GroupId) -> Result<Vec<MembershipDBResponse>>;

    // Items

    async fn create_item(&self, request: &ItemCreateDBRequest) -> Result<ItemDBResponse>;
    async fn get_item(&self, group_id: GroupId, id: ItemId) -> Result<ItemDBResponse>;
    async fn update_item(
        &self,
        group_id: GroupId,
        id: ItemId,
        request: &ItemUpdateDBRequest,
    ) -> Result<ItemDBResponse>;
    async fn delete_item(&self, group_id: GroupId, id: ItemId) -> Result<()>;
    async fn list_items(&self, group_id: GroupId) -> Result<Vec<ItemDBResponse>>;

    // Grocery lists

    async fn create_list(
        &self,
        request: &GroceryListCreateDBRequest,
    ) -> Result<GroceryListDBResponse>;
    async fn get_list(&self, group_id: GroupId, id: ListId) -> Result<GroceryListDBResponse>;
    async fn update_list(
        &self,
        group_id: GroupId,
        id: ListId,
        request: &GroceryListUpdateDBRequest,
    ) -> Result<GroceryListDBResponse>;
    async fn delete_list(&self, group_id: GroupId, id: ListId) -> Result<()>;
    async fn list_lists(&self, group_id: GroupId) -> Result<Vec<GroceryListDBResponse>>;

    // Messages

    async fn create_message(&self, request: &MessageCreateDBRequest) -> Result<MessageDBResponse>;
    async fn list_messages(&self, group_id: GroupId) -> Result<Vec<MessageDBResponse>>;

    // Schedules

    async fn create_schedule(
        &self,
        request: &ScheduleCreateDBRequest,
    ) -> Result<ScheduleDBResponse>;
    async fn get_schedule(&self, group_id: GroupId, id: ScheduleId) -> Result<ScheduleDBResponse>;
    async fn update_schedule(
        &self,
        group_id: GroupId,
        id: ScheduleId,
        request: &ScheduleUpdateDBRequest,
    ) -> Result<ScheduleDBResponse>;
    async fn delete_schedule(&self, group_id: GroupId, id: ScheduleId) -> Result<()>;
    async fn list_schedules(&self, group_id: GroupId) -> Result<Vec<ScheduleDBResponse>>;
}
