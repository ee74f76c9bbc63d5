//! Postgres [`Store`] implementation.
//!
//! Multi-step operations run inside a transaction. The membership
//! invariants take a row lock on the group first so concurrent
//! membership changes serialize against each other and cannot race
//! the admin count.

use crate::api::models::{groups::GroupRole, items::ConsumableType, users::GlobalRole};
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
use crate::types::{abbrev_uuid, GroupId, ItemId, ListId, ScheduleId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::str::FromStr;
use tracing::instrument;
use uuid::Uuid;

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Locks the group row, returning `NotFound` if the group does not
    /// exist. Membership writes call this first.
    async fn lock_group(&self, tx: &mut Transaction<'_, Postgres>, id: GroupId) -> Result<()> {
        let found: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM groups WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;
        found.map(|_| ()).ok_or(StoreError::NotFound)
    }
}

// Row types mirror the schema; role columns are TEXT and get parsed
// into their enums on the way out.

#[derive(FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: String,
    nickname: String,
    global_role: String,
    secret_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserDBResponse {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            nickname: row.nickname,
            global_role: GlobalRole::from_str(&row.global_role)?,
            secret_hash: row.secret_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct GroupRow {
    id: GroupId,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GroupRow> for GroupDBResponse {
    fn from(row: GroupRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct MembershipRow {
    user_id: UserId,
    group_id: GroupId,
    role: String,
    joined_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for MembershipDBResponse {
    type Error = StoreError;

    fn try_from(row: MembershipRow) -> Result<Self> {
        Ok(Self {
            user_id: row.user_id,
            group_id: row.group_id,
            role: GroupRole::from_str(&row.role)?,
            joined_at: row.joined_at,
        })
    }
}

#[derive(FromRow)]
struct ItemRow {
    id: ItemId,
    group_id: GroupId,
    name: String,
    description: Option<String>,
    consumable_type: String,
    price: Decimal,
    weight: Option<Decimal>,
    quantity: i32,
    is_completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for ItemDBResponse {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            group_id: row.group_id,
            name: row.name,
            description: row.description,
            consumable_type: ConsumableType::from_str(&row.consumable_type)?,
            price: row.price,
            weight: row.weight,
            quantity: row.quantity,
            is_completed: row.is_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ListRow {
    id: ListId,
    group_id: GroupId,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ListRow {
    fn into_response(self, items: Vec<ItemId>) -> GroceryListDBResponse {
        GroceryListDBResponse {
            id: self.id,
            group_id: self.group_id,
            name: self.name,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct MessageRow {
    id: Uuid,
    group_id: GroupId,
    user_id: UserId,
    text: String,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for MessageDBResponse {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            group_id: row.group_id,
            user_id: row.user_id,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ScheduleRow {
    id: ScheduleId,
    group_id: GroupId,
    name: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ScheduleRow> for ScheduleDBResponse {
    fn from(row: ScheduleRow) -> Self {
        Self {
            id: row.id,
            group_id: row.group_id,
            name: row.name,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Replaces a list's item references inside an open transaction.
async fn replace_list_items(
    tx: &mut Transaction<'_, Postgres>,
    list_id: ListId,
    group_id: GroupId,
    items: &[ItemId],
) -> Result<()> {
    sqlx::query("DELETE FROM grocery_list_items WHERE list_id = $1")
        .bind(list_id)
        .execute(&mut **tx)
        .await?;
    for (position, item_id) in items.iter().enumerate() {
        // The group check keeps cross-group item references out even
        // though the foreign key alone would accept them.
        let inserted = sqlx::query(
            r#"
            INSERT INTO grocery_list_items (list_id, item_id, position)
            SELECT $1, id, $3 FROM items WHERE id = $2 AND group_id = $4
            "#,
        )
        .bind(list_id)
        .bind(item_id)
        .bind(position as i32)
        .bind(group_id)
        .execute(&mut **tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Err(StoreError::ForeignKeyViolation {
                constraint: Some("grocery_list_items_item_id_fkey".to_string()),
                table: Some("grocery_list_items".to_string()),
                message: format!("item {item_id} does not exist in this group"),
            });
        }
    }
    Ok(())
}

async fn list_item_ids(
    tx: &mut Transaction<'_, Postgres>,
    list_id: ListId,
) -> Result<Vec<ItemId>> {
    Ok(sqlx::query_scalar(
        "SELECT item_id FROM grocery_list_items WHERE list_id = $1 ORDER BY position",
    )
    .bind(list_id)
    .fetch_all(&mut **tx)
    .await?)
}

#[async_trait::async_trait]
impl Store for PostgresStore {
    #[instrument(skip(self, request), fields(nickname = %request.nickname), err)]
    async fn create_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, nickname, global_role, secret_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.nickname)
        .bind(request.global_role.as_str())
        .bind(&request.secret_hash)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_user(&self, id: UserId) -> Result<UserDBResponse> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        row.try_into()
    }

    #[instrument(skip(self), err)]
    async fn get_user_by_nickname(&self, nickname: &str) -> Result<UserDBResponse> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE nickname = $1")
            .bind(nickname)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        row.try_into()
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update_user(
        &self,
        id: UserId,
        request: &UserUpdateDBRequest,
    ) -> Result<UserDBResponse> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                secret_hash = COALESCE($4, secret_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.secret_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        row.try_into()
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create_group(&self, request: &GroupCreateDBRequest) -> Result<GroupDBResponse> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, GroupRow>(
            "INSERT INTO groups (id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query("INSERT INTO memberships (group_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(row.id)
            .bind(request.created_by)
            .bind(GroupRole::GroupAdmin.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(row.into())
    }

    #[instrument(skip(self), fields(group_id = %abbrev_uuid(&id)), err)]
    async fn get_group(&self, id: GroupId) -> Result<GroupDBResponse> {
        let row = sqlx::query_as::<_, GroupRow>("SELECT * FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(row.into())
    }

    #[instrument(skip(self, request), fields(group_id = %abbrev_uuid(&id)), err)]
    async fn update_group(
        &self,
        id: GroupId,
        request: &GroupUpdateDBRequest,
    ) -> Result<GroupDBResponse> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            UPDATE groups SET name = COALESCE($2, name), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        Ok(row.into())
    }

    #[instrument(skip(self), fields(group_id = %abbrev_uuid(&id)), err)]
    async fn delete_group(&self, id: GroupId) -> Result<()> {
        // Scoped rows go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    async fn groups_for_user(&self, user_id: UserId) -> Result<Vec<GroupDBResponse>> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT g.* FROM groups g
            JOIN memberships m ON m.group_id = g.id
            WHERE m.user_id = $1
            ORDER BY g.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(
        skip(self),
        fields(group_id = %abbrev_uuid(&group_id), user_id = %abbrev_uuid(&user_id)),
        err
    )]
    async fn add_member(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<MembershipDBResponse> {
        let mut tx = self.pool.begin().await?;
        self.lock_group(&mut tx, group_id).await?;
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            INSERT INTO memberships (group_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(role.as_str())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        row.try_into()
    }

    #[instrument(
        skip(self),
        fields(group_id = %abbrev_uuid(&group_id), user_id = %abbrev_uuid(&user_id)),
        err
    )]
    async fn remove_member(&self, group_id: GroupId, user_id: UserId) -> Result<MemberRemoval> {
        let mut tx = self.pool.begin().await?;
        self.lock_group(&mut tx, group_id).await?;
        let role: String =
            sqlx::query_scalar("SELECT role FROM memberships WHERE group_id = $1 AND user_id = $2")
                .bind(group_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StoreError::NotFound)?;
        let role = GroupRole::from_str(&role)?;
        let (admins, total): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE role = $2), COUNT(*)
            FROM memberships WHERE group_id = $1
            "#,
        )
        .bind(group_id)
        .bind(GroupRole::GroupAdmin.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if total == 1 {
            sqlx::query("DELETE FROM groups WHERE id = $1")
                .bind(group_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(MemberRemoval::GroupDeleted);
        }
        if role == GroupRole::GroupAdmin && admins == 1 {
            return Err(StoreError::LastAdmin { group_id });
        }
        sqlx::query("DELETE FROM memberships WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(MemberRemoval::Removed)
    }

    #[instrument(
        skip(self),
        fields(group_id = %abbrev_uuid(&group_id), user_id = %abbrev_uuid(&user_id)),
        err
    )]
    async fn set_member_role(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: GroupRole,
    ) -> Result<MembershipDBResponse> {
        let mut tx = self.pool.begin().await?;
        self.lock_group(&mut tx, group_id).await?;
        let current: String =
            sqlx::query_scalar("SELECT role FROM memberships WHERE group_id = $1 AND user_id = $2")
                .bind(group_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StoreError::NotFound)?;
        let current = GroupRole::from_str(&current)?;
        if current == GroupRole::GroupAdmin && role != GroupRole::GroupAdmin {
            let (admins, total): (i64, i64) = sqlx::query_as(
                r#"
                SELECT COUNT(*) FILTER (WHERE role = $2), COUNT(*)
                FROM memberships WHERE group_id = $1
                "#,
            )
            .bind(group_id)
            .bind(GroupRole::GroupAdmin.as_str())
            .fetch_one(&mut *tx)
            .await?;
            if admins == 1 && total > 1 {
                return Err(StoreError::LastAdmin { group_id });
            }
        }
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            UPDATE memberships SET role = $3
            WHERE group_id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(role.as_str())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        row.try_into()
    }

    #[instrument(
        skip(self),
        fields(group_id = %abbrev_uuid(&group_id), user_id = %abbrev_uuid(&user_id)),
        err
    )]
    async fn role_of(&self, group_id: GroupId, user_id: UserId) -> Result<GroupRole> {
        self.get_group(group_id).await?;
        let role: String =
            sqlx::query_scalar("SELECT role FROM memberships WHERE group_id = $1 AND user_id = $2")
                .bind(group_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(StoreError::NotFound)?;
        Ok(GroupRole::from_str(&role)?)
    }

    #[instrument(skip(self), fields(group_id = %abbrev_uuid(&group_id)), err)]
    async fn members(&self, group_id: GroupId) -> Result<Vec<MembershipDBResponse>> {
        self.get_group(group_id).await?;
        let rows = sqlx::query_as::<_, MembershipRow>(
            "SELECT * FROM memberships WHERE group_id = $1 ORDER BY joined_at",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self, request), fields(group_id = %abbrev_uuid(&request.group_id)), err)]
    async fn create_item(&self, request: &ItemCreateDBRequest) -> Result<ItemDBResponse> {
        self.get_group(request.group_id).await?;
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO items (id, group_id, name, description, consumable_type, price, weight, quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.group_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.consumable_type.as_str())
        .bind(request.price)
        .bind(request.weight)
        .bind(request.quantity)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn get_item(&self, group_id: GroupId, id: ItemId) -> Result<ItemDBResponse> {
        let row =
            sqlx::query_as::<_, ItemRow>("SELECT * FROM items WHERE id = $1 AND group_id = $2")
                .bind(id)
                .bind(group_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(StoreError::NotFound)?;
        row.try_into()
    }

    #[instrument(skip(self, request), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn update_item(
        &self,
        group_id: GroupId,
        id: ItemId,
        request: &ItemUpdateDBRequest,
    ) -> Result<ItemDBResponse> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE items SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                consumable_type = COALESCE($5, consumable_type),
                price = COALESCE($6, price),
                weight = COALESCE($7, weight),
                quantity = COALESCE($8, quantity),
                is_completed = COALESCE($9, is_completed),
                updated_at = NOW()
            WHERE id = $1 AND group_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(group_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.consumable_type.map(|t| t.as_str()))
        .bind(request.price)
        .bind(request.weight)
        .bind(request.quantity)
        .bind(request.is_completed)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        row.try_into()
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn delete_item(&self, group_id: GroupId, id: ItemId) -> Result<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1 AND group_id = $2")
            .bind(id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(group_id = %abbrev_uuid(&group_id)), err)]
    async fn list_items(&self, group_id: GroupId) -> Result<Vec<ItemDBResponse>> {
        self.get_group(group_id).await?;
        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT * FROM items WHERE group_id = $1 ORDER BY created_at",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self, request), fields(group_id = %abbrev_uuid(&request.group_id)), err)]
    async fn create_list(
        &self,
        request: &GroceryListCreateDBRequest,
    ) -> Result<GroceryListDBResponse> {
        let mut tx = self.pool.begin().await?;
        self.lock_group(&mut tx, request.group_id).await?;
        let row = sqlx::query_as::<_, ListRow>(
            "INSERT INTO grocery_lists (id, group_id, name) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(request.group_id)
        .bind(&request.name)
        .fetch_one(&mut *tx)
        .await?;
        replace_list_items(&mut tx, row.id, request.group_id, &request.items).await?;
        let items = list_item_ids(&mut tx, row.id).await?;
        tx.commit().await?;
        Ok(row.into_response(items))
    }

    #[instrument(skip(self), fields(list_id = %abbrev_uuid(&id)), err)]
    async fn get_list(&self, group_id: GroupId, id: ListId) -> Result<GroceryListDBResponse> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, ListRow>(
            "SELECT * FROM grocery_lists WHERE id = $1 AND group_id = $2",
        )
        .bind(id)
        .bind(group_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;
        let items = list_item_ids(&mut tx, row.id).await?;
        tx.commit().await?;
        Ok(row.into_response(items))
    }

    #[instrument(skip(self, request), fields(list_id = %abbrev_uuid(&id)), err)]
    async fn update_list(
        &self,
        group_id: GroupId,
        id: ListId,
        request: &GroceryListUpdateDBRequest,
    ) -> Result<GroceryListDBResponse> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, ListRow>(
            r#"
            UPDATE grocery_lists SET name = COALESCE($3, name), updated_at = NOW()
            WHERE id = $1 AND group_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(group_id)
        .bind(&request.name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;
        if let Some(items) = &request.items {
            replace_list_items(&mut tx, row.id, group_id, items).await?;
        }
        let items = list_item_ids(&mut tx, row.id).await?;
        tx.commit().await?;
        Ok(row.into_response(items))
    }

    #[instrument(skip(self), fields(list_id = %abbrev_uuid(&id)), err)]
    async fn delete_list(&self, group_id: GroupId, id: ListId) -> Result<()> {
        let result = sqlx::query("DELETE FROM grocery_lists WHERE id = $1 AND group_id = $2")
            .bind(id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(group_id = %abbrev_uuid(&group_id)), err)]
    async fn list_lists(&self, group_id: GroupId) -> Result<Vec<GroceryListDBResponse>> {
        let mut tx = self.pool.begin().await?;
        self.lock_group(&mut tx, group_id).await?;
        let rows = sqlx::query_as::<_, ListRow>(
            "SELECT * FROM grocery_lists WHERE group_id = $1 ORDER BY created_at",
        )
        .bind(group_id)
        .fetch_all(&mut *tx)
        .await?;
        let mut lists = Vec::with_capacity(rows.len());
        for row in rows {
            let items = list_item_ids(&mut tx, row.id).await?;
            lists.push(row.into_response(items));
        }
        tx.commit().await?;
        Ok(lists)
    }

    #[instrument(skip(self, request), fields(group_id = %abbrev_uuid(&request.group_id)), err)]
    async fn create_message(&self, request: &MessageCreateDBRequest) -> Result<MessageDBResponse> {
        self.get_group(request.group_id).await?;
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (id, group_id, user_id, text)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.group_id)
        .bind(request.user_id)
        .bind(&request.text)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    #[instrument(skip(self), fields(group_id = %abbrev_uuid(&group_id)), err)]
    async fn list_messages(&self, group_id: GroupId) -> Result<Vec<MessageDBResponse>> {
        self.get_group(group_id).await?;
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT * FROM messages WHERE group_id = $1 ORDER BY created_at",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, request), fields(group_id = %abbrev_uuid(&request.group_id)), err)]
    async fn create_schedule(
        &self,
        request: &ScheduleCreateDBRequest,
    ) -> Result<ScheduleDBResponse> {
        self.get_group(request.group_id).await?;
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            INSERT INTO schedules (id, group_id, name, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.group_id)
        .bind(&request.name)
        .bind(request.start_date)
        .bind(request.end_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    #[instrument(skip(self), fields(schedule_id = %abbrev_uuid(&id)), err)]
    async fn get_schedule(&self, group_id: GroupId, id: ScheduleId) -> Result<ScheduleDBResponse> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            "SELECT * FROM schedules WHERE id = $1 AND group_id = $2",
        )
        .bind(id)
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        Ok(row.into())
    }

    #[instrument(skip(self, request), fields(schedule_id = %abbrev_uuid(&id)), err)]
    async fn update_schedule(
        &self,
        group_id: GroupId,
        id: ScheduleId,
        request: &ScheduleUpdateDBRequest,
    ) -> Result<ScheduleDBResponse> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            UPDATE schedules SET
                name = COALESCE($3, name),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                updated_at = NOW()
            WHERE id = $1 AND group_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(group_id)
        .bind(&request.name)
        .bind(request.start_date)
        .bind(request.end_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        Ok(row.into())
    }

    #[instrument(skip(self), fields(schedule_id = %abbrev_uuid(&id)), err)]
    async fn delete_schedule(&self, group_id: GroupId, id: ScheduleId) -> Result<()> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1 AND group_id = $2")
            .bind(id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(group_id = %abbrev_uuid(&group_id)), err)]
    async fn list_schedules(&self, group_id: GroupId) -> Result<Vec<ScheduleDBResponse>> {
        self.get_group(group_id).await?;
        let rows = sqlx::query_as::<_, ScheduleRow>(
            "SELECT * FROM schedules WHERE group_id = $1 ORDER BY start_date",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
