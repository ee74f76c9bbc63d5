//! Group-scoped item endpoints. Any member may read and write.

use crate::{
    api::models::{
        items::{ItemCreate, ItemResponse, ItemUpdate},
        users::CurrentUser,
    },
    auth::permissions::require_membership,
    db::models::items::{ItemCreateDBRequest, ItemUpdateDBRequest},
    errors::{Error, Result},
    types::{GroupId, ItemId},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;

#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn create_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<GroupId>,
    Json(request): Json<ItemCreate>,
) -> Result<(StatusCode, Json<ItemResponse>)> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    if request.name.trim().is_empty() {
        return Err(Error::validation("Item name must not be empty"));
    }
    if request.price < Decimal::ZERO {
        return Err(Error::validation("Price must not be negative"));
    }
    if request.quantity < 1 {
        return Err(Error::validation("Quantity must be at least 1"));
    }
    let item = state
        .store
        .create_item(&ItemCreateDBRequest {
            group_id,
            name: request.name,
            description: request.description,
            consumable_type: request.consumable_type,
            price: request.price,
            weight: request.weight,
            quantity: request.quantity,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn list_items(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Vec<ItemResponse>>> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    let items = state.store.list_items(group_id).await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id, item_id = %item_id))]
pub async fn get_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((group_id, item_id)): Path<(GroupId, ItemId)>,
) -> Result<Json<ItemResponse>> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    let item = state.store.get_item(group_id, item_id).await?;
    Ok(Json(ItemResponse::from(item)))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id, item_id = %item_id))]
pub async fn update_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((group_id, item_id)): Path<(GroupId, ItemId)>,
    Json(request): Json<ItemUpdate>,
) -> Result<Json<ItemResponse>> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(Error::validation("Item name must not be empty"));
        }
    }
    if let Some(quantity) = request.quantity {
        if quantity < 1 {
            return Err(Error::validation("Quantity must be at least 1"));
        }
    }
    let item = state
        .store
        .update_item(
            group_id,
            item_id,
            &ItemUpdateDBRequest {
                name: request.name,
                description: request.description,
                consumable_type: request.consumable_type,
                price: request.price,
                weight: request.weight,
                quantity: request.quantity,
                is_completed: request.is_completed,
            },
        )
        .await?;
    Ok(Json(ItemResponse::from(item)))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id, item_id = %item_id))]
pub async fn delete_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((group_id, item_id)): Path<(GroupId, ItemId)>,
) -> Result<StatusCode> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    state.store.delete_item(group_id, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::models::items::ItemResponse;
    use crate::api::models::users::GlobalRole;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_item_lifecycle() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let token = token_for(&state, &dago);
        let group = create_group(&app, &token, "flat").await;

        let response = app
            .post(&format!("/groups/{}/items", group.id))
            .add_header("authorization", bearer(&token))
            .json(&json!({
                "name": "milk",
                "description": "whole",
                "consumable_type": "drink",
                "price": "1.99",
                "quantity": 2,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let item: ItemResponse = response.json();
        assert_eq!(item.name, "milk");
        assert!(!item.is_completed);

        // Toggle completion
        let response = app
            .patch(&format!("/groups/{}/items/{}", group.id, item.id))
            .add_header("authorization", bearer(&token))
            .json(&json!({ "is_completed": true }))
            .await;
        response.assert_status_ok();
        let item: ItemResponse = response.json();
        assert!(item.is_completed);

        let response = app
            .get(&format!("/groups/{}/items", group.id))
            .add_header("authorization", bearer(&token))
            .await;
        response.assert_status_ok();
        let items: Vec<ItemResponse> = response.json();
        assert_eq!(items.len(), 1);

        app.delete(&format!("/groups/{}/items/{}", group.id, item.id))
            .add_header("authorization", bearer(&token))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.get(&format!("/groups/{}/items/{}", group.id, item.id))
            .add_header("authorization", bearer(&token))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_negative_price_rejected() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let token = token_for(&state, &dago);
        let group = create_group(&app, &token, "flat").await;

        let response = app
            .post(&format!("/groups/{}/items", group.id))
            .add_header("authorization", bearer(&token))
            .json(&json!({
                "name": "milk",
                "description": "",
                "consumable_type": "drink",
                "price": "-1.00",
                "quantity": 1,
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(tokio::test)]
    async fn test_items_scoped_to_group() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let lena = seed_user(&state, "lena", GlobalRole::User).await;
        let dago_token = token_for(&state, &dago);
        let lena_token = token_for(&state, &lena);
        let flat = create_group(&app, &dago_token, "flat").await;
        let cabin = create_group(&app, &lena_token, "cabin").await;

        let response = app
            .post(&format!("/groups/{}/items", flat.id))
            .add_header("authorization", bearer(&dago_token))
            .json(&json!({
                "name": "milk",
                "description": "",
                "consumable_type": "drink",
                "price": "1.99",
                "quantity": 1,
            }))
            .await;
        let item: ItemResponse = response.json();

        // Outsider cannot touch another group's items at all
        app.get(&format!("/groups/{}/items", flat.id))
            .add_header("authorization", bearer(&lena_token))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // An item id does not resolve under a different group
        app.get(&format!("/groups/{}/items/{}", cabin.id, item.id))
            .add_header("authorization", bearer(&lena_token))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
