//! Grocery list endpoints. Any member may read and write.

use crate::{
    api::models::{
        lists::{GroceryListCreate, GroceryListResponse, GroceryListUpdate},
        users::CurrentUser,
    },
    auth::permissions::require_membership,
    db::models::lists::{GroceryListCreateDBRequest, GroceryListUpdateDBRequest},
    errors::{Error, Result},
    types::{GroupId, ListId},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn create_list(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<GroupId>,
    Json(request): Json<GroceryListCreate>,
) -> Result<(StatusCode, Json<GroceryListResponse>)> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    if request.name.trim().is_empty() {
        return Err(Error::validation("List name must not be empty"));
    }
    // A list starts with at least one item; it may be emptied later.
    if request.items.is_empty() {
        return Err(Error::validation(
            "A grocery list must reference at least one item",
        ));
    }
    let list = state
        .store
        .create_list(&GroceryListCreateDBRequest {
            group_id,
            name: request.name,
            items: request.items,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(GroceryListResponse::from(list))))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn list_lists(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Vec<GroceryListResponse>>> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    let lists = state.store.list_lists(group_id).await?;
    Ok(Json(
        lists.into_iter().map(GroceryListResponse::from).collect(),
    ))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id, list_id = %list_id))]
pub async fn get_list(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((group_id, list_id)): Path<(GroupId, ListId)>,
) -> Result<Json<GroceryListResponse>> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    let list = state.store.get_list(group_id, list_id).await?;
    Ok(Json(GroceryListResponse::from(list)))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id, list_id = %list_id))]
pub async fn update_list(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((group_id, list_id)): Path<(GroupId, ListId)>,
    Json(request): Json<GroceryListUpdate>,
) -> Result<Json<GroceryListResponse>> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(Error::validation("List name must not be empty"));
        }
    }
    let list = state
        .store
        .update_list(
            group_id,
            list_id,
            &GroceryListUpdateDBRequest {
                name: request.name,
                items: request.items,
            },
        )
        .await?;
    Ok(Json(GroceryListResponse::from(list)))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id, list_id = %list_id))]
pub async fn delete_list(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((group_id, list_id)): Path<(GroupId, ListId)>,
) -> Result<StatusCode> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    state.store.delete_list(group_id, list_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::models::items::ItemResponse;
    use crate::api::models::lists::GroceryListResponse;
    use crate::api::models::users::GlobalRole;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use uuid::Uuid;

    async fn seed_item(app: &axum_test::TestServer, token: &str, group_id: Uuid) -> ItemResponse {
        let response = app
            .post(&format!("/groups/{group_id}/items"))
            .add_header("authorization", bearer(token))
            .json(&json!({
                "name": "milk",
                "description": "",
                "consumable_type": "drink",
                "price": "1.99",
                "quantity": 1,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    #[test_log::test(tokio::test)]
    async fn test_list_requires_an_item_at_creation() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let token = token_for(&state, &dago);
        let group = create_group(&app, &token, "flat").await;

        let response = app
            .post(&format!("/groups/{}/lists", group.id))
            .add_header("authorization", bearer(&token))
            .json(&json!({ "name": "weekly", "items": [] }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(tokio::test)]
    async fn test_list_lifecycle() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let token = token_for(&state, &dago);
        let group = create_group(&app, &token, "flat").await;
        let item = seed_item(&app, &token, group.id).await;

        let response = app
            .post(&format!("/groups/{}/lists", group.id))
            .add_header("authorization", bearer(&token))
            .json(&json!({ "name": "weekly", "items": [item.id] }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let list: GroceryListResponse = response.json();
        assert_eq!(list.items, vec![item.id]);

        // Updates may empty the list; the floor only holds at creation
        let response = app
            .patch(&format!("/groups/{}/lists/{}", group.id, list.id))
            .add_header("authorization", bearer(&token))
            .json(&json!({ "items": [] }))
            .await;
        response.assert_status_ok();
        let list: GroceryListResponse = response.json();
        assert!(list.items.is_empty());

        app.delete(&format!("/groups/{}/lists/{}", group.id, list.id))
            .add_header("authorization", bearer(&token))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[test_log::test(tokio::test)]
    async fn test_list_rejects_foreign_items() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let token = token_for(&state, &dago);
        let group = create_group(&app, &token, "flat").await;

        let response = app
            .post(&format!("/groups/{}/lists", group.id))
            .add_header("authorization", bearer(&token))
            .json(&json!({ "name": "weekly", "items": [Uuid::new_v4()] }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
