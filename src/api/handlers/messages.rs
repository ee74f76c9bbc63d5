//! Group message board. Messages are append-only: no edit, no delete.

use crate::{
    api::models::{
        messages::{MessageCreate, MessageResponse},
        users::CurrentUser,
    },
    auth::permissions::require_membership,
    db::models::messages::MessageCreateDBRequest,
    errors::{Error, Result},
    types::GroupId,
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn create_message(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<GroupId>,
    Json(request): Json<MessageCreate>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    if request.text.trim().is_empty() {
        return Err(Error::validation("Message text must not be empty"));
    }
    let message = state
        .store
        .create_message(&MessageCreateDBRequest {
            group_id,
            user_id: user.id,
            text: request.text,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

/// Messages in posting order.
#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn list_messages(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Vec<MessageResponse>>> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    let messages = state.store.list_messages(group_id).await?;
    Ok(Json(
        messages.into_iter().map(MessageResponse::from).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use crate::api::models::messages::MessageResponse;
    use crate::api::models::users::GlobalRole;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_post_and_read_messages_in_order() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let token = token_for(&state, &dago);
        let group = create_group(&app, &token, "flat").await;

        for text in ["we need milk", "and eggs"] {
            app.post(&format!("/groups/{}/messages", group.id))
                .add_header("authorization", bearer(&token))
                .json(&json!({ "text": text }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = app
            .get(&format!("/groups/{}/messages", group.id))
            .add_header("authorization", bearer(&token))
            .await;
        response.assert_status_ok();
        let messages: Vec<MessageResponse> = response.json();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "we need milk");
        assert_eq!(messages[1].text, "and eggs");
        assert_eq!(messages[0].user_id, dago.id);
    }

    #[test_log::test(tokio::test)]
    async fn test_empty_message_rejected() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let token = token_for(&state, &dago);
        let group = create_group(&app, &token, "flat").await;

        app.post(&format!("/groups/{}/messages", group.id))
            .add_header("authorization", bearer(&token))
            .json(&json!({ "text": "   " }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(tokio::test)]
    async fn test_non_member_cannot_read_board() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let lena = seed_user(&state, "lena", GlobalRole::User).await;
        let group = create_group(&app, &token_for(&state, &dago), "flat").await;

        app.get(&format!("/groups/{}/messages", group.id))
            .add_header("authorization", bearer(&token_for(&state, &lena)))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
