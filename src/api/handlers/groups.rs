//! Group and membership management.
//!
//! Reading or changing group metadata and membership requires the
//! GroupAdmin role (or application admin); members may always list the
//! roster and leave on their own.

use crate::{
    api::models::{
        groups::{GroupCreate, GroupResponse, GroupUpdate, MemberAdd, MemberResponse, MemberRoleUpdate},
        users::CurrentUser,
    },
    auth::permissions::{require_group_admin, require_membership},
    db::models::groups::{GroupCreateDBRequest, GroupUpdateDBRequest, MemberRemoval},
    errors::{Error, Result},
    types::{GroupId, UserId},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<GroupCreate>,
) -> Result<(StatusCode, Json<GroupResponse>)> {
    if request.name.trim().is_empty() {
        return Err(Error::validation("Group name must not be empty"));
    }
    let group = state
        .store
        .create_group(&GroupCreateDBRequest {
            name: request.name,
            created_by: user.id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

/// Groups the caller belongs to.
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_groups(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<GroupResponse>>> {
    let groups = state.store.groups_for_user(user.id).await?;
    Ok(Json(groups.into_iter().map(GroupResponse::from).collect()))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn get_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<GroupId>,
) -> Result<Json<GroupResponse>> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    let group = state.store.get_group(group_id).await?;
    Ok(Json(GroupResponse::from(group)))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn update_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<GroupId>,
    Json(request): Json<GroupUpdate>,
) -> Result<Json<GroupResponse>> {
    require_group_admin(state.store.as_ref(), &user, group_id).await?;
    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(Error::validation("Group name must not be empty"));
        }
    }
    let group = state
        .store
        .update_group(group_id, &GroupUpdateDBRequest { name: request.name })
        .await?;
    Ok(Json(GroupResponse::from(group)))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn delete_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<GroupId>,
) -> Result<StatusCode> {
    require_group_admin(state.store.as_ref(), &user, group_id).await?;
    state.store.delete_group(group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn list_members(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<GroupId>,
) -> Result<Json<Vec<MemberResponse>>> {
    require_membership(state.store.as_ref(), &user, group_id).await?;
    let members = state.store.members(group_id).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id))]
pub async fn add_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(group_id): Path<GroupId>,
    Json(request): Json<MemberAdd>,
) -> Result<(StatusCode, Json<MemberResponse>)> {
    require_group_admin(state.store.as_ref(), &user, group_id).await?;
    let membership = state
        .store
        .add_member(group_id, request.user_id, request.role)
        .await?;
    Ok((StatusCode::CREATED, Json(MemberResponse::from(membership))))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id, member_id = %member_id))]
pub async fn set_member_role(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((group_id, member_id)): Path<(GroupId, UserId)>,
    Json(request): Json<MemberRoleUpdate>,
) -> Result<Json<MemberResponse>> {
    require_group_admin(state.store.as_ref(), &user, group_id).await?;
    let membership = state
        .store
        .set_member_role(group_id, member_id, request.role)
        .await?;
    Ok(Json(MemberResponse::from(membership)))
}

#[tracing::instrument(skip_all, fields(group_id = %group_id, member_id = %member_id))]
pub async fn remove_member(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((group_id, member_id)): Path<(GroupId, UserId)>,
) -> Result<StatusCode> {
    // Anyone may remove themselves; removing someone else takes
    // GroupAdmin.
    if member_id != user.id {
        require_group_admin(state.store.as_ref(), &user, group_id).await?;
    } else {
        require_membership(state.store.as_ref(), &user, group_id).await?;
    }
    match state.store.remove_member(group_id, member_id).await? {
        MemberRemoval::Removed | MemberRemoval::GroupDeleted => Ok(StatusCode::NO_CONTENT),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::groups::{GroupResponse, MemberResponse};
    use crate::api::models::users::GlobalRole;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_creator_becomes_admin_and_lists_own_groups() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let token = token_for(&state, &dago);

        let response = app
            .post("/groups")
            .add_header("authorization", bearer(&token))
            .json(&json!({ "name": "flat" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let group: GroupResponse = response.json();

        let response = app
            .get(&format!("/groups/{}/members", group.id))
            .add_header("authorization", bearer(&token))
            .await;
        response.assert_status_ok();
        let members: Vec<MemberResponse> = response.json();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, dago.id);
        assert_eq!(members[0].role.as_str(), "GroupAdmin");

        let response = app
            .get("/groups")
            .add_header("authorization", bearer(&token))
            .await;
        response.assert_status_ok();
        let groups: Vec<GroupResponse> = response.json();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, group.id);
    }

    #[test_log::test(tokio::test)]
    async fn test_non_member_cannot_see_group() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let lena = seed_user(&state, "lena", GlobalRole::User).await;

        let response = app
            .post("/groups")
            .add_header("authorization", bearer(&token_for(&state, &dago)))
            .json(&json!({ "name": "flat" }))
            .await;
        let group: GroupResponse = response.json();

        let response = app
            .get(&format!("/groups/{}", group.id))
            .add_header("authorization", bearer(&token_for(&state, &lena)))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[test_log::test(tokio::test)]
    async fn test_member_cannot_manage_group_but_admin_can() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let remy = seed_user(&state, "remy", GlobalRole::User).await;
        let admin_token = token_for(&state, &dago);
        let member_token = token_for(&state, &remy);

        let response = app
            .post("/groups")
            .add_header("authorization", bearer(&admin_token))
            .json(&json!({ "name": "flat" }))
            .await;
        let group: GroupResponse = response.json();

        app.post(&format!("/groups/{}/members", group.id))
            .add_header("authorization", bearer(&admin_token))
            .json(&json!({ "user_id": remy.id, "role": "user" }))
            .await
            .assert_status(StatusCode::CREATED);

        // Plain member may not rename or delete
        app.patch(&format!("/groups/{}", group.id))
            .add_header("authorization", bearer(&member_token))
            .json(&json!({ "name": "renamed" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        app.delete(&format!("/groups/{}", group.id))
            .add_header("authorization", bearer(&member_token))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // Admin may
        app.patch(&format!("/groups/{}", group.id))
            .add_header("authorization", bearer(&admin_token))
            .json(&json!({ "name": "renamed" }))
            .await
            .assert_status_ok();
        app.delete(&format!("/groups/{}", group.id))
            .add_header("authorization", bearer(&admin_token))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[test_log::test(tokio::test)]
    async fn test_application_admin_overrides_group_roles() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let root = seed_user(&state, "root", GlobalRole::ApplicationAdmin).await;

        let response = app
            .post("/groups")
            .add_header("authorization", bearer(&token_for(&state, &dago)))
            .json(&json!({ "name": "flat" }))
            .await;
        let group: GroupResponse = response.json();

        // Not a member, still allowed everything
        app.get(&format!("/groups/{}", group.id))
            .add_header("authorization", bearer(&token_for(&state, &root)))
            .await
            .assert_status_ok();
        app.delete(&format!("/groups/{}", group.id))
            .add_header("authorization", bearer(&token_for(&state, &root)))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[test_log::test(tokio::test)]
    async fn test_sole_admin_cannot_leave_or_be_demoted() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let remy = seed_user(&state, "remy", GlobalRole::User).await;
        let admin_token = token_for(&state, &dago);

        let response = app
            .post("/groups")
            .add_header("authorization", bearer(&admin_token))
            .json(&json!({ "name": "flat" }))
            .await;
        let group: GroupResponse = response.json();

        app.post(&format!("/groups/{}/members", group.id))
            .add_header("authorization", bearer(&admin_token))
            .json(&json!({ "user_id": remy.id, "role": "user" }))
            .await
            .assert_status(StatusCode::CREATED);

        app.delete(&format!("/groups/{}/members/{}", group.id, dago.id))
            .add_header("authorization", bearer(&admin_token))
            .await
            .assert_status(StatusCode::CONFLICT);
        app.patch(&format!("/groups/{}/members/{}", group.id, dago.id))
            .add_header("authorization", bearer(&admin_token))
            .json(&json!({ "role": "user" }))
            .await
            .assert_status(StatusCode::CONFLICT);

        // After promoting remy the original admin may step down
        app.patch(&format!("/groups/{}/members/{}", group.id, remy.id))
            .add_header("authorization", bearer(&admin_token))
            .json(&json!({ "role": "GroupAdmin" }))
            .await
            .assert_status_ok();
        app.delete(&format!("/groups/{}/members/{}", group.id, dago.id))
            .add_header("authorization", bearer(&admin_token))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[test_log::test(tokio::test)]
    async fn test_member_may_leave_and_last_member_deletes_group() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let remy = seed_user(&state, "remy", GlobalRole::User).await;
        let admin_token = token_for(&state, &dago);
        let member_token = token_for(&state, &remy);

        let response = app
            .post("/groups")
            .add_header("authorization", bearer(&admin_token))
            .json(&json!({ "name": "flat" }))
            .await;
        let group: GroupResponse = response.json();

        app.post(&format!("/groups/{}/members", group.id))
            .add_header("authorization", bearer(&admin_token))
            .json(&json!({ "user_id": remy.id, "role": "user" }))
            .await
            .assert_status(StatusCode::CREATED);

        // Members may not remove each other, but may remove themselves
        app.delete(&format!("/groups/{}/members/{}", group.id, dago.id))
            .add_header("authorization", bearer(&member_token))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        app.delete(&format!("/groups/{}/members/{}", group.id, remy.id))
            .add_header("authorization", bearer(&member_token))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        // The last one out deletes the group
        app.delete(&format!("/groups/{}/members/{}", group.id, dago.id))
            .add_header("authorization", bearer(&admin_token))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.get(&format!("/groups/{}", group.id))
            .add_header("authorization", bearer(&admin_token))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_adding_member_twice_conflicts() {
        let (app, state) = create_test_app_with_state();
        let dago = seed_user(&state, "dago", GlobalRole::User).await;
        let remy = seed_user(&state, "remy", GlobalRole::User).await;
        let admin_token = token_for(&state, &dago);

        let response = app
            .post("/groups")
            .add_header("authorization", bearer(&admin_token))
            .json(&json!({ "name": "flat" }))
            .await;
        let group: GroupResponse = response.json();

        app.post(&format!("/groups/{}/members", group.id))
            .add_header("authorization", bearer(&admin_token))
            .json(&json!({ "user_id": remy.id, "role": "user" }))
            .await
            .assert_status(StatusCode::CREATED);
        app.post(&format!("/groups/{}/members", group.id))
            .add_header("authorization", bearer(&admin_token))
            .json(&json!({ "user_id": remy.id, "role": "user" }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }
}
