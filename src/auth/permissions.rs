//! Group-scoped access guards.
//!
//! Handlers for group-scoped resources call one of these before
//! touching the store. Application admins pass every guard. A caller
//! who is not a member learns only that they are not allowed in, not
//! whether the resource exists; a missing group is a plain 404 for
//! everyone.

use crate::{
    api::models::{groups::GroupRole, users::CurrentUser},
    db::{Store, StoreError},
    errors::{Error, Result},
    types::GroupId,
};

/// Requires the caller to be a member of the group (any role).
pub async fn require_membership(
    store: &dyn Store,
    user: &CurrentUser,
    group_id: GroupId,
) -> Result<()> {
    if user.is_application_admin() {
        // Still 404 on a missing group.
        store.get_group(group_id).await?;
        return Ok(());
    }
    match store.role_of(group_id, user.id).await {
        Ok(_) => Ok(()),
        Err(StoreError::NotFound) => {
            // Distinguish a missing group from a non-member caller.
            match store.get_group(group_id).await {
                Ok(_) => Err(Error::Forbidden {
                    action: "access resources".to_string(),
                    group_id,
                }),
                Err(e) => Err(e.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Requires the caller to be a GroupAdmin of the group.
pub async fn require_group_admin(
    store: &dyn Store,
    user: &CurrentUser,
    group_id: GroupId,
) -> Result<()> {
    if user.is_application_admin() {
        store.get_group(group_id).await?;
        return Ok(());
    }
    match store.role_of(group_id, user.id).await {
        Ok(GroupRole::GroupAdmin) => Ok(()),
        Ok(_) => Err(Error::Forbidden {
            action: "manage the group".to_string(),
            group_id,
        }),
        Err(StoreError::NotFound) => match store.get_group(group_id).await {
            Ok(_) => Err(Error::Forbidden {
                action: "manage the group".to_string(),
                group_id,
            }),
            Err(e) => Err(e.into()),
        },
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::GlobalRole;
    use crate::db::memory::MemoryStore;
    use crate::db::models::{groups::GroupCreateDBRequest, users::UserCreateDBRequest};
    use axum::http::StatusCode;
    use uuid::Uuid;

    async fn seed(
        store: &MemoryStore,
        nickname: &str,
        role: GlobalRole,
    ) -> crate::db::models::users::UserDBResponse {
        store
            .create_user(&UserCreateDBRequest {
                name: nickname.to_string(),
                email: format!("{nickname}@example.com"),
                nickname: nickname.to_string(),
                global_role: role,
                secret_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }

    fn as_current(user: &crate::db::models::users::UserDBResponse) -> CurrentUser {
        CurrentUser {
            id: user.id,
            nickname: user.nickname.clone(),
            global_role: user.global_role,
        }
    }

    #[tokio::test]
    async fn member_passes_membership_guard_but_not_admin_guard() {
        let store = MemoryStore::new();
        let admin = seed(&store, "dago", GlobalRole::User).await;
        let member = seed(&store, "remy", GlobalRole::User).await;
        let group = store
            .create_group(&GroupCreateDBRequest {
                name: "flat".to_string(),
                created_by: admin.id,
            })
            .await
            .unwrap();
        store
            .add_member(group.id, member.id, GroupRole::User)
            .await
            .unwrap();

        let member = as_current(&member);
        require_membership(&store, &member, group.id).await.unwrap();
        let err = require_group_admin(&store, &member, group.id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn non_member_is_forbidden() {
        let store = MemoryStore::new();
        let admin = seed(&store, "dago", GlobalRole::User).await;
        let outsider = seed(&store, "lena", GlobalRole::User).await;
        let group = store
            .create_group(&GroupCreateDBRequest {
                name: "flat".to_string(),
                created_by: admin.id,
            })
            .await
            .unwrap();

        let outsider = as_current(&outsider);
        let err = require_membership(&store, &outsider, group.id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn application_admin_passes_without_membership() {
        let store = MemoryStore::new();
        let owner = seed(&store, "dago", GlobalRole::User).await;
        let app_admin = seed(&store, "root", GlobalRole::ApplicationAdmin).await;
        let group = store
            .create_group(&GroupCreateDBRequest {
                name: "flat".to_string(),
                created_by: owner.id,
            })
            .await
            .unwrap();

        let app_admin = as_current(&app_admin);
        require_membership(&store, &app_admin, group.id)
            .await
            .unwrap();
        require_group_admin(&store, &app_admin, group.id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_group_is_not_found_for_everyone() {
        let store = MemoryStore::new();
        let user = seed(&store, "dago", GlobalRole::User).await;
        let app_admin = seed(&store, "root", GlobalRole::ApplicationAdmin).await;

        let missing = Uuid::new_v4();
        let err = require_membership(&store, &as_current(&user), missing)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let err = require_group_admin(&store, &as_current(&app_admin), missing)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
