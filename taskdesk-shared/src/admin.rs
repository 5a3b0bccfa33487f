/// User administration
///
/// Listing, deletion, role changes and deactivation. Each operation checks
/// the policy first, so an unprivileged caller learns nothing about which
/// user ids exist.

use tracing::info;

use crate::auth::authorization::{check, Action, Actor};
use crate::error::{ServiceError, ServiceResult};
use crate::models::role::{Role, UnknownRole};
use crate::models::user::{User, UserListItem, UserSummary};
use crate::store::Store;

/// Every user with role and formatted creation time, ordered by id
pub async fn list_users(store: &dyn Store, actor: &Actor) -> ServiceResult<Vec<UserListItem>> {
    check(actor, Action::ListUsers)?;

    let users = store.list_users().await?;
    Ok(users.into_iter().map(UserListItem::from).collect())
}

/// Deletes a user and, with them, all of their tasks
///
/// # Errors
///
/// `Forbidden` when the role pair is not allowed or the target is the
/// caller, `NotFound` when the target does not exist.
pub async fn delete_user(store: &dyn Store, actor: &Actor, target_id: i64) -> ServiceResult<()> {
    // Rejects plain users and self-deletion before revealing whether the target exists.
    check(
        actor,
        Action::DeleteUser {
            target_id,
            target_role: Role::User,
        },
    )?;

    let target = find_user(store, target_id).await?;

    check(
        actor,
        Action::DeleteUser {
            target_id,
            target_role: target.role,
        },
    )?;

    if !store.delete_user(target_id).await? {
        return Err(user_not_found());
    }

    info!(
        actor_id = actor.id,
        target_id,
        target_role = %target.role,
        "User deleted"
    );
    Ok(())
}

/// Assigns a new role by name
///
/// # Errors
///
/// `Forbidden` unless the caller is a super admin acting on someone else,
/// `Validation` for an unknown role name, `NotFound` for a missing target.
pub async fn change_role(
    store: &dyn Store,
    actor: &Actor,
    target_id: i64,
    role_name: &str,
) -> ServiceResult<UserSummary> {
    check(actor, Action::ChangeUserRole { target_id })?;

    let role: Role = role_name
        .parse()
        .map_err(|e: UnknownRole| ServiceError::Validation(e.to_string()))?;

    let mut target = find_user(store, target_id).await?;

    if !store.set_role(target_id, role).await? {
        return Err(user_not_found());
    }

    info!(
        actor_id = actor.id,
        target_id,
        from = %target.role,
        to = %role,
        "User role changed"
    );

    target.role = role;
    Ok(UserSummary::from(&target))
}

/// Activates or deactivates an account
///
/// Deactivated users cannot log in; tokens already issued stay valid until
/// they expire.
pub async fn set_active(
    store: &dyn Store,
    actor: &Actor,
    target_id: i64,
    is_active: bool,
) -> ServiceResult<UserListItem> {
    check(actor, Action::ChangeUserStatus { target_id })?;

    let mut target = find_user(store, target_id).await?;

    if !store.set_active(target_id, is_active).await? {
        return Err(user_not_found());
    }

    info!(actor_id = actor.id, target_id, is_active, "User active flag changed");

    target.is_active = is_active;
    Ok(UserListItem::from(target))
}

async fn find_user(store: &dyn Store, id: i64) -> ServiceResult<User> {
    store.user_by_id(id).await?.ok_or_else(user_not_found)
}

fn user_not_found() -> ServiceError {
    ServiceError::NotFound("User not found".to_string())
}
