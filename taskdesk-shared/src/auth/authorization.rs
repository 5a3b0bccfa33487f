/// Authorization policy
///
/// Every permission decision in TaskDesk goes through [`check`], a pure
/// function of the acting user and the requested [`Action`]. Nothing here
/// touches storage; callers load whatever the action needs (task owner,
/// target role) and pass it in.
///
/// # Policy Table
///
/// | Action | Allowed |
/// |---|---|
/// | view own tasks | everyone |
/// | view all tasks | super_admin |
/// | update / delete task | owner, or super_admin |
/// | list users | super_admin |
/// | delete user | admin on a `user` target; super_admin on a non-super_admin target; never self |
/// | change role / active flag | super_admin, never self |
/// | export database | super_admin |
/// | admin check | super_admin |
///
/// Roles are ordered `user < admin < super_admin`, but deletion rules are
/// written per role pair: an admin may only delete plain users, and a super
/// admin may not delete a peer.
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::authorization::{can, check, Action, Actor, AuthzError};
/// use taskdesk_shared::models::role::Role;
///
/// let admin = Actor { id: 2, role: Role::Admin };
///
/// assert!(can(&admin, Action::DeleteUser { target_id: 5, target_role: Role::User }));
/// assert!(matches!(
///     check(&admin, Action::DeleteUser { target_id: 5, target_role: Role::Admin }),
///     Err(AuthzError::InsufficientRole { .. })
/// ));
/// ```

use crate::models::role::Role;

/// The user performing a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

/// Operation being authorized, with the facts the decision depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewOwnTasks,
    ViewAllTasks,
    UpdateTask { owner_id: i64 },
    DeleteTask { owner_id: i64 },
    ListUsers,
    DeleteUser { target_id: i64, target_role: Role },
    ChangeUserRole { target_id: i64 },
    ChangeUserStatus { target_id: i64 },
    ExportDatabase,
    AdminCheck,
}

/// Reason a request was denied
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Action reserved for super admins
    #[error("Forbidden: Super Admin only")]
    SuperAdminOnly,

    /// Action reserved for admins and super admins
    #[error("Forbidden: Admin only")]
    AdminOnly,

    /// Task belongs to someone else
    #[error("Not authorized to access this task")]
    NotOwner,

    /// Users cannot delete their own account
    #[error("Cannot delete yourself")]
    SelfDelete,

    /// Users cannot change their own role or status
    #[error("Cannot change your own account")]
    SelfModify,

    /// Role pair not allowed for deletion
    #[error("Role {actor} cannot delete a {target} account")]
    InsufficientRole { actor: Role, target: Role },
}

/// Decides whether `actor` may perform `action`
pub fn check(actor: &Actor, action: Action) -> Result<(), AuthzError> {
    match action {
        Action::ViewOwnTasks => Ok(()),

        Action::ViewAllTasks | Action::ListUsers | Action::ExportDatabase | Action::AdminCheck => {
            require_super_admin(actor)
        }

        Action::UpdateTask { owner_id } | Action::DeleteTask { owner_id } => {
            if owner_id == actor.id || actor.role == Role::SuperAdmin {
                Ok(())
            } else {
                Err(AuthzError::NotOwner)
            }
        }

        Action::DeleteUser { target_id, target_role } => {
            if actor.role == Role::User {
                return Err(AuthzError::AdminOnly);
            }
            if target_id == actor.id {
                return Err(AuthzError::SelfDelete);
            }
            match (actor.role, target_role) {
                (Role::Admin, Role::User) => Ok(()),
                (Role::SuperAdmin, Role::User | Role::Admin) => Ok(()),
                (Role::Admin, Role::Admin | Role::SuperAdmin)
                | (Role::SuperAdmin, Role::SuperAdmin) => Err(AuthzError::InsufficientRole {
                    actor: actor.role,
                    target: target_role,
                }),
                (Role::User, _) => Err(AuthzError::AdminOnly),
            }
        }

        Action::ChangeUserRole { target_id } | Action::ChangeUserStatus { target_id } => {
            require_super_admin(actor)?;
            if target_id == actor.id {
                return Err(AuthzError::SelfModify);
            }
            Ok(())
        }
    }
}

/// Boolean form of [`check`]
pub fn can(actor: &Actor, action: Action) -> bool {
    check(actor, action).is_ok()
}

fn require_super_admin(actor: &Actor) -> Result<(), AuthzError> {
    if actor.role == Role::SuperAdmin {
        Ok(())
    } else {
        Err(AuthzError::SuperAdminOnly)
    }
}
