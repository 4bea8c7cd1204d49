//! Role-based route guard.
//!
//! UX-only: a redirect here keeps users away from screens they cannot use,
//! but real access control must live on the API.

use crate::features::auth::roles::{Role, RoleFields, RoleSet};
use crate::features::auth::store::SessionStore;
use crate::features::auth::types::Identity;

pub mod paths {
    pub const LOGIN: &str = "/login";
    pub const ADMIN: &str = "/admin";
    pub const TEACHER_DASHBOARD: &str = "/teacher/dashboard";
    pub const STUDENT_DASHBOARD: &str = "/student/dashboard";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(&'static str),
}

impl Access {
    #[must_use]
    pub fn is_granted(self) -> bool {
        self == Access::Granted
    }
}

/// Grants when an identity is present and carries `required`.
#[must_use]
pub fn require_role(identity: Option<&Identity>, required: Role) -> Access {
    match identity {
        Some(identity) if identity.has_role(required) => Access::Granted,
        _ => Access::Redirect(paths::LOGIN),
    }
}

/// Normalized roles for raw fields, using the stored fallback when the fields
/// carry nothing.
#[must_use]
pub fn user_roles(fields: &RoleFields, store: &SessionStore) -> RoleSet {
    RoleSet::resolve(fields, store.stored_roles().as_deref())
}

/// The role a path demands, or `None` for public paths.
#[must_use]
pub fn required_role(path: &str) -> Option<Role> {
    let path = path.split(['?', '#']).next().unwrap_or_default();

    [
        (paths::ADMIN, Role::Admin),
        (paths::TEACHER_DASHBOARD, Role::Teacher),
        (paths::STUDENT_DASHBOARD, Role::Student),
    ]
    .into_iter()
    .find(|(prefix, _)| under(path, prefix))
    .map(|(_, role)| role)
}

/// Applies the guard to any path.
#[must_use]
pub fn authorize(identity: Option<&Identity>, path: &str) -> Access {
    match required_role(path) {
        Some(role) => require_role(identity, role),
        None => Access::Granted,
    }
}

fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
