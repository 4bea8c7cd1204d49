//! Auth feature: token decoding, session persistence, the session state
//! machine and role-based route guarding. This module touches security
//! boundaries and must avoid logging secrets or token material.
//!
//! Flow Overview: login persists the token pair, then fetches the profile and
//! builds an [`Identity`]. App start runs `check_auth` against the stored
//! token. While signed in, a background task re-validates the token and signs
//! out once it expires.

pub mod client;
pub mod guards;
pub mod roles;
pub mod state;
pub mod store;
pub mod token;
pub mod types;

pub use guards::{authorize, require_role, Access};
pub use roles::{Role, RoleFields, RoleSet};
pub use state::{AuthError, AuthSession, AuthState, RegisterRequest};
pub use store::SessionStore;
pub use types::{Identity, UserProfile};
