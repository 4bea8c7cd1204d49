//! Role claims and their normalization.
//!
//! The API has returned roles in several shapes over time: a `roles` array, a
//! singular `role` string, and (on the client) a JSON-encoded array kept in
//! storage under `auth_roles`. All of them are folded into one [`RoleSet`] at
//! the boundary, so guards and routes only ever test membership.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed role vocabulary, ordered by privilege.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    User,
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::User, Role::Student, Role::Teacher, Role::Admin];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// Matches a raw tag such as `ROLE_TEACHER`, `teacher` or `Teacher`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        let bare = tag
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("role_"))
            .map_or(tag, |_| &tag[5..]);

        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(bare))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_tag(s).ok_or_else(|| format!("unknown role: {s}"))
    }
}

/// A role field as it appears on the wire: one tag or a list of tags.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RoleClaim {
    One(String),
    Many(Vec<String>),
}

impl RoleClaim {
    fn tags(&self) -> Vec<String> {
        let raw: Vec<&String> = match self {
            RoleClaim::One(tag) => vec![tag],
            RoleClaim::Many(tags) => tags.iter().collect(),
        };

        raw.into_iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// The `roles`/`role` pair shared by token claims and profiles.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<RoleClaim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleClaim>,
}

impl RoleFields {
    #[must_use]
    pub fn from_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: Some(RoleClaim::Many(roles.into_iter().map(Into::into).collect())),
            role: None,
        }
    }

    #[must_use]
    pub fn from_role(role: impl Into<String>) -> Self {
        Self {
            roles: None,
            role: Some(RoleClaim::One(role.into())),
        }
    }

    /// Tags from the `roles` field.
    #[must_use]
    pub fn array_roles(&self) -> Vec<String> {
        self.roles.as_ref().map(RoleClaim::tags).unwrap_or_default()
    }

    /// Tags from the singular `role` field.
    #[must_use]
    pub fn single_role(&self) -> Vec<String> {
        self.role.as_ref().map(RoleClaim::tags).unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.array_roles().is_empty() && self.single_role().is_empty()
    }

    /// Whole-record fallback: `self` when it carries any tag, otherwise `other`.
    /// Fields are never mixed across the two sources.
    #[must_use]
    pub fn or(self, other: RoleFields) -> RoleFields {
        if self.is_empty() {
            other
        } else {
            self
        }
    }
}

/// Normalized, de-duplicated role tags in their original spelling.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RoleSet(Vec<String>);

impl RoleSet {
    #[must_use]
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for tag in tags {
            let tag: String = tag.into();
            let tag = tag.trim();
            if !tag.is_empty() && !unique.iter().any(|seen| seen == tag) {
                unique.push(tag.to_string());
            }
        }
        Self(unique)
    }

    /// Three-tier resolution: `roles` array, then `role`, then the stored JSON
    /// fallback. The first non-empty tier wins.
    #[must_use]
    pub fn resolve(fields: &RoleFields, stored: Option<&str>) -> Self {
        let array = fields.array_roles();
        if !array.is_empty() {
            return Self::new(array);
        }

        let single = fields.single_role();
        if !single.is_empty() {
            return Self::new(single);
        }

        stored.map(Self::parse_stored).unwrap_or_default()
    }

    /// Parses the JSON-encoded fallback. Garbage yields an empty set.
    #[must_use]
    pub fn parse_stored(json: &str) -> Self {
        serde_json::from_str::<RoleClaim>(json)
            .map(|claim| Self::new(claim.tags()))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, role: Role) -> bool {
        self.roles().any(|candidate| candidate == role)
    }

    /// Known roles in this set; unknown tags are skipped.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().filter_map(|tag| Role::from_tag(tag))
    }

    /// The most privileged known role.
    #[must_use]
    pub fn primary(&self) -> Option<Role> {
        self.roles().max()
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON form used for the `auth_roles` storage fallback.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }
}
