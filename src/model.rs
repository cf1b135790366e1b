//! Domain records: anime entries, stored credentials, roles and principals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// An anime record. `id` is assigned by the store on first save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Anime {
    #[serde(default)]
    pub id: Option<i32>,
    /// Missing names deserialize to empty so validation can report them.
    #[serde(default)]
    pub name: String,
}

impl Anime {
    pub fn new(name: impl Into<String>) -> Self {
        Anime {
            id: None,
            name: name.into(),
        }
    }

    pub fn with_id(self, id: i32) -> Self {
        Anime { id: Some(id), ..self }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// Parse a comma-separated authorities column. Unknown labels are skipped.
    pub fn parse_list(authorities: &str) -> Vec<Role> {
        let mut roles = Vec::new();
        for label in authorities.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match label.parse::<Role>() {
                Ok(role) if !roles.contains(&role) => roles.push(role),
                Ok(_) => {}
                Err(_) => tracing::warn!(authority = %label, "ignoring unknown authority"),
            }
        }
        roles
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(upper.as_str()) {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored credential entry. Read-only from the service's point of view.
#[derive(Clone, Debug)]
pub struct UserLogin {
    pub id: i32,
    pub name: String,
    pub username: String,
    /// bcrypt hash. A Spring-style `{bcrypt}` prefix is tolerated.
    pub password: String,
    pub roles: Vec<Role>,
}

/// An authenticated caller, placed in request extensions by the security layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.roles.iter().any(|r| roles.contains(r))
    }
}

impl From<&UserLogin> for Principal {
    fn from(user: &UserLogin) -> Self {
        Principal {
            username: user.username.clone(),
            roles: user.roles.clone(),
        }
    }
}
