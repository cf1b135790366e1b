//! Runtime configuration from environment variables.

use crate::error::ConfigError;
use crate::model::{Role, UserLogin};
use crate::security::hash_password;
use std::net::SocketAddr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// A credential entry declared in `DEV_USERS`, before hashing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DevUser {
    pub username: String,
    pub password: String,
    pub roles: Vec<Role>,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// `None` selects the in-memory stores.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub body_limit_bytes: usize,
    pub expose_trace: bool,
    pub dev_users: Vec<DevUser>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr: SocketAddr =
            parse_or("BIND_ADDR", get("BIND_ADDR"), DEFAULT_BIND_ADDR.parse().ok())?;
        let max_connections: u32 = parse_or(
            "DB_MAX_CONNECTIONS",
            get("DB_MAX_CONNECTIONS"),
            Some(DEFAULT_MAX_CONNECTIONS),
        )?;
        let body_limit_bytes: usize = parse_or(
            "BODY_LIMIT_BYTES",
            get("BODY_LIMIT_BYTES"),
            Some(DEFAULT_BODY_LIMIT_BYTES),
        )?;
        let expose_trace = match get("EXPOSE_TRACE") {
            None => true,
            Some(v) => parse_bool("EXPOSE_TRACE", &v)?,
        };
        let dev_users = match get("DEV_USERS") {
            None => Vec::new(),
            Some(v) => parse_dev_users(&v)?,
        };

        Ok(AppConfig {
            database_url: get("DATABASE_URL"),
            bind_addr,
            max_connections,
            body_limit_bytes,
            expose_trace,
            dev_users,
        })
    }

    /// Hash the `DEV_USERS` passwords into credential entries for the in-memory store.
    pub fn dev_user_logins(&self, cost: u32) -> Result<Vec<UserLogin>, ConfigError> {
        self.dev_users
            .iter()
            .zip(1..)
            .map(|(user, id)| -> Result<UserLogin, ConfigError> {
                Ok(UserLogin {
                    id,
                    name: user.username.clone(),
                    username: user.username.clone(),
                    password: hash_password(&user.password, cost)?,
                    roles: user.roles.clone(),
                })
            })
            .collect()
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => default.ok_or(ConfigError::Invalid {
            key,
            value: String::new(),
        }),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

/// `user:password:ROLE|ROLE,other:password:USER`. Passwords may contain `:`.
fn parse_dev_users(raw: &str) -> Result<Vec<DevUser>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let invalid = || ConfigError::DevUser(entry.to_string());
            let (credentials, roles) = entry.rsplit_once(':').ok_or_else(invalid)?;
            let (username, password) = credentials.split_once(':').ok_or_else(invalid)?;
            if username.is_empty() {
                return Err(invalid());
            }
            let roles = roles
                .split('|')
                .map(|r| r.parse::<Role>().map_err(ConfigError::DevUser))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DevUser {
                username: username.to_string(),
                password: password.to_string(),
                roles,
            })
        })
        .collect()
}
