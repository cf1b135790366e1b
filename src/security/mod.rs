//! Authentication and role-based authorization.

mod credentials;
mod middleware;
mod password;
mod policy;

pub use credentials::{basic_credentials, Credentials};
pub use middleware::enforce_access;
pub use password::{hash_password, verify_password};
pub use policy::{Access, AccessPolicy, AccessRule, PathPattern};
