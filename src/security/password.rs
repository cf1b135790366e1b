//! bcrypt password hashing and verification.

use crate::error::{AppError, ConfigError};

/// Spring-style delegating encoders prefix the hash with its id.
const BCRYPT_PREFIX: &str = "{bcrypt}";

pub fn hash_password(raw: &str, cost: u32) -> Result<String, ConfigError> {
    Ok(bcrypt::hash(raw, cost)?)
}

/// Verify off the async workers; bcrypt is deliberately slow.
/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(raw: String, stored: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        let hash = stored.strip_prefix(BCRYPT_PREFIX).unwrap_or(stored.as_str());
        match bcrypt::verify(raw, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is not valid bcrypt");
                false
            }
        }
    })
    .await
    .map_err(|e| AppError::Internal(format!("password verification task: {}", e)))
}
