//! Credential lookup and username/password authentication.

use crate::error::AppError;
use crate::model::{Principal, UserLogin};
use crate::security::verify_password;
use crate::store::UserLoginStore;
use std::sync::Arc;

/// Same message for unknown users and wrong passwords.
const BAD_CREDENTIALS: &str = "Invalid credentials";

#[derive(Clone)]
pub struct UserLoginService {
    store: Arc<dyn UserLoginStore>,
}

impl UserLoginService {
    pub fn new(store: Arc<dyn UserLoginStore>) -> Self {
        UserLoginService { store }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserLogin>, AppError> {
        self.store.find_by_username(username).await
    }

    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Principal, AppError> {
        let Some(user) = self.find_by_username(username).await? else {
            tracing::debug!(username, "unknown user");
            return Err(AppError::AuthenticationFailed(BAD_CREDENTIALS.into()));
        };
        if !verify_password(password.to_string(), user.password.clone()).await? {
            tracing::debug!(username, "password mismatch");
            return Err(AppError::AuthenticationFailed(BAD_CREDENTIALS.into()));
        }
        Ok(Principal::from(&user))
    }
}
