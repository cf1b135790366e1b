//! Request validation, run before any mutating operation.

use crate::error::AppError;
use crate::model::Anime;

pub struct RequestValidator;

impl RequestValidator {
    /// A record is valid when its name is present and non-empty.
    pub fn validate(anime: &Anime) -> Result<(), AppError> {
        if anime.name.is_empty() {
            return Err(AppError::InvalidArgument("name is required".into()));
        }
        Ok(())
    }

    /// Check applied to records the store emits during a batch save.
    pub fn validate_saved(anime: &Anime) -> Result<(), AppError> {
        Self::validate(anime).map_err(|_| AppError::InvalidArgument("Invalid name".into()))
    }
}
