//! Business services over the store ports.

mod anime;
mod user_login;
mod validation;
pub use anime::AnimeService;
pub use user_login::UserLoginService;
pub use validation::RequestValidator;
