//! HTTP handlers for anime CRUD and form login.

pub mod anime;
pub mod auth;
