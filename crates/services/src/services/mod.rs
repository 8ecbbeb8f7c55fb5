//! Application services used by the HTTP layer.
//!
//! Nothing here knows about axum; handlers translate these errors into
//! responses.

pub mod auth;
pub mod config;
pub mod email;
pub mod rate_limit;
pub mod recaptcha;
pub mod uploads;
