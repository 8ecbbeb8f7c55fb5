pub mod auth;
pub mod client_ip;

pub use auth::{AdminContext, require_admin};
pub use client_ip::ClientIp;
