mod auth_service;
mod identity_resolver;

pub use auth_service::*;
pub use identity_resolver::*;
