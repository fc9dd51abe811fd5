mod auth_service_impl;
mod credential_hasher_impl;
mod identity_resolver_impl;
mod log_notifier;
mod token_codec_impl;
mod token_digest;

pub use auth_service_impl::*;
pub use credential_hasher_impl::*;
pub use identity_resolver_impl::*;
pub use log_notifier::*;
pub use token_codec_impl::*;
pub use token_digest::*;
