// notifier

mod account_notifier;

pub use account_notifier::*;

// repo

mod role_repo;
mod store_error;
mod user_repo;

pub use role_repo::*;
pub use store_error::*;
pub use user_repo::*;
