mod identifier;
mod identity;
mod role;
mod user;

pub use identifier::*;
pub use identity::*;
pub use role::*;
pub use user::*;
