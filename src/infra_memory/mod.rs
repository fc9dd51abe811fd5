//! In-process adapters backing the `memory` store backend and the test suites.

mod memory_outbox;
mod memory_user_store;

pub use memory_outbox::*;
pub use memory_user_store::*;
