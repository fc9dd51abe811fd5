//! Settings come from a TOML file picked by `--settings` and may be overridden
//! from the environment with `USERGATE__SECTION__KEY` variables.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
