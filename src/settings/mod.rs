//! Settings come from a TOML file plus `CARTOLA__SECTION__KEY` environment
//! overrides. See `bin/settings_demo.rs` for manual verification.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
