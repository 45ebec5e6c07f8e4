//! Layered configuration of the `generate` command.
//!
//! Values are resolved from, in increasing precedence: built-in defaults, the optional TOML
//! file given with `--config`, `-S key=value` overrides and explicit command-line flags.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_config;
pub use models::{AppConfig, ToolkitCommand};
