//! CLI Command Implementations
//!
//! - analyze: rank coverage gaps
//! - discover: list JaCoCo reports
//! - config: configuration management commands

pub mod analyze;
pub mod config;
pub mod discover;

pub use analyze::analyze_command;
pub use config::{init_config, print_default_config, validate_config};
pub use discover::discover_command;
