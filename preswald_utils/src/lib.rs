#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** preswald_utils **
//! Small helpers shared by the Preswald CLI: username/slug normalization,
//! format validators, `preswald.toml` readers and the logging bootstrap.

pub const PRESWALD_UTILS_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod config;
pub mod logging;
pub mod normalize;
pub mod slug;
pub mod validate;

// Re-exports for convenience
pub use config::{ConfigError, DEFAULT_CONFIG_FILE, PreswaldConfig, get_slug, read_port};
pub use logging::{LogConfig, apply_log_config, configure_logging};
pub use normalize::normalize_github_username;
pub use slug::{generate_slug, slug_with_suffix, validate_slug};
pub use validate::{ValidationResult, validate_api_key, validate_github_username};
