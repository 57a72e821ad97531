//! Configuration library for mediafiler.
//!
//! Command line flags (each also readable from a `MEDIAFILER_*` environment
//! variable) are layered over an optional TOML file, normalized and checked
//! here so the server binary only ever sees a validated [`Config`].

#![allow(missing_docs)]

pub mod cli;
pub mod loader;
pub mod models;
pub mod validation;

pub use cli::ServeArgs;
pub use loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError, load_env_file};
pub use models::{Config, ConfigMetadata, MediaConfig, ServerConfig, sources};
pub use validation::{ConfigWarning, ConfigWarnings};
