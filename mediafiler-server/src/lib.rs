//! # mediafiler server
//!
//! Browse media files under a set of directories, stream them, and mark them
//! for deletion or archival with an undo window.
//!
//! The binary wires [`mediafiler_config`] and [`mediafiler_core`] together;
//! this library exposes the router and startup pieces so tests can drive them
//! directly.

pub mod handlers;
pub mod infra;
pub mod render;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::errors::{AppError, AppResult};
pub use routes::create_app;
