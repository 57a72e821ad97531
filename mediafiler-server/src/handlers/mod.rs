pub mod api;
pub mod assets;
pub mod files;
pub mod intents;
pub mod listing;
pub mod ping;
