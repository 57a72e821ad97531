//! # mediafiler core
//!
//! Directory index and deferred state-transition engine behind the mediafiler
//! web browser.
//!
//! - [`identity`]: deterministic short identifiers, minimal per scan
//! - [`scanner`]: suffix-filtered recursive walk of the configured roots
//! - [`intent`]: pending delete/archive intents encoded as marker suffixes
//! - [`sweeper`]: periodic reconciliation of expired intents
//! - [`index`]: the [`MediaIndex`] façade composing all of the above
//!
//! ```no_run
//! use std::sync::Arc;
//! use mediafiler_core::{IndexSettings, MediaIndex, SystemClock};
//!
//! # fn main() -> mediafiler_core::Result<()> {
//! let settings = IndexSettings::new(["/srv/media"], &[".mp4", ".mkv"]);
//! let index = MediaIndex::open(settings, Arc::new(SystemClock))?;
//! for entry in index.list()? {
//!     println!("{} {}", entry.id, entry.title());
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Injectable wall clock
pub mod clock;

/// Error types for the index and the sweeper
pub mod error;

/// Path digests and minimal unique prefixes
pub mod identity;

/// The index façade
pub mod index;

/// Delete/archive intents and their store
pub mod intent;

/// Directory walking and suffix filtering
pub mod scanner;

/// Reconciliation of expired intents
pub mod sweeper;

/// Shared value types
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{IndexError, ReconcileError, Result};
pub use index::MediaIndex;
pub use intent::{Intent, IntentKind};
pub use sweeper::{RETENTION_WINDOW, SweepReport, Sweeper, SweeperHandle};
pub use types::{FileEntry, IndexSettings};
