use std::{fmt, sync::Arc};

use mediafiler_core::MediaIndex;

use super::errors::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<MediaIndex>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(index: Arc<MediaIndex>) -> Self {
        Self { index }
    }

    pub fn archive_enabled(&self) -> bool {
        self.index.archive_enabled()
    }

    /// Run `f` against the index on the blocking pool. Index calls take a
    /// mutex and may walk whole directory trees.
    pub async fn run_blocking<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&MediaIndex) -> T + Send + 'static,
        T: Send + 'static,
    {
        let index = Arc::clone(&self.index);
        tokio::task::spawn_blocking(move || f(&index))
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "index task failed");
                AppError::internal("index task failed")
            })
    }
}
