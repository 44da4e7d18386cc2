//! Lazily loaded sub-views.
//!
//! A [`Loadable`] holds a value that is produced asynchronously the first
//! time it is needed. Views await [`Loadable::load`] in their preload phase
//! and read it with [`Loadable::get`] while rendering, which cannot await.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::OnceCell;

use crate::view::ViewError;

type Loader<T> = dyn Fn() -> BoxFuture<'static, Result<T, ViewError>> + Send + Sync;

pub struct Loadable<T> {
    name: &'static str,
    cell: OnceCell<T>,
    loader: Arc<Loader<T>>,
}

impl<T: Send + Sync> Loadable<T> {
    pub fn new<F>(name: &'static str, loader: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<T, ViewError>> + Send + Sync + 'static,
    {
        Self {
            name,
            cell: OnceCell::new(),
            loader: Arc::new(loader),
        }
    }

    /// Loads the value once. Concurrent callers wait for the same load; a
    /// failed load is retried by the next caller.
    pub async fn load(&self) -> Result<&T, ViewError> {
        self.cell
            .get_or_try_init(|| async {
                tracing::debug!(loadable = self.name, "Loading sub-view");
                (self.loader)().await
            })
            .await
    }

    /// Returns the loaded value, or an error if `load` has not completed.
    pub fn get(&self) -> Result<&T, ViewError> {
        self.cell
            .get()
            .ok_or_else(|| ViewError::new(format!("{} was rendered before it loaded", self.name)))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}

impl<T> std::fmt::Debug for Loadable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loadable")
            .field("name", &self.name)
            .field("loaded", &self.cell.initialized())
            .finish()
    }
}
