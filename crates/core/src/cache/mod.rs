mod error;
mod handle;
mod keys;
mod traits;

pub use error::{CacheError, Result};
pub use handle::CacheHandle;
pub use keys::{namespace_tracking_key, namespaced_key};
pub use traits::Cache;
