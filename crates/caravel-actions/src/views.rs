//! View cache invalidation seam.
//!
//! After a sale or an approved purchase request, cached renderings of the
//! affected product and listing views are stale. Which caching machinery
//! that means is a transport concern, so the actions only talk to this
//! trait; the default wired in by [`crate::Actions::new`] does nothing.

/// Downstream view cache that can be told a path is stale.
pub trait ViewCache: Send + Sync {
    /// Signal that any cached rendering under `path` must be refreshed.
    fn invalidate(&self, path: &str);
}

/// The default: no cache to invalidate.
#[derive(Debug, Default)]
pub struct NoopViewCache;

impl ViewCache for NoopViewCache {
    fn invalidate(&self, _path: &str) {}
}
