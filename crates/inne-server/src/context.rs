//! Application context shared by every request handler.

use std::sync::Arc;

use inne_core::config::Config;
use inne_db::pool::DbPool;

/// Application context shared by all request handlers (via Axum state).
///
/// Cheap to clone: the pool is reference-counted internally and the config
/// sits behind an `Arc`.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable configuration snapshot taken at startup.
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inne_db::pool::init_memory_pool;

    #[test]
    fn clones_share_pool_and_config() {
        let ctx = AppContext::new(init_memory_pool().unwrap(), Config::default());
        let other = ctx.clone();
        assert!(Arc::ptr_eq(&ctx.config, &other.config));
        assert_eq!(other.config.server.port, 5000);
        assert!(other.db.get().is_ok());
    }
}
