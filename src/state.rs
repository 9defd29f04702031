use crate::bitacora::ActivityLog;
use crate::db::DbPool;

/// Shared state managed by Rocket.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub activity: ActivityLog,
    pub page_size: usize,
}

impl AppState {
    pub fn new(db_pool: DbPool, client_label: &str, page_size: usize) -> Self {
        Self {
            activity: ActivityLog::new(db_pool.clone(), client_label),
            db_pool,
            page_size: page_size.max(1),
        }
    }
}
