use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::auth::CurrentUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::services::dashboard::DashboardRegistry;

/// Server-side session store mapping session tokens to their user.
pub type SessionStore = Arc<Mutex<HashMap<String, CurrentUser>>>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub sessions: SessionStore,
    pub dashboards: Arc<DashboardRegistry>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            dashboards: Arc::new(DashboardRegistry::new()),
        }
    }

    /// Look up the user a session token belongs to.
    pub fn session_user(&self, token: &str) -> Option<CurrentUser> {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .cloned()
    }
}
