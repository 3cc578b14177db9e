use crate::config::DashboardConfig;
use crate::models::History;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    /// Last history that was read and parsed successfully.
    pub last_good: Arc<Mutex<Option<History>>>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config: Arc::new(config),
            last_good: Arc::new(Mutex::new(None)),
        }
    }
}
