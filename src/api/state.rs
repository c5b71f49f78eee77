use std::sync::Arc;

use crate::config::AnalyticsConfig;
use crate::storage::DecklistSource;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn DecklistSource>,
    pub analytics: Arc<AnalyticsConfig>,
}

impl AppState {
    pub fn new(source: impl DecklistSource + 'static, analytics: AnalyticsConfig) -> Self {
        Self {
            source: Arc::new(source),
            analytics: Arc::new(analytics),
        }
    }
}
