use crate::config::AppConfig;
use crate::dictionary::Dictionary;
use crate::registry::RoomRegistry;
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub dictionary: Arc<Dictionary>,
    pub rooms: RoomRegistry,
}

impl AppState {
    pub fn new(config: AppConfig, dictionary: Dictionary) -> Self {
        let dictionary = Arc::new(dictionary);
        Self {
            rooms: RoomRegistry::new(dictionary.clone(), config.challenge_timeout),
            dictionary,
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default(), Dictionary::builtin())
    }
}
