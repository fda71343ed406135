// Application state module
// Shared, read-only state handed to every connection

use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::delivery::FileDeliveryService;

/// Application state
pub struct AppState {
    pub config: Config,
    pub delivery: FileDeliveryService,
    /// `Cache-Control` value, rendered once from the configured policy
    pub cache_control: String,
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let delivery = FileDeliveryService::from_config(&config.delivery);
        let cache_control = config.delivery.cache_control.to_header_value();

        Self {
            config,
            delivery,
            cache_control,
            active_connections: AtomicUsize::new(0),
        }
    }
}
