//! Shared application state for the Axum API server.

use std::sync::Arc;

use pulse_common::config::AppConfig;
use pulse_engine::Dispatcher;
use pulse_store::NotificationStore;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<NotificationStore>,
    pub dispatcher: Dispatcher,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<NotificationStore>, dispatcher: Dispatcher, config: AppConfig) -> Self {
        Self {
            store,
            dispatcher,
            config,
        }
    }
}
