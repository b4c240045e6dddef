//! Application state shared by all handlers.

use std::sync::Arc;

use jpg2avif_core::Config;
use jpg2avif_infra::{NotificationDispatcher, ResourceMonitor};
use jpg2avif_processing::Converter;

/// Nothing in here is mutated after startup; requests share no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub converter: Converter,
    pub notifier: NotificationDispatcher,
    pub resources: Arc<dyn ResourceMonitor>,
}
