//! jpg2avif Infrastructure Library
//!
//! This crate provides the infrastructure components used by the jpg2avif service:
//! - Middleware (request ID)
//! - Telemetry initialization
//! - Conversion-complete notification delivery
//! - Process resource monitoring

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "notification")]
pub mod notification;

#[cfg(feature = "resources")]
pub mod resources;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::request_id_middleware;

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry};

#[cfg(feature = "notification")]
pub use notification::{HttpNotifier, NotificationDispatcher, NotificationError, Notifier};

#[cfg(feature = "resources")]
pub use resources::{ResourceMonitor, SysinfoResourceMonitor};
