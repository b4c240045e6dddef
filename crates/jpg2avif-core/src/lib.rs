//! jpg2avif Core Library
//!
//! This crate provides the configuration, error types, and wire models shared by
//! every jpg2avif component.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, EncoderConfig, LogFormat, NotificationConfig, ServerConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
