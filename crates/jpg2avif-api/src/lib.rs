//! jpg2avif API Library
//!
//! This crate provides the HTTP handlers, error mapping, and application setup for the
//! JPEG to AVIF conversion service.

// Module declarations
mod api_doc;
mod handlers;
pub mod setup;
mod utils;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
