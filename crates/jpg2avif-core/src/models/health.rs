use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Process memory snapshot in MB, two decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MemoryUsage {
    /// Resident set size
    pub rss_mb: f64,
    /// Virtual memory size
    pub vms_mb: f64,
    /// RSS as a percentage of total system memory
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub memory: MemoryUsage,
}

impl HealthResponse {
    pub fn healthy(service: impl Into<String>, memory: MemoryUsage) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.into(),
            memory,
        }
    }
}
