pub mod conversion;
pub mod health;
pub mod notification;

pub use conversion::{
    bytes_to_mb, compression_ratio, round_to, ConversionStats, ConvertFailure, ConvertResponse,
    ConvertSuccess, FullSizeImage, MemoryFigures,
};
pub use health::{HealthResponse, MemoryUsage};
pub use notification::NotificationPayload;
