//! jpg2avif Processing Library
//!
//! JPEG to AVIF conversion through an external encoder process. The [`Converter`] owns the
//! per-request temporary workspace; the [`AvifEncoder`] trait is the seam to the encoder
//! binary, implemented by [`AvifencEncoder`].

pub mod converter;
pub mod encoder;
pub mod error;
pub mod naming;

pub use converter::{ConversionRequest, ConversionResult, ConvertedImage, Converter};
pub use encoder::{AvifEncoder, AvifencEncoder};
pub use error::ConversionError;
pub use naming::output_file_name;
