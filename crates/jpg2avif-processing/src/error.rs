use std::io;
use std::time::Duration;

use jpg2avif_core::AppError;

/// Failure of a single conversion. Every variant is terminal; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The encoder ran and exited unsuccessfully.
    #[error("{}", encoder_message(.status, .stderr))]
    EncoderFailed {
        status: Option<i32>,
        stderr: String,
    },

    #[error("Encoder timed out after {}s", .timeout.as_secs_f64())]
    EncoderTimedOut { timeout: Duration },

    #[error("Failed to start encoder '{program}': {source}")]
    EncoderUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Encoder did not produce an output file")]
    MissingOutput,

    #[error("Encoder produced an empty output file")]
    EmptyOutput,

    #[error("Workspace error while {context}: {source}")]
    Workspace {
        context: &'static str,
        #[source]
        source: io::Error,
    },
}

fn encoder_message(status: &Option<i32>, stderr: &str) -> String {
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }

    match status {
        Some(code) => format!("Encoder exited with status {}", code),
        None => "Encoder was terminated by a signal".to_string(),
    }
}

impl ConversionError {
    pub fn workspace(context: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| ConversionError::Workspace { context, source }
    }

    /// Whether the failure originated in the encoder rather than in local file handling.
    pub fn is_encoder_failure(&self) -> bool {
        !matches!(self, ConversionError::Workspace { .. })
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        if err.is_encoder_failure() {
            AppError::EncoderFailure(err.to_string())
        } else {
            AppError::InternalWithSource {
                message: err.to_string(),
                source: anyhow::Error::new(err),
            }
        }
    }
}
