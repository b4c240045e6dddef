//! AVIF encoder process invocation

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use jpg2avif_core::EncoderConfig;
use tokio::process::Command;

use crate::error::ConversionError;

/// Encodes a JPEG file on disk into an AVIF file on disk.
#[async_trait]
pub trait AvifEncoder: Send + Sync {
    async fn encode(&self, input: &Path, output: &Path) -> Result<(), ConversionError>;
}

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
fn validate_path(path: &str) -> Result<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }

    if path.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", path));
    }

    Ok(())
}

/// Runs the `avifenc` command-line encoder:
/// `avifenc --min <q> --max <q> --speed <s> --jobs <n> <input> <output>`.
pub struct AvifencEncoder {
    binary_path: String,
    min_quantizer: u8,
    max_quantizer: u8,
    speed: u8,
    jobs: u16,
    timeout: Duration,
}

impl AvifencEncoder {
    pub fn new(config: &EncoderConfig) -> Result<Self> {
        config.validate()?;

        validate_path(&config.binary_path)
            .context("Invalid AVIFENC_PATH: contains dangerous characters")?;

        if !config.binary_path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        }) {
            return Err(anyhow!("Invalid AVIFENC_PATH: contains unsafe characters"));
        }

        Ok(Self {
            binary_path: config.binary_path.clone(),
            min_quantizer: config.min_quantizer,
            max_quantizer: config.max_quantizer,
            speed: config.speed,
            jobs: config.jobs,
            timeout: config.timeout(),
        })
    }

    /// Override the deadline after which the encoder is killed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }

    fn arguments(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--min".into(),
            self.min_quantizer.to_string().into(),
            "--max".into(),
            self.max_quantizer.to_string().into(),
            "--speed".into(),
            self.speed.to_string().into(),
            "--jobs".into(),
            self.jobs.to_string().into(),
        ];
        args.push(input.as_os_str().to_owned());
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl AvifEncoder for AvifencEncoder {
    async fn encode(&self, input: &Path, output: &Path) -> Result<(), ConversionError> {
        let child = Command::new(&self.binary_path)
            .args(self.arguments(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ConversionError::EncoderUnavailable {
                program: self.binary_path.clone(),
                source,
            })?;

        // Dropping the pending wait on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(ConversionError::workspace("waiting for encoder"))?,
            Err(_) => {
                tracing::warn!(
                    binary = %self.binary_path,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Encoder exceeded its deadline and was killed"
                );
                return Err(ConversionError::EncoderTimedOut {
                    timeout: self.timeout,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::warn!(
                status = ?output.status.code(),
                stderr = %stderr.trim(),
                "Encoder exited unsuccessfully"
            );
            return Err(ConversionError::EncoderFailed {
                status: output.status.code(),
                stderr,
            });
        }

        Ok(())
    }
}
