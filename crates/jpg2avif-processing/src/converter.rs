//! Conversion orchestration
//!
//! Each conversion runs in its own temporary directory, created under the configured
//! workspace root (or the system temp dir) and removed before [`Converter::convert`]
//! returns, whatever the outcome.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tempfile::TempDir;

use crate::encoder::AvifEncoder;
use crate::error::ConversionError;
use crate::naming::output_file_name;

const INPUT_FILE_NAME: &str = "input.jpg";
const WORKSPACE_PREFIX: &str = "jpg2avif-";

/// JPEG bytes plus the name they were uploaded under.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub data: Bytes,
    pub filename: String,
}

impl ConversionRequest {
    pub fn new(data: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            filename: filename.into(),
        }
    }
}

/// Encoded AVIF bytes and the derived output file name.
#[derive(Debug, Clone)]
pub struct ConvertedImage {
    pub data: Vec<u8>,
    pub filename: String,
}

pub type ConversionResult = Result<ConvertedImage, ConversionError>;

#[derive(Clone)]
pub struct Converter {
    encoder: Arc<dyn AvifEncoder>,
    workspace_root: Option<PathBuf>,
}

impl Converter {
    pub fn new(encoder: Arc<dyn AvifEncoder>) -> Self {
        Self {
            encoder,
            workspace_root: None,
        }
    }

    /// Create workspaces under `root` instead of the system temp dir.
    pub fn with_workspace_root(mut self, root: Option<PathBuf>) -> Self {
        self.workspace_root = root;
        self
    }

    pub async fn convert(&self, request: &ConversionRequest) -> ConversionResult {
        let workspace = self
            .create_workspace()
            .map_err(ConversionError::workspace("creating workspace"))?;
        let workspace_path = workspace.path().to_path_buf();

        tracing::debug!(
            workspace = %workspace_path.display(),
            filename = %request.filename,
            input_bytes = request.data.len(),
            "Starting conversion"
        );

        let result = self.run(&workspace_path, request).await;

        if let Err(e) = workspace.close() {
            tracing::warn!(
                workspace = %workspace_path.display(),
                error = %e,
                "Failed to remove conversion workspace"
            );
        }

        result
    }

    fn create_workspace(&self) -> io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        match &self.workspace_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }

    async fn run(&self, workspace: &Path, request: &ConversionRequest) -> ConversionResult {
        let filename = output_file_name(&request.filename);
        let input_path = workspace.join(INPUT_FILE_NAME);
        let output_path = workspace.join(&filename);

        tokio::fs::write(&input_path, &request.data)
            .await
            .map_err(ConversionError::workspace("writing input"))?;

        self.encoder.encode(&input_path, &output_path).await?;

        let data = match tokio::fs::read(&output_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConversionError::MissingOutput)
            }
            Err(e) => return Err(ConversionError::workspace("reading output")(e)),
        };

        if data.is_empty() {
            return Err(ConversionError::EmptyOutput);
        }

        tracing::debug!(
            filename = %filename,
            output_bytes = data.len(),
            "Conversion finished"
        );

        Ok(ConvertedImage { data, filename })
    }
}
