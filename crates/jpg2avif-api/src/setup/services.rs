//! Service construction

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use jpg2avif_core::Config;
use jpg2avif_infra::{NotificationDispatcher, SysinfoResourceMonitor};
use jpg2avif_processing::{AvifencEncoder, Converter};
use tokio::process::Command;

use crate::state::AppState;

const ENCODER_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the converter, notification dispatcher and resource monitor from configuration.
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let encoder =
        AvifencEncoder::new(&config.encoder).context("Failed to configure AVIF encoder")?;
    probe_encoder(encoder.binary_path()).await;

    if let Some(root) = &config.encoder.workspace_dir {
        tokio::fs::create_dir_all(root)
            .await
            .with_context(|| format!("Failed to create WORKSPACE_DIR {}", root.display()))?;
    }

    let converter =
        Converter::new(Arc::new(encoder)).with_workspace_root(config.encoder.workspace_dir.clone());
    let notifier = NotificationDispatcher::from_config(&config.notification)?;

    tracing::info!(
        min_quantizer = config.encoder.min_quantizer,
        max_quantizer = config.encoder.max_quantizer,
        speed = config.encoder.speed,
        jobs = config.encoder.jobs,
        timeout_secs = config.encoder.timeout_secs,
        "Converter initialized"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        converter,
        notifier,
        resources: Arc::new(SysinfoResourceMonitor::new()),
    }))
}

/// Log whether the encoder binary can be started. A missing encoder is not fatal at
/// startup; conversions report it in-band.
async fn probe_encoder(binary_path: &str) {
    let probe = Command::new(binary_path)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(ENCODER_PROBE_TIMEOUT, probe).await {
        Ok(Ok(output)) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let version = stdout.lines().next().unwrap_or_default().trim();
            tracing::info!(binary = %binary_path, version = %version, "AVIF encoder available");
        }
        Ok(Ok(output)) => {
            tracing::warn!(
                binary = %binary_path,
                status = ?output.status.code(),
                "AVIF encoder version probe failed"
            );
        }
        Ok(Err(e)) => {
            tracing::warn!(binary = %binary_path, error = %e, "AVIF encoder not found");
        }
        Err(_) => {
            tracing::warn!(binary = %binary_path, "AVIF encoder version probe timed out");
        }
    }
}
