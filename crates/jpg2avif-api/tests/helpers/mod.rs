//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p jpg2avif-api`.
#![allow(dead_code)]

pub mod fixtures;
pub mod stubs;

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use jpg2avif_api::setup::routes;
use jpg2avif_api::state::AppState;
use jpg2avif_core::Config;
use jpg2avif_infra::{NotificationDispatcher, Notifier, ResourceMonitor};
use jpg2avif_processing::{AvifEncoder, Converter};
use tempfile::TempDir;

use stubs::{RecordingNotifier, SpyEncoder, StaticResourceMonitor};

pub const TEST_SERVICE_NAME: &str = "jpg2avif-test";

/// Test application: server plus handles on the stubs behind it.
pub struct TestApp {
    pub server: TestServer,
    pub encoder: Arc<SpyEncoder>,
    pub notifier: Arc<RecordingNotifier>,
    pub workspace_root: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of entries left in the workspace root.
    pub fn leftover_workspaces(&self) -> usize {
        std::fs::read_dir(self.workspace_root.path())
            .expect("workspace root readable")
            .count()
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.service_name = TEST_SERVICE_NAME.to_string();
    config
}

/// Spy encoder, recording notifier, static memory figures.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with_config(test_config())
}

pub fn setup_test_app_with_config(config: Config) -> TestApp {
    let encoder = Arc::new(SpyEncoder::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let workspace_root = TempDir::new().expect("Failed to create workspace root");

    let server = build_server(
        config,
        encoder.clone(),
        Some(notifier.clone()),
        Arc::new(StaticResourceMonitor::default()),
        &workspace_root,
    );

    TestApp {
        server,
        encoder,
        notifier,
        workspace_root,
    }
}

/// Build a server around arbitrary collaborators. `notifier: None` disables notifications.
pub fn build_server(
    config: Config,
    encoder: Arc<dyn AvifEncoder>,
    notifier: Option<Arc<dyn Notifier>>,
    resources: Arc<dyn ResourceMonitor>,
    workspace_root: &TempDir,
) -> TestServer {
    let dispatcher = match notifier {
        Some(notifier) => NotificationDispatcher::new(notifier, Duration::from_secs(10)),
        None => NotificationDispatcher::disabled(),
    };

    build_server_with_dispatcher(config, encoder, dispatcher, resources, workspace_root)
}

pub fn build_server_with_dispatcher(
    config: Config,
    encoder: Arc<dyn AvifEncoder>,
    notifier: NotificationDispatcher,
    resources: Arc<dyn ResourceMonitor>,
    workspace_root: &TempDir,
) -> TestServer {
    let state = Arc::new(AppState {
        converter: Converter::new(encoder)
            .with_workspace_root(Some(workspace_root.path().to_path_buf())),
        notifier,
        resources,
        config: config.clone(),
    });

    let app = routes::setup_routes(&config, state);
    TestServer::new(app.into_make_service()).expect("Failed to create test server")
}
