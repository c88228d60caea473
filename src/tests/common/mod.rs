// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use serde_json::Value;
use tracing::subscriber::DefaultGuard;

use crate::api::{FitnessApi, IdentityProvider};
use crate::config::export::{ExportConfig, TimeWindow};
use crate::config::settings::SettingsConfig;
use crate::credentials::{Credential, TokenGrant};

pub const TEST_END_NS: u64 = 1_700_000_000_000_000_000;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// Config rooted in a temp dir with a fixed window and an ephemeral callback port.
pub fn test_config(root: &Path) -> ExportConfig {
    let settings = SettingsConfig {
        root_dir: Some(root.to_string_lossy().into_owned()),
        ..SettingsConfig::default()
    };
    let mut config = ExportConfig::from_settings(&settings, TimeWindow::new(0, TEST_END_NS));
    config.callback_port = 0;
    config
}

pub fn credential(access_token: &str, refresh_token: Option<&str>, expires_in_secs: i64) -> Credential {
    Credential {
        access_token: access_token.to_owned(),
        refresh_token: refresh_token.map(str::to_owned),
        expires_at: Some(Utc::now() + Duration::seconds(expires_in_secs)),
        token_uri: "https://oauth2.example.test/token".to_owned(),
        client_id: "client-id".to_owned(),
        client_secret: "client-secret".to_owned(),
        scopes: vec!["https://www.googleapis.com/auth/fitness.body.read".to_owned()],
    }
}

pub fn grant(access_token: &str, refresh_token: Option<&str>, expires_in: i64) -> TokenGrant {
    TokenGrant {
        access_token: access_token.to_owned(),
        refresh_token: refresh_token.map(str::to_owned),
        expires_in: Some(expires_in),
        scope: None,
    }
}

/// Identity provider that counts calls instead of talking to anyone.
pub struct FakeIdentity {
    pub authorize_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    issued: Credential,
    refresh_grant: Option<TokenGrant>,
}

impl FakeIdentity {
    pub fn new(issued: Credential, refresh_grant: Option<TokenGrant>) -> Self {
        Self {
            authorize_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            issued,
            refresh_grant,
        }
    }

    pub fn authorize_count(&self) -> usize {
        self.authorize_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

impl IdentityProvider for FakeIdentity {
    async fn authorize(&self) -> Result<Credential> {
        self.authorize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.issued.clone())
    }

    async fn refresh(&self, _credential: &Credential) -> Result<TokenGrant> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_grant
            .clone()
            .ok_or_else(|| anyhow!("invalid_grant: token has been revoked"))
    }
}

/// Fitness API serving canned documents. Unknown data sources fail.
pub struct FakeFitnessApi {
    listing: Option<Value>,
    datasets: HashMap<String, Value>,
    pub requests: Mutex<Vec<(String, TimeWindow)>>,
}

impl FakeFitnessApi {
    pub fn new(listing: Value) -> Self {
        Self {
            listing: Some(listing),
            datasets: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_listing() -> Self {
        Self {
            listing: None,
            datasets: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_dataset(mut self, data_source_id: &str, dataset: Value) -> Self {
        self.datasets.insert(data_source_id.to_owned(), dataset);
        self
    }

    pub fn requested(&self) -> Vec<(String, TimeWindow)> {
        self.requests.lock().unwrap().clone()
    }
}

impl FitnessApi for FakeFitnessApi {
    async fn list_data_sources(&self, _data_type: &str) -> Result<Value> {
        self.listing
            .clone()
            .ok_or_else(|| anyhow!("fitness API request failed: 503 Service Unavailable"))
    }

    async fn get_dataset(&self, data_source_id: &str, window: &TimeWindow) -> Result<Value> {
        self.requests
            .lock()
            .unwrap()
            .push((data_source_id.to_owned(), *window));
        self.datasets
            .get(data_source_id)
            .cloned()
            .ok_or_else(|| anyhow!("fitness API request failed: 404 Not Found"))
    }
}

/// Log lines written while the returned guard is alive (current thread only).
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn install() -> (Self, DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    pub fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).lines().map(str::to_owned).collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains("ERROR"))
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
