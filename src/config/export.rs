use std::path::{Path, PathBuf};

use crate::config::settings::SettingsConfig;
use crate::helpers::time::now_nanos;
use crate::utils::constants::{
    AUTH_DIR, CALLBACK_PORT, CLIENT_SECRET_FILE, CREDENTIALS_FILE, DATA_TYPE,
    DEFAULT_ROOT_DIR, DEFAULT_SAFETY_MARGIN_SECS, EXPORTS_DIR, FITNESS_API_URL, SCOPES,
};

/// Everything a run needs, resolved once at startup and handed to the
/// credential manager and the export driver.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub paths: Paths,
    pub scopes: Vec<String>,
    pub data_type: String,
    pub window: TimeWindow,
    pub callback_port: u16,
    pub fitness_api_url: String,
    pub safety_margin_seconds: u64,
}

impl ExportConfig {
    pub fn from_settings(settings: &SettingsConfig, window: TimeWindow) -> Self {
        let root = settings
            .root_dir
            .as_deref()
            .unwrap_or(DEFAULT_ROOT_DIR);
        Self {
            paths: Paths::new(root),
            scopes: SCOPES.iter().map(|scope| scope.to_string()).collect(),
            data_type: DATA_TYPE.to_owned(),
            window,
            callback_port: CALLBACK_PORT,
            fitness_api_url: FITNESS_API_URL.to_owned(),
            safety_margin_seconds: settings
                .safety_margin_seconds
                .unwrap_or(DEFAULT_SAFETY_MARGIN_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Paths {
    pub root: PathBuf,
    pub exports_dir: PathBuf,
    pub client_secret_file: PathBuf,
    pub credentials_file: PathBuf,
}

impl Paths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let auth_dir = root.join(AUTH_DIR);
        Self {
            exports_dir: root.join(EXPORTS_DIR),
            client_secret_file: auth_dir.join(CLIENT_SECRET_FILE),
            credentials_file: auth_dir.join(CREDENTIALS_FILE),
            root,
        }
    }
}

/// Query window in nanoseconds since the unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_ns: u64,
    pub end_ns: u64,
}

impl TimeWindow {
    /// Window from epoch zero to the current wall clock. Call once per run.
    pub fn until_now() -> Self {
        Self::new(0, now_nanos())
    }

    pub fn new(start_ns: u64, end_ns: u64) -> Self {
        Self { start_ns, end_ns }
    }

    /// Dataset id understood by the fitness API: `{start}-{end}`.
    pub fn dataset_id(&self) -> String {
        format!("{}-{}", self.start_ns, self.end_ns)
    }
}
