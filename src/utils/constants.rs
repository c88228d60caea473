//! Shared constants and invariants

// Google Fit scopes
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/fitness.body.read",
    "https://www.googleapis.com/auth/fitness.body.write",
];
// data type to filter data sources by
pub const DATA_TYPE: &str = "com.google.weight";
pub const FITNESS_API_URL: &str = "https://www.googleapis.com/fitness/v1";
pub const CALLBACK_PORT: u16 = 54547;

// filesystem layout, relative to the root dir
pub const AUTH_DIR: &str = "auth";
pub const EXPORTS_DIR: &str = "exports";
pub const CLIENT_SECRET_FILE: &str = "client_secret.json";
pub const CREDENTIALS_FILE: &str = "credentials.json";

pub const DEFAULT_CONFIG_FILE: &str = "fit-export.yaml";
pub const DEFAULT_ROOT_DIR: &str = ".";
pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

// used when client_secret.json omits them
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
