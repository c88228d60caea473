use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::utils::constants::{GOOGLE_AUTH_URI, GOOGLE_TOKEN_URI};

/// OAuth client registration, as downloaded from the provider console.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// The file wraps the registration in an `installed` or a `web` section.
#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<OAuthClient>,
    web: Option<OAuthClient>,
}

impl OAuthClient {
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("cannot read client secret file '{}'", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid client secret file '{}'", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: ClientSecretFile = serde_json::from_str(raw)?;
        file.installed
            .or(file.web)
            .ok_or_else(|| anyhow!("expected an 'installed' or 'web' section"))
    }
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_owned()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_owned()
}
