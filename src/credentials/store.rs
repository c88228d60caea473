use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::credentials::credential::Credential;

/// Single-file credential cache.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached credential, if the file exists and parses.
    /// Unreadable or malformed files count as "no credential".
    pub async fn load(&self) -> Option<Credential> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no cached credential at '{}'", self.path.display());
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read cached credential");
                return None;
            }
        };

        serde_json::from_str::<Credential>(&raw)
            .inspect_err(|e| {
                warn!(path = %self.path.display(), error = %e, "cached credential is malformed, ignoring it");
            })
            .ok()
    }

    /// Write the credential atomically (tmp -> rename), owner-only on unix.
    pub async fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("cannot create '{}'", parent.display()))?;
        }

        let content = serde_json::to_vec_pretty(credential)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, content)
            .await
            .with_context(|| format!("cannot write '{}'", tmp.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }

        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("cannot move credential into '{}'", self.path.display()))?;

        info!("credential saved to '{}'", self.path.display());
        Ok(())
    }
}
