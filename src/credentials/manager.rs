use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::IdentityProvider;
use crate::config::export::ExportConfig;
use crate::credentials::credential::Credential;
use crate::credentials::store::CredentialStore;
use crate::helpers::time::now;

/// Resolves a usable credential: cached, refreshed, or freshly authorized.
pub struct CredentialManager<'a, P> {
    store: CredentialStore,
    provider: &'a P,
    safety_margin_seconds: u64,
}

impl<'a, P: IdentityProvider> CredentialManager<'a, P> {
    pub fn new(config: &ExportConfig, provider: &'a P) -> Self {
        Self {
            store: CredentialStore::new(&config.paths.credentials_file),
            provider,
            safety_margin_seconds: config.safety_margin_seconds,
        }
    }

    pub async fn load(&self) -> Option<Credential> {
        self.store.load().await
    }

    /// Run the interactive authorization and persist its result.
    pub async fn acquire(&self) -> Result<Credential> {
        info!("no cached credential, starting interactive authorization");
        let credential = self
            .provider
            .authorize()
            .await
            .context("interactive authorization failed")?;
        self.store.save(&credential).await?;
        Ok(credential)
    }

    /// Refresh an expired credential when a refresh token allows it.
    pub async fn ensure_valid(&self, mut credential: Credential) -> Result<Credential> {
        if !credential.is_expired(self.safety_margin_seconds, now()) {
            return Ok(credential);
        }
        if !credential.can_refresh() {
            warn!("cached credential is expired and has no refresh token, using it as is");
            return Ok(credential);
        }

        info!("cached credential is expired, refreshing");
        let grant = self
            .provider
            .refresh(&credential)
            .await
            .context("credential refresh failed")?;
        credential.apply_grant(grant, now());
        self.store.save(&credential).await?;
        Ok(credential)
    }

    pub async fn get_token(&self) -> Result<Credential> {
        match self.load().await {
            Some(credential) => self.ensure_valid(credential).await,
            None => self.acquire().await,
        }
    }
}
