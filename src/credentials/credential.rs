use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::client_secret::OAuthClient;

/// OAuth token material plus what is needed to refresh it later
/// without reading the client secret file again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// None means the provider did not announce an expiry
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Token endpoint response for both the code exchange and the refresh grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    /// space separated, as returned by the provider
    pub scope: Option<String>,
}

impl Credential {
    pub fn from_grant(
        grant: TokenGrant,
        client: &OAuthClient,
        requested_scopes: &[String],
        now: DateTime<Utc>,
    ) -> Self {
        let scopes = grant
            .scope
            .as_deref()
            .map(split_scopes)
            .unwrap_or_else(|| requested_scopes.to_vec());
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: grant.expires_in.map(|secs| now + Duration::seconds(secs)),
            token_uri: client.token_uri.clone(),
            client_id: client.client_id.clone(),
            client_secret: client.client_secret.clone(),
            scopes,
        }
    }

    /// Expired once `now` reaches `expires_at - safety_margin_seconds`.
    pub fn is_expired(&self, safety_margin_seconds: u64, now: DateTime<Utc>) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };
        let margin = Duration::seconds(safety_margin_seconds as i64);
        now >= expires_at - margin
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }

    /// Update in place from a refresh grant. The provider usually omits the
    /// refresh token on refresh, in which case the old one is kept.
    pub fn apply_grant(&mut self, grant: TokenGrant, now: DateTime<Utc>) {
        self.access_token = grant.access_token;
        self.expires_at = grant.expires_in.map(|secs| now + Duration::seconds(secs));
        if let Some(refresh_token) = grant.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        if let Some(scope) = grant.scope.as_deref() {
            self.scopes = split_scopes(scope);
        }
    }
}

fn split_scopes(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(str::to_owned).collect()
}
