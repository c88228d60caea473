use std::path::PathBuf;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::{Client, Url};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::api::callback::CallbackListener;
use crate::api::client_secret::OAuthClient;
use crate::api::IdentityProvider;
use crate::config::export::ExportConfig;
use crate::credentials::{Credential, TokenGrant};
use crate::helpers::time::now;

type BrowserLauncher = Box<dyn Fn(&str) + Send + Sync>;

/// Installed-app OAuth 2.0 flow against Google's identity provider:
/// browser consent, local redirect listener, PKCE code exchange.
pub struct GoogleOAuth {
    client: Client,
    client_secret_file: PathBuf,
    scopes: Vec<String>,
    callback_port: u16,
    browser: BrowserLauncher,
}

/// One pending authorization: the consent URL and the secrets it was built with.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub code_verifier: String,
}

impl GoogleOAuth {
    pub fn new(client: Client, config: &ExportConfig) -> Self {
        Self {
            client,
            client_secret_file: config.paths.client_secret_file.clone(),
            scopes: config.scopes.clone(),
            callback_port: config.callback_port,
            browser: Box::new(open_in_browser),
        }
    }

    /// Replace the system browser launcher.
    pub fn with_browser<F>(mut self, browser: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.browser = Box::new(browser);
        self
    }

    async fn exchange_code(
        &self,
        oauth_client: &OAuthClient,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<TokenGrant> {
        self.post_token_form(
            &oauth_client.token_uri,
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", oauth_client.client_id.as_str()),
                ("client_secret", oauth_client.client_secret.as_str()),
                ("code_verifier", code_verifier),
            ],
        )
        .await
    }

    async fn post_token_form(&self, token_uri: &str, form: &[(&str, &str)]) -> Result<TokenGrant> {
        let response = self.client.post(token_uri).form(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("OAuth2 token request failed: {}: {}", status, body));
        }
        response
            .json::<TokenGrant>()
            .await
            .context("OAuth2 token response is not a token grant")
    }
}

impl IdentityProvider for GoogleOAuth {
    async fn authorize(&self) -> Result<Credential> {
        let oauth_client = OAuthClient::from_file(&self.client_secret_file).await?;
        let listener = CallbackListener::bind(self.callback_port).await?;
        let redirect_uri = listener.redirect_uri().to_owned();
        let request = build_authorization_request(&oauth_client, &redirect_uri, &self.scopes)?;

        println!("Please visit this URL to authorize this application: {}", request.url);
        (self.browser)(&request.url);

        let code = listener.wait_for_code(&request.state).await?;
        info!("authorization code received, exchanging it for tokens");
        let grant = self
            .exchange_code(&oauth_client, &code, &redirect_uri, &request.code_verifier)
            .await?;
        Ok(Credential::from_grant(grant, &oauth_client, &self.scopes, now()))
    }

    async fn refresh(&self, credential: &Credential) -> Result<TokenGrant> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or_else(|| anyhow!("credential has no refresh token"))?;
        self.post_token_form(
            &credential.token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", credential.client_id.as_str()),
                ("client_secret", credential.client_secret.as_str()),
            ],
        )
        .await
    }
}

pub fn build_authorization_request(
    oauth_client: &OAuthClient,
    redirect_uri: &str,
    scopes: &[String],
) -> Result<AuthorizationRequest> {
    let state = uuid::Uuid::new_v4().simple().to_string();
    let code_verifier = generate_code_verifier();
    let code_challenge = compute_code_challenge(&code_verifier);
    let scope = scopes.join(" ");

    let url = Url::parse_with_params(
        &oauth_client.auth_uri,
        &[
            ("response_type", "code"),
            ("client_id", oauth_client.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
            ("state", state.as_str()),
            ("access_type", "offline"),
            ("code_challenge", code_challenge.as_str()),
            ("code_challenge_method", "S256"),
        ],
    )
    .with_context(|| format!("invalid auth_uri '{}'", oauth_client.auth_uri))?;

    Ok(AuthorizationRequest {
        url: url.to_string(),
        state,
        code_verifier,
    })
}

fn generate_code_verifier() -> String {
    let mut buf = [0u8; 32];
    for chunk in buf.chunks_mut(16) {
        let id = uuid::Uuid::new_v4();
        chunk.copy_from_slice(&id.as_bytes()[..chunk.len()]);
    }
    URL_SAFE_NO_PAD.encode(buf)
}

pub fn compute_code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Best effort: the URL is printed anyway.
fn open_in_browser(url: &str) {
    let spawned = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("rundll32").args(["url.dll,FileProtocolHandler", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };
    if let Err(e) = spawned {
        warn!(error = %e, "cannot launch a browser, open the URL manually");
    }
}
