use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use http::header;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::time::timeout;
use tracing::{debug, info};

const COMPLETED_PAGE: &str = "The authentication flow has completed. You may close this window.";
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Query string of the provider redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedirectParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone)]
struct CallbackState {
    sender: Arc<Mutex<Option<oneshot::Sender<RedirectParams>>>>,
}

/// Local HTTP listener that receives the authorization redirect.
pub struct CallbackListener {
    listener: TcpListener,
    redirect_uri: String,
}

impl CallbackListener {
    pub async fn bind(port: u16) -> Result<Self> {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("cannot listen for the authorization redirect on {}", addr))?;
        let port = listener.local_addr()?.port();
        info!("waiting for the authorization redirect on port {}", port);
        Ok(Self {
            listener,
            redirect_uri: format!("http://localhost:{}/", port),
        })
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Serve until the first redirect arrives and return its authorization code.
    /// Ctrl-C while waiting cancels the authorization.
    pub async fn wait_for_code(self, expected_state: &str) -> Result<String> {
        let (tx, rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = Router::new()
            .route("/", get(handle_redirect))
            .with_state(CallbackState {
                sender: Arc::new(Mutex::new(Some(tx))),
            });

        let mut server = tokio::spawn(async move {
            axum::serve(self.listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let received = tokio::select! {
            params = rx => params.map_err(|_| anyhow!("callback listener stopped before the redirect arrived")),
            _ = tokio::signal::ctrl_c() => Err(anyhow!("authorization cancelled by user")),
        };

        let _ = shutdown_tx.send(());
        if timeout(SHUTDOWN_GRACE, &mut server).await.is_err() {
            debug!("callback listener did not stop in time, aborting it");
            server.abort();
        }

        extract_code(received?, expected_state)
    }
}

async fn handle_redirect(
    State(state): State<CallbackState>,
    Query(params): Query<RedirectParams>,
) -> impl IntoResponse {
    if let Some(sender) = state.sender.lock().await.take() {
        let _ = sender.send(params);
    }
    ([(header::CONNECTION, "close")], COMPLETED_PAGE)
}

pub fn extract_code(params: RedirectParams, expected_state: &str) -> Result<String> {
    if let Some(error) = params.error {
        bail!("authorization was denied: {}", error);
    }
    if params.state.as_deref() != Some(expected_state) {
        bail!("OAuth state mismatch in the authorization redirect");
    }
    params
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| anyhow!("authorization redirect carried no code"))
}
