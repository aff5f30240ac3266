use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use http::header::ACCEPT;
use tokio::sync::watch;

use crate::utils::{build_url, mask_token};

use super::config::CSRF_TOKEN_ENDPOINT;
use super::errors::CsrfError;
use super::store::TokenStore;
use super::types::{CsrfTokenResponse, SecurityToken};

type FetchOutcome = Option<Result<SecurityToken, CsrfError>>;

/// Obtains tokens from the server and keeps the [`TokenStore`] current.
///
/// `ensure` and `refresh` are single-flight: while one fetch is running, every
/// other caller waits on it and receives its result instead of issuing a
/// request of its own.
pub struct TokenFetcher {
    http: reqwest::Client,
    token_url: String,
    store: Arc<TokenStore>,
    inflight: Mutex<Option<watch::Receiver<FetchOutcome>>>,
    initialized: AtomicBool,
}

enum Role {
    Leader(watch::Sender<FetchOutcome>),
    Follower(watch::Receiver<FetchOutcome>),
}

/// Frees the in-flight slot when the leading fetch finishes or is dropped.
struct InflightGuard<'a> {
    slot: &'a Mutex<Option<watch::Receiver<FetchOutcome>>>,
    channel: watch::Receiver<FetchOutcome>,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        // Leave a successor's fetch in place.
        if slot
            .as_ref()
            .is_some_and(|rx| rx.same_channel(&self.channel))
        {
            *slot = None;
        }
    }
}

impl TokenFetcher {
    pub fn new(http: reqwest::Client, base_url: &str, store: Arc<TokenStore>) -> Self {
        Self {
            http,
            token_url: build_url(base_url, CSRF_TOKEN_ENDPOINT),
            store,
            inflight: Mutex::new(None),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Fetches a token from the server and stores it.
    ///
    /// This always performs one network call; prefer [`Self::ensure`] or
    /// [`Self::refresh`], which share concurrent fetches.
    pub async fn fetch(&self) -> Result<SecurityToken, CsrfError> {
        tracing::debug!("Fetching CSRF token from {}", self.token_url);

        let response = self
            .http
            .get(&self.token_url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("CSRF token endpoint unreachable: {}", e);
                CsrfError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("CSRF token fetch failed with status: {}", status);
            return Err(CsrfError::Protocol(format!(
                "Failed to fetch CSRF token: {}",
                status.as_u16()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CsrfError::Network(e.to_string()))?;
        let parsed: CsrfTokenResponse =
            serde_json::from_slice(&body).map_err(|e| CsrfError::Protocol(e.to_string()))?;

        let token = parsed.into_token(&self.store.get())?;
        self.store.set(token.clone());

        tracing::debug!(
            "Stored CSRF token {} for header {}",
            token.value.as_deref().map(mask_token).unwrap_or_default(),
            token.header_name
        );
        Ok(token)
    }

    /// Returns the stored token, fetching one first if none is held.
    pub async fn ensure(&self) -> Result<SecurityToken, CsrfError> {
        let current = self.store.get();
        if current.is_present() {
            return Ok(current);
        }
        self.fetch_shared(true).await
    }

    /// Discards the stored token and fetches a new one.
    pub async fn refresh(&self) -> Result<SecurityToken, CsrfError> {
        tracing::debug!("Refreshing CSRF token");
        self.store.clear();
        self.fetch_shared(false).await
    }

    /// Best-effort startup fetch. Runs until one attempt succeeds; failures are
    /// logged and never returned.
    pub async fn initialize(&self) {
        if self.initialized.load(Ordering::Acquire) {
            return;
        }

        match self.ensure().await {
            Ok(_) => {
                self.initialized.store(true, Ordering::Release);
                tracing::info!("CSRF protection initialized");
            }
            Err(e) => {
                tracing::error!("Failed to initialize CSRF protection: {}", e);
            }
        }
    }

    /// Joins the running fetch or becomes the one that runs it. When the
    /// running fetch is dropped before finishing, its waiters elect a new
    /// leader among themselves, so there is still only one request on the wire.
    async fn fetch_shared(&self, reuse_cached: bool) -> Result<SecurityToken, CsrfError> {
        loop {
            let role = {
                let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
                match inflight.as_ref() {
                    // A closed channel belongs to a leader that is being dropped.
                    Some(rx) if rx.has_changed().is_ok() => Role::Follower(rx.clone()),
                    _ => {
                        // A fetch may have completed between the caller's check and now.
                        if reuse_cached {
                            let current = self.store.get();
                            if current.is_present() {
                                return Ok(current);
                            }
                        }
                        let (tx, rx) = watch::channel(None);
                        *inflight = Some(rx);
                        Role::Leader(tx)
                    }
                }
            };

            match role {
                Role::Leader(tx) => {
                    let _guard = InflightGuard {
                        slot: &self.inflight,
                        channel: tx.subscribe(),
                    };
                    let result = self.fetch().await;
                    tx.send_replace(Some(result.clone()));
                    return result;
                }
                Role::Follower(mut rx) => {
                    tracing::debug!("Joining in-flight CSRF token fetch");
                    let shared = rx
                        .wait_for(Option::is_some)
                        .await
                        .ok()
                        .and_then(|outcome| (*outcome).clone());

                    if let Some(result) = shared {
                        return result;
                    }
                    tracing::warn!("In-flight CSRF token fetch was abandoned, taking over");
                }
            }
        }
    }
}
