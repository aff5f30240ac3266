use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::boats::BoatService;
use crate::config::ClientConfig;
use crate::csrf::{TokenFetcher, TokenStore};
use crate::errors::ApiError;
use crate::pipeline::{MemoryNavigator, Navigator, RequestPipeline};
use crate::session::{AuthService, SessionHandle, SessionState};

/// Creates the HTTP client shared by every component:
///
/// - `cookie_store`: enabled so the session cookie travels with every call.
///
/// - `timeout`: taken from the configuration; a timed-out call surfaces as a
///   network error.
///
/// - `pool_idle_timeout` / `pool_max_idle_per_host`: 90 seconds and 32, the
///   reqwest defaults, spelled out so they are visible next to the timeout.
fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {e}")))
}

/// Everything needed to talk to a BoatHub server, wired from one
/// [`ClientConfig`].
///
/// Each instance owns its own token store, session and cookie jar, so several
/// clients can live side by side (one per test, for instance).
pub struct BoatHubClient {
    config: ClientConfig,
    store: Arc<TokenStore>,
    fetcher: Arc<TokenFetcher>,
    pipeline: Arc<RequestPipeline>,
    session: SessionState,
    boats: BoatService,
    navigator: Arc<dyn Navigator>,
}

impl BoatHubClient {
    /// Builds a client that records redirects in a [`MemoryNavigator`].
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let navigator = Arc::new(MemoryNavigator::new(config.entry_path.clone()));
        Self::with_navigator(config, navigator)
    }

    pub fn with_navigator(
        config: ClientConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("Invalid base URL {}: {e}", config.base_url)))?;

        let http = build_http_client(config.timeout)?;
        let store = Arc::new(TokenStore::new());
        let fetcher = Arc::new(TokenFetcher::new(
            http.clone(),
            &config.base_url,
            store.clone(),
        ));
        let handle = SessionHandle::new();
        let pipeline = Arc::new(RequestPipeline::new(
            http,
            config.base_url.clone(),
            config.entry_path.clone(),
            fetcher.clone(),
            handle.clone(),
            navigator.clone(),
        ));
        let session = SessionState::new(handle, AuthService::new(pipeline.clone()), fetcher.clone());
        let boats = BoatService::new(pipeline.clone());

        tracing::debug!("BoatHub client configured for {}", config.base_url);

        Ok(Self {
            config,
            store,
            fetcher,
            pipeline,
            session,
            boats,
            navigator,
        })
    }

    /// Fetches the initial CSRF token. Never fails; see [`TokenFetcher::initialize`].
    pub async fn init(&self) {
        self.fetcher.initialize().await;
    }

    /// Drops the client session and the token, names included.
    pub fn reset(&self) {
        tracing::debug!("Resetting BoatHub client state");
        self.session.handle().reset();
        self.store.reset();
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    pub fn token_fetcher(&self) -> &Arc<TokenFetcher> {
        &self.fetcher
    }

    pub fn pipeline(&self) -> &Arc<RequestPipeline> {
        &self.pipeline
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn boats(&self) -> &BoatService {
        &self.boats
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }
}
