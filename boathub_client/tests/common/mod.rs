
use std::sync::{Arc, Once};
use std::time::Duration;

use boathub_client::{BoatHubClient, ClientConfig, MemoryNavigator};

pub use mock_server::{MockBoatHub, VALID_PASSWORD, VALID_USERNAME, spawn_mock_server};

static TRACING: Once = Once::new();

/// Installs a test-friendly tracing subscriber once per test binary.
/// Output is controlled with `RUST_LOG`.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A client pointed at `server`, plus the navigator it redirects through.
/// The navigator starts on `/boats`, away from the entry page.
pub fn client_for(server: &MockBoatHub) -> (BoatHubClient, Arc<MemoryNavigator>) {
    client_at(server, "/boats")
}

pub fn client_at(server: &MockBoatHub, path: &str) -> (BoatHubClient, Arc<MemoryNavigator>) {
    init_test_tracing();
    let navigator = Arc::new(MemoryNavigator::new(path));
    let config = ClientConfig::new(server.base_url.clone()).with_timeout(Duration::from_secs(5));
    let client = BoatHubClient::with_navigator(config, navigator.clone())
        .expect("Failed to build client for mock server");
    (client, navigator)
}

/// Logs in with the mock server's valid credentials.
pub async fn login(client: &BoatHubClient) {
    let credentials = boathub_client::Credentials::new(VALID_USERNAME, VALID_PASSWORD);
    assert!(
        client.session().login(&credentials).await,
        "Login with valid credentials should succeed"
    );
}
