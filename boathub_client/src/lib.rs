//! boathub-client - CSRF-aware session client for the BoatHub REST API
//!
//! Every call goes through one [`RequestPipeline`], which attaches the
//! double-submit CSRF token to mutating requests, turns a 401 into a signed-out
//! session, and repairs a stale token with a single refresh and retry.
//! [`SessionState`] drives login, logout and session checks on top of it.

mod boats;
mod client;
mod config;
mod csrf;
mod errors;
mod pipeline;
mod session;
mod utils;

pub use client::BoatHubClient;

pub use config::{
    BOATHUB_API_BASE_URL, BOATHUB_ENTRY_PATH, BOATHUB_REQUEST_TIMEOUT_MS, ClientConfig,
};

pub use errors::ApiError;

pub use csrf::{
    CSRF_TOKEN_ENDPOINT, CsrfError, DEFAULT_CSRF_FIELD_NAME, DEFAULT_CSRF_HEADER_NAME,
    SecurityToken, TokenFetcher, TokenStore,
};

pub use pipeline::{MemoryNavigator, Navigator, RequestPipeline};

pub use session::{
    AuthPhase, AuthService, CURRENT_USER_ENDPOINT, Credentials, Identity, LOGIN_ENDPOINT,
    LOGOUT_ENDPOINT, Session, SessionHandle, SessionState,
};

pub use boats::{
    BOATS_ENDPOINT, Boat, BoatRequest, BoatService, BoatType, CreateBoatRequest, Page, Pageable,
    SortDirection, UpdateBoatRequest,
};

// Re-exported so callers can build `request` arguments without a direct http dependency.
pub use http::{HeaderMap, Method, StatusCode};
