mod config;
mod errors;
mod fetcher;
mod store;
mod types;

pub use config::{CSRF_TOKEN_ENDPOINT, DEFAULT_CSRF_FIELD_NAME, DEFAULT_CSRF_HEADER_NAME};
pub use errors::CsrfError;
pub use fetcher::TokenFetcher;
pub use store::TokenStore;
pub use types::SecurityToken;
