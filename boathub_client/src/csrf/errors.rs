use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CsrfError {
    /// The token endpoint could not be reached
    #[error("Network error while fetching CSRF token: {0}")]
    Network(String),

    /// The token endpoint answered with something other than a usable token
    #[error("Malformed CSRF token response: {0}")]
    Protocol(String),
}
