use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};

use crate::csrf::{CSRF_TOKEN_ENDPOINT, SecurityToken};
use crate::errors::ApiError;

/// Which send of a logical call is being made. A call gets at most one retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attempt {
    First,
    Retry,
}

impl Attempt {
    /// The attempt that may follow this one, if any.
    pub(crate) fn next(self) -> Option<Self> {
        match self {
            Attempt::First => Some(Attempt::Retry),
            Attempt::Retry => None,
        }
    }
}

pub(crate) fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

pub(crate) fn is_token_endpoint(endpoint: &str) -> bool {
    endpoint.contains(CSRF_TOKEN_ENDPOINT)
}

/// Snapshot of a call as issued by the caller. Kept unchanged so a retry
/// replays exactly the same method, body and extra headers.
#[derive(Debug)]
pub(crate) struct PendingRequest {
    pub(crate) method: Method,
    pub(crate) endpoint: String,
    pub(crate) url: String,
    pub(crate) body: Option<Vec<u8>>,
    pub(crate) extra_headers: HeaderMap,
}

impl PendingRequest {
    pub(crate) fn new(
        method: Method,
        endpoint: &str,
        url: String,
        body: Option<Vec<u8>>,
        extra_headers: HeaderMap,
    ) -> Self {
        Self {
            method,
            endpoint: endpoint.to_string(),
            url,
            body,
            extra_headers,
        }
    }

    pub(crate) fn needs_token(&self) -> bool {
        is_mutating(&self.method) && !is_token_endpoint(&self.endpoint)
    }

    /// Headers for one send: JSON defaults, then the caller's headers, then the
    /// CSRF header when a token is supplied.
    pub(crate) fn build_headers(
        &self,
        token: Option<&SecurityToken>,
    ) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.extend(self.extra_headers.clone());

        if let Some((name, value)) = token.map(SecurityToken::header_pair).transpose()?.flatten() {
            headers.insert(name, value);
        }

        Ok(headers)
    }
}
