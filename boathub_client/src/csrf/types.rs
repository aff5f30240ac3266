use http::{HeaderName, HeaderValue};
use serde::Deserialize;

use super::config::{DEFAULT_CSRF_FIELD_NAME, DEFAULT_CSRF_HEADER_NAME};
use super::errors::CsrfError;

/// Anti-forgery token together with the names the server expects it under.
///
/// `header_name` and `field_name` are server configuration, not secrets, so
/// they survive [`super::TokenStore::clear`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityToken {
    pub value: Option<String>,
    pub header_name: String,
    pub field_name: String,
}

impl SecurityToken {
    pub fn new(
        value: impl Into<String>,
        header_name: impl Into<String>,
        field_name: impl Into<String>,
    ) -> Self {
        Self {
            value: Some(value.into()),
            header_name: header_name.into(),
            field_name: field_name.into(),
        }
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// Header pair to attach to a mutating request, if a value is held.
    pub(crate) fn header_pair(&self) -> Result<Option<(HeaderName, HeaderValue)>, CsrfError> {
        let Some(value) = self.value.as_deref() else {
            return Ok(None);
        };

        let name = HeaderName::from_bytes(self.header_name.as_bytes()).map_err(|e| {
            CsrfError::Protocol(format!("Invalid header name {:?}: {e}", self.header_name))
        })?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| CsrfError::Protocol(format!("Invalid token value: {e}")))?;

        Ok(Some((name, value)))
    }
}

impl Default for SecurityToken {
    fn default() -> Self {
        Self {
            value: None,
            header_name: DEFAULT_CSRF_HEADER_NAME.to_string(),
            field_name: DEFAULT_CSRF_FIELD_NAME.to_string(),
        }
    }
}

/// Body of `GET /api/csrf-token`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CsrfTokenResponse {
    pub(super) token: Option<String>,
    pub(super) header_name: Option<String>,
    pub(super) parameter_name: Option<String>,
}

impl CsrfTokenResponse {
    /// Converts the response into a token, keeping the previous names for any
    /// the server left out.
    pub(super) fn into_token(self, previous: &SecurityToken) -> Result<SecurityToken, CsrfError> {
        let token = self
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| CsrfError::Protocol("Response has no token field".to_string()))?;

        let header_name = self
            .header_name
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| previous.header_name.clone());
        let field_name = self
            .parameter_name
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| previous.field_name.clone());

        let candidate = SecurityToken::new(token, header_name, field_name);
        // Reject names or values that could never go on the wire.
        candidate.header_pair()?;
        Ok(candidate)
    }
}
