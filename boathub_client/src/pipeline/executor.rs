use std::sync::Arc;

use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::csrf::TokenFetcher;
use crate::errors::ApiError;
use crate::session::SessionHandle;
use crate::utils::build_url;

use super::navigator::Navigator;
use super::request::{Attempt, PendingRequest};
use super::response::{Outcome, classify, decode};

/// Single chokepoint for application HTTP calls.
///
/// Mutating calls carry the anti-forgery token, a 401 ends the client session
/// and sends the user to the entry page, and a 403 caused by a stale token is
/// repaired by one token refresh and one replay of the original call.
pub struct RequestPipeline {
    http: reqwest::Client,
    base_url: String,
    entry_path: String,
    fetcher: Arc<TokenFetcher>,
    session: SessionHandle,
    navigator: Arc<dyn Navigator>,
}

impl RequestPipeline {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        entry_path: impl Into<String>,
        fetcher: Arc<TokenFetcher>,
        session: SessionHandle,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            entry_path: entry_path.into(),
            fetcher,
            session,
            navigator,
        }
    }

    /// Sends a call and decodes the JSON response into `T`.
    ///
    /// A 204 or empty body decodes as JSON `null`, so `()`, `Option<_>` and
    /// `serde_json::Value` receive an empty result rather than an error.
    pub async fn request<T, B>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let (status, bytes) = self
            .request_raw(endpoint, method, body, extra_headers)
            .await?;
        decode(status, &bytes)
    }

    /// Same as [`Self::request`] but hands back the undecoded success body.
    pub async fn request_raw<B>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<(StatusCode, Vec<u8>), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;

        let pending = PendingRequest::new(
            method,
            endpoint,
            build_url(&self.base_url, endpoint),
            body,
            extra_headers.unwrap_or_default(),
        );

        self.execute(&pending).await
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(endpoint, Method::GET, None, None)
            .await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(endpoint, Method::POST, Some(body), None).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(endpoint, Method::PUT, Some(body), None).await
    }

    pub async fn patch<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(endpoint, Method::PATCH, Some(body), None)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(endpoint, Method::DELETE, None, None)
            .await
    }

    async fn execute(&self, pending: &PendingRequest) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let mut attempt = Attempt::First;

        loop {
            let (status, body) = self.dispatch(pending, attempt).await?;

            match classify(status, &body) {
                Outcome::Success => return Ok((status, body)),
                Outcome::Unauthorized => {
                    self.end_session(pending);
                    return Err(ApiError::AuthRequired);
                }
                Outcome::TokenRejected(message) => {
                    let Some(next) = attempt.next() else {
                        tracing::warn!(
                            "{} {} still rejected after token refresh: {}",
                            pending.method,
                            pending.endpoint,
                            message
                        );
                        return Err(ApiError::Forbidden(message));
                    };

                    tracing::info!(
                        "{} {} rejected for CSRF token, refreshing and retrying once",
                        pending.method,
                        pending.endpoint
                    );
                    if let Err(e) = self.fetcher.refresh().await {
                        tracing::error!("Failed to refresh CSRF token: {}", e);
                        return Err(ApiError::Forbidden(message));
                    }
                    attempt = next;
                }
                Outcome::Forbidden(message) => return Err(ApiError::Forbidden(message)),
                Outcome::Failed { status, message } => {
                    tracing::debug!(
                        "{} {} failed with status {}: {}",
                        pending.method,
                        pending.endpoint,
                        status,
                        message
                    );
                    return Err(ApiError::RequestFailed { status, message });
                }
            }
        }
    }

    /// One send of `pending`. Headers are rebuilt from the captured request
    /// each time so a retry picks up the refreshed token and nothing else.
    async fn dispatch(
        &self,
        pending: &PendingRequest,
        attempt: Attempt,
    ) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let token = if pending.needs_token() {
            Some(self.fetcher.ensure().await?)
        } else {
            None
        };
        let headers = pending.build_headers(token.as_ref())?;

        tracing::debug!(
            "Sending {} {} ({:?})",
            pending.method,
            pending.url,
            attempt
        );

        let mut builder = self
            .http
            .request(pending.method.clone(), &pending.url)
            .headers(headers);
        if let Some(body) = &pending.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("{} {} failed: {}", pending.method, pending.url, e);
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok((status, body.to_vec()))
    }

    fn end_session(&self, pending: &PendingRequest) {
        tracing::warn!(
            "{} {} returned 401, session is no longer valid",
            pending.method,
            pending.endpoint
        );
        self.session.invalidate();

        if self.navigator.current_path() != self.entry_path {
            self.navigator.redirect(&self.entry_path);
        }
    }
}
