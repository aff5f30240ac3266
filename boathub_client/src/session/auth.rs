use std::sync::Arc;

use http::Method;

use crate::errors::ApiError;
use crate::pipeline::RequestPipeline;

use super::types::{Credentials, Identity};

pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const LOGOUT_ENDPOINT: &str = "/api/auth/logout";
pub const CURRENT_USER_ENDPOINT: &str = "/api/auth/user";

/// Typed access to the authentication endpoints.
#[derive(Clone)]
pub struct AuthService {
    pipeline: Arc<RequestPipeline>,
}

impl AuthService {
    pub fn new(pipeline: Arc<RequestPipeline>) -> Self {
        Self { pipeline }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Identity, ApiError> {
        self.pipeline.post(LOGIN_ENDPOINT, credentials).await
    }

    /// The server answers with a plain-text acknowledgement, so the body is
    /// not decoded.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.pipeline
            .request_raw::<()>(LOGOUT_ENDPOINT, Method::POST, None, None)
            .await
            .map(|_| ())
    }

    pub async fn current_user(&self) -> Result<Identity, ApiError> {
        self.pipeline.get(CURRENT_USER_ENDPOINT).await
    }
}
