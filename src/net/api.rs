//! REST calls against the session service.
//!
//! The core only depends on [`SessionApi`]; [`HttpSessionApi`] is the
//! `reqwest` implementation. Its client keeps an in-memory cookie jar so the
//! session cookie set by login rides along on every later call, and it never
//! follows redirects so a register `308` is observed as-is.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns `Result<(), ApiError>`. Non-success statuses carry the
//! response body text (or the reason phrase) as the message.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::StatusCode;

use super::types::{Credentials, Registration};
use crate::config::{EndpointConfig, LogoutMethod};
use crate::error::{ApiError, status_message};

/// Contract the auth core consumes. Enables mocking in tests.
#[async_trait::async_trait]
pub trait SessionApi: Send + Sync {
    /// `GET /api/auth/session`. Ok iff the server confirms an active session.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on any non-success status or transport failure.
    async fn session(&self) -> Result<(), ApiError>;

    /// `POST /api/auth/login` with a JSON credentials body.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the credentials are rejected or the call fails.
    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError>;

    /// `GET` or `POST /api/auth/logout`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on any non-success status or transport failure.
    async fn logout(&self) -> Result<(), ApiError>;

    /// `POST /api/auth/register`. A redirect answer counts as success.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the registration is rejected or the call fails.
    async fn register(&self, registration: &Registration) -> Result<(), ApiError>;
}

// =============================================================================
// HTTP IMPLEMENTATION
// =============================================================================

/// `reqwest`-backed session API with a cookie store.
#[derive(Clone, Debug)]
pub struct HttpSessionApi {
    client: reqwest::Client,
    endpoints: EndpointConfig,
}

impl HttpSessionApi {
    /// Build a client with cookies enabled and redirects disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(endpoints: EndpointConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = endpoints.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, endpoints })
    }

    /// Wrap an existing client. The caller is responsible for its cookie policy.
    #[must_use]
    pub fn with_client(client: reqwest::Client, endpoints: EndpointConfig) -> Self {
        Self { client, endpoints }
    }

    #[must_use]
    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }
}

#[async_trait::async_trait]
impl SessionApi for HttpSessionApi {
    async fn session(&self) -> Result<(), ApiError> {
        let url = self.endpoints.url(&self.endpoints.session_path);
        let resp = self.client.get(&url).send().await?;
        expect_accepted(resp, false).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let url = self.endpoints.url(&self.endpoints.login_path);
        let resp = self.client.post(&url).json(credentials).send().await?;
        expect_accepted(resp, false).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoints.url(&self.endpoints.logout_path);
        let request = match self.endpoints.logout_method {
            LogoutMethod::Get => self.client.get(&url),
            LogoutMethod::Post => self.client.post(&url),
        };
        let resp = request.send().await?;
        expect_accepted(resp, false).await
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let url = self.endpoints.url(&self.endpoints.register_path);
        let resp = self.client.post(&url).json(registration).send().await?;
        expect_accepted(resp, true).await
    }
}

pub(crate) fn is_accepted(status: StatusCode, allow_redirect: bool) -> bool {
    status.is_success() || (allow_redirect && status.is_redirection())
}

async fn expect_accepted(resp: reqwest::Response, allow_redirect: bool) -> Result<(), ApiError> {
    let status = resp.status();
    if is_accepted(status, allow_redirect) {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Status { status: status.as_u16(), message: status_message(status, &body) })
}
