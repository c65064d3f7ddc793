//! Read-only "who am I" check against the session endpoint.
//!
//! The probe has no side effects beyond the network call; interpreting the
//! result (and writing state) is the controller's job.

#[cfg(test)]
#[path = "probe_test.rs"]
mod probe_test;

use std::sync::Arc;

use crate::error::ProbeError;
use crate::net::api::SessionApi;

/// Wraps [`SessionApi::session`] with probe semantics.
#[derive(Clone)]
pub struct SessionProbe {
    api: Arc<dyn SessionApi>,
}

impl SessionProbe {
    #[must_use]
    pub fn new(api: Arc<dyn SessionApi>) -> Self {
        Self { api }
    }

    /// Ok iff the server confirms an active session.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] for any non-success status or network failure.
    pub async fn probe(&self) -> Result<(), ProbeError> {
        match self.api.session().await {
            Ok(()) => {
                tracing::debug!("session probe succeeded");
                Ok(())
            }
            Err(e) => {
                let err = ProbeError::from(e);
                tracing::debug!(status = ?err.http_status, error = %err.message, "session probe failed");
                Err(err)
            }
        }
    }
}
