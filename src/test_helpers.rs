//! Mock collaborators shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::error::ApiError;
use crate::navigation::Navigator;
use crate::net::api::SessionApi;
use crate::net::types::{Credentials, Registration};

pub fn unauthorized() -> ApiError {
    ApiError::Status { status: 401, message: "Unauthorized".into() }
}

pub fn server_error() -> ApiError {
    ApiError::Status { status: 500, message: "Internal Server Error".into() }
}

// =============================================================================
// MockApi
// =============================================================================

/// In-memory session service. A successful login opens the session, logout
/// closes it, and every endpoint can be forced to fail.
pub struct MockApi {
    session_ok: Mutex<bool>,
    session_error: Mutex<Option<ApiError>>,
    login_error: Mutex<Option<ApiError>>,
    logout_error: Mutex<Option<ApiError>>,
    register_error: Mutex<Option<ApiError>>,
    session_gate: Mutex<Option<Arc<Notify>>>,
    login_gate: Mutex<Option<Arc<Notify>>>,
    pub session_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub last_credentials: Mutex<Option<Credentials>>,
}

impl MockApi {
    /// No active session; every endpoint otherwise succeeds.
    pub fn new() -> Self {
        Self {
            session_ok: Mutex::new(false),
            session_error: Mutex::new(None),
            login_error: Mutex::new(None),
            logout_error: Mutex::new(None),
            register_error: Mutex::new(None),
            session_gate: Mutex::new(None),
            login_gate: Mutex::new(None),
            session_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            register_calls: AtomicUsize::new(0),
            last_credentials: Mutex::new(None),
        }
    }

    pub fn with_session() -> Self {
        let api = Self::new();
        api.set_session(true);
        api
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn set_session(&self, ok: bool) {
        *self.session_ok.lock().unwrap() = ok;
    }

    pub fn fail_session(&self, err: ApiError) {
        *self.session_error.lock().unwrap() = Some(err);
    }

    pub fn fail_login(&self, err: ApiError) {
        *self.login_error.lock().unwrap() = Some(err);
    }

    pub fn fail_logout(&self, err: ApiError) {
        *self.logout_error.lock().unwrap() = Some(err);
    }

    pub fn fail_register(&self, err: ApiError) {
        *self.register_error.lock().unwrap() = Some(err);
    }

    /// Hold every session call until the returned gate is notified.
    pub fn gate_session(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.session_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Hold every login call until the returned gate is notified. The
    /// session opens only after the gate is released.
    pub fn gate_login(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.login_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn session_calls(&self) -> usize {
        self.session_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SessionApi for MockApi {
    async fn session(&self) -> Result<(), ApiError> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.session_gate.lock().unwrap().clone();
        // Outcome is decided when the call starts, like a real request.
        let forced_error = self.session_error.lock().unwrap().clone();
        let session_ok = *self.session_ok.lock().unwrap();
        let outcome = match forced_error {
            Some(err) => Err(err),
            None if session_ok => Ok(()),
            None => Err(unauthorized()),
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        outcome
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_credentials.lock().unwrap() = Some(credentials.clone());
        let gate = self.login_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(err) = self.login_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.set_session(true);
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.logout_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.set_session(false);
        Ok(())
    }

    async fn register(&self, _registration: &Registration) -> Result<(), ApiError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        match self.register_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// =============================================================================
// RecordingNavigator
// =============================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    pub visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate_to(&self, path: &str) {
        self.visits.lock().unwrap().push(path.to_owned());
    }
}
