//! Login, logout, registration, and session checks.
//!
//! SYSTEM CONTEXT
//! ==============
//! The controller is the only writer of [`AuthState`]. Route guards call
//! [`AuthController::check_session`]; UI code calls `login` / `logout` /
//! `register` directly. Network failures stop here: they become state,
//! hook calls, and a `Result` for the direct caller, never a panic.
//!
//! DESIGN
//! ======
//! A session check takes a write ticket before its network call and its
//! result is dropped if a later ticket committed first. Login success and
//! logout commit under a ticket taken when their response arrives, so they
//! always land and supersede every check still in flight. Failures only
//! record `last_error`, which is not ordered against anything.
//!
//! TRADE-OFFS
//! ==========
//! A failed login leaves `is_logged_in` untouched: a bad re-login attempt
//! must not end a session that is still valid on the server.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::hooks::Hooks;
use crate::loader::Loader;
use crate::navigation::Navigator;
use crate::net::api::SessionApi;
use crate::net::types::{Credentials, Registration};
use crate::probe::SessionProbe;
use crate::state::{AuthSnapshot, AuthState, Commit, Subscription, Transition};

/// Result of [`AuthController::check_session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionCheckOutcome {
    pub valid: bool,
}

impl SessionCheckOutcome {
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.valid
    }
}

struct Inner {
    state: Arc<AuthState>,
    api: Arc<dyn SessionApi>,
    probe: SessionProbe,
    navigator: Arc<dyn Navigator>,
    config: AuthConfig,
    hooks: Hooks,
    loader: Loader,
    initial_check: Mutex<Option<JoinHandle<SessionCheckOutcome>>>,
}

/// Single canonical auth controller. Cheap to clone; clones share everything.
#[derive(Clone)]
pub struct AuthController {
    inner: Arc<Inner>,
}

impl AuthController {
    /// Build a controller over an injected state.
    ///
    /// With `check_on_init` the session check is spawned on the current Tokio
    /// runtime and construction returns immediately; outside a runtime the
    /// check is skipped with a warning. Construction never navigates.
    pub fn new(
        state: Arc<AuthState>,
        api: Arc<dyn SessionApi>,
        navigator: Arc<dyn Navigator>,
        config: AuthConfig,
    ) -> Self {
        Self::from_parts(state, api, navigator, config, Hooks::new())
    }

    /// Start a builder; hooks registered on it can already fire for the
    /// initial check.
    pub fn builder(api: Arc<dyn SessionApi>, navigator: Arc<dyn Navigator>) -> AuthControllerBuilder {
        AuthControllerBuilder { state: None, api, navigator, config: AuthConfig::default(), hooks: Hooks::new() }
    }

    fn from_parts(
        state: Arc<AuthState>,
        api: Arc<dyn SessionApi>,
        navigator: Arc<dyn Navigator>,
        config: AuthConfig,
        hooks: Hooks,
    ) -> Self {
        let check_on_init = config.check_on_init;
        let controller = Self {
            inner: Arc::new(Inner {
                state,
                probe: SessionProbe::new(Arc::clone(&api)),
                api,
                navigator,
                config,
                hooks,
                loader: Loader::new(),
                initial_check: Mutex::new(None),
            }),
        };
        if check_on_init {
            controller.spawn_initial_check();
        }
        controller
    }

    fn spawn_initial_check(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no tokio runtime; skipping initial session check");
            return;
        };
        tracing::debug!("spawning initial session check");
        let controller = self.clone();
        let handle = runtime.spawn(async move { controller.check_session().await });
        *self.inner.initial_check.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Wait for the background check started at construction, if any.
    ///
    /// Returns `None` when no check was started or it was already awaited.
    pub async fn initial_check(&self) -> Option<SessionCheckOutcome> {
        let handle = self.inner.initial_check.lock().unwrap_or_else(PoisonError::into_inner).take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!(error = %e, "initial session check did not complete");
                None
            }
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn state(&self) -> &Arc<AuthState> {
        &self.inner.state
    }

    #[must_use]
    pub fn read(&self) -> AuthSnapshot {
        self.inner.state.read()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.inner.state.is_logged_in()
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.inner.config
    }

    /// True while a login, logout, or registration call is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inner.loader.is_loading()
    }

    /// See [`Hooks::on_login`].
    pub fn on_login<F, Fut>(&self, hook: F) -> Subscription
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.hooks.on_login(hook)
    }

    /// See [`Hooks::on_error`].
    pub fn on_error<F>(&self, hook: F) -> Subscription
    where
        F: Fn(&AuthError) + Send + Sync + 'static,
    {
        self.inner.hooks.on_error(hook)
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Post credentials to the login endpoint.
    ///
    /// On success the state becomes logged in with no error and login hooks
    /// run before this future resolves. On failure only `last_error` changes.
    ///
    /// # Errors
    ///
    /// Returns the classified [`AuthError`] when the endpoint rejects the
    /// credentials or cannot be reached.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let credentials = Credentials::new(username, password);
        let result = self.inner.loader.run(self.inner.api.login(&credentials)).await;

        match result {
            Ok(()) => {
                tracing::info!(%username, "login succeeded");
                let transition = self.inner.state.commit_latest(|s| {
                    s.is_logged_in = true;
                    s.last_error = None;
                });
                self.after_transition(&transition).await;
                Ok(())
            }
            Err(e) => {
                let err = AuthError::from(e);
                tracing::warn!(%username, kind = %err.kind, status = ?err.http_status, "login failed");
                self.record_error(&err);
                Err(err)
            }
        }
    }

    /// Call the logout endpoint, then deauthenticate locally and navigate to
    /// `logout_url` whatever the endpoint answered.
    ///
    /// # Errors
    ///
    /// Returns the endpoint failure after the local logout and navigation
    /// have already happened.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let result = self.inner.loader.run(self.inner.api.logout()).await;
        let err = result.err().map(AuthError::from);

        self.inner.state.commit_latest(|s| {
            s.is_logged_in = false;
            s.last_error.clone_from(&err);
        });
        match &err {
            None => tracing::info!("logout succeeded"),
            Some(err) => {
                tracing::warn!(kind = %err.kind, status = ?err.http_status, "logout endpoint failed; logged out locally");
                self.inner.hooks.fire_error(err);
            }
        }

        self.inner.navigator.navigate_to(&self.inner.config.logout_url).await;
        err.map_or(Ok(()), Err)
    }

    /// Probe the session endpoint and record the answer.
    ///
    /// Never fails: any probe failure means "not logged in". If a newer
    /// operation committed while the probe was in flight, the probe result
    /// is dropped and the committed state is reported instead.
    pub async fn check_session(&self) -> SessionCheckOutcome {
        let ticket = self.inner.state.begin();
        let valid = self.inner.probe.probe().await.is_ok();

        let commit = if valid {
            self.inner.state.commit(ticket, |s| {
                s.is_logged_in = true;
                s.last_error = None;
            })
        } else {
            self.inner.state.commit(ticket, |s| s.is_logged_in = false)
        };

        match commit {
            Commit::Applied(transition) => {
                self.after_transition(&transition).await;
                SessionCheckOutcome { valid }
            }
            Commit::Stale => {
                tracing::debug!(valid, "session check superseded by a newer write");
                SessionCheckOutcome { valid: self.is_logged_in() }
            }
        }
    }

    /// Create an account. The server answers with a redirect to the login
    /// page, which counts as success; the user is not logged in by this call.
    ///
    /// # Errors
    ///
    /// Returns the classified [`AuthError`] when the endpoint rejects the
    /// registration or cannot be reached.
    pub async fn register(&self, username: &str, password: &str, password_confirm: &str) -> Result<(), AuthError> {
        let registration = Registration::new(username, password, password_confirm);
        let result = self.inner.loader.run(self.inner.api.register(&registration)).await;

        match result {
            Ok(()) => {
                tracing::info!(%username, "registration succeeded");
                // Error-only write: unordered, so there is no stale case to handle.
                self.inner.state.set_last_error(None);
                self.inner.navigator.navigate_to(&self.inner.config.login_url).await;
                Ok(())
            }
            Err(e) => {
                let err = AuthError::from(e);
                tracing::warn!(%username, kind = %err.kind, status = ?err.http_status, "registration failed");
                self.record_error(&err);
                Err(err)
            }
        }
    }

    async fn after_transition(&self, transition: &Transition) {
        if transition.became_logged_in() {
            self.inner.hooks.fire_login().await;
        }
    }

    fn record_error(&self, err: &AuthError) {
        self.inner.state.set_last_error(Some(err.clone()));
        self.inner.hooks.fire_error(err);
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Collects state, config, and hooks before the controller (and its initial
/// check) starts.
pub struct AuthControllerBuilder {
    state: Option<Arc<AuthState>>,
    api: Arc<dyn SessionApi>,
    navigator: Arc<dyn Navigator>,
    config: AuthConfig,
    hooks: Hooks,
}

impl AuthControllerBuilder {
    /// Share an existing state. Without it the controller creates its own.
    #[must_use]
    pub fn state(mut self, state: Arc<AuthState>) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub fn config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    /// Login hook living as long as the controller.
    #[must_use]
    pub fn on_login<F, Fut>(self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.hooks.on_login(hook).detach();
        self
    }

    /// Error hook living as long as the controller.
    #[must_use]
    pub fn on_error<F>(self, hook: F) -> Self
    where
        F: Fn(&AuthError) + Send + Sync + 'static,
    {
        self.hooks.on_error(hook).detach();
        self
    }

    pub fn build(self) -> AuthController {
        let state = self.state.unwrap_or_else(AuthState::shared);
        AuthController::from_parts(state, self.api, self.navigator, self.config, self.hooks)
    }
}

impl std::fmt::Debug for AuthController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthController")
            .field("state", &self.inner.state.read())
            .field("config", &self.inner.config)
            .field("hooks", &self.inner.hooks)
            .finish_non_exhaustive()
    }
}
