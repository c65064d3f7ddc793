//! Controller, guard, and endpoint configuration.
//!
//! DESIGN
//! ======
//! Earlier client variants disagreed on option names (`autoLogin` vs
//! `checkInitial`) and on which hooks existed. `AuthConfig` is the single
//! option set; both legacy names deserialize into `check_on_init`, and the
//! "composable" and "guard" variants are just [`AuthConfig::composable`] and
//! [`AuthConfig::guard`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

pub const DEFAULT_LOGIN_URL: &str = "/login";
pub const DEFAULT_LOGOUT_URL: &str = "/login";
pub const DEFAULT_HOME_URL: &str = "/home";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

pub const SESSION_PATH: &str = "/api/auth/session";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const REGISTER_PATH: &str = "/api/auth/register";

/// Parse a boolean environment variable (`1/true/yes/on`, `0/false/no/off`).
pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// AUTH CONFIG
// =============================================================================

/// Behavior options for [`crate::controller::AuthController`] and
/// [`crate::guard::RouteGuard`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthConfig {
    /// Probe the session endpoint in the background when the controller is built.
    #[serde(alias = "autoLogin", alias = "checkInitial")]
    pub check_on_init: bool,
    /// Navigation target after logout, whatever the endpoint said.
    pub logout_url: String,
    /// Redirect target for protected routes when the session is invalid.
    pub login_url: String,
    /// Redirect target for pre-login-only routes when the session is valid.
    pub home_url: String,
    /// Fire-and-forget session check on every navigation while logged out.
    pub opportunistic_check: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            check_on_init: true,
            logout_url: DEFAULT_LOGOUT_URL.to_owned(),
            login_url: DEFAULT_LOGIN_URL.to_owned(),
            home_url: DEFAULT_HOME_URL.to_owned(),
            opportunistic_check: true,
        }
    }
}

impl AuthConfig {
    /// Page-level usage: check the session as soon as the controller exists.
    #[must_use]
    pub fn composable() -> Self {
        Self::default()
    }

    /// Guard-level usage: the guard decides when to probe.
    #[must_use]
    pub fn guard() -> Self {
        Self { check_on_init: false, ..Self::default() }
    }

    #[must_use]
    pub fn with_check_on_init(mut self, enabled: bool) -> Self {
        self.check_on_init = enabled;
        self
    }

    #[must_use]
    pub fn with_logout_url(mut self, url: impl Into<String>) -> Self {
        self.logout_url = url.into();
        self
    }

    /// Build from environment variables, falling back to defaults.
    ///
    /// - `SESSION_CHECK_ON_INIT`: bool, default true
    /// - `SESSION_OPPORTUNISTIC_CHECK`: bool, default true
    /// - `SESSION_LOGIN_URL`, `SESSION_LOGOUT_URL`, `SESSION_HOME_URL`
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            check_on_init: env_bool("SESSION_CHECK_ON_INIT").unwrap_or(defaults.check_on_init),
            logout_url: env_string("SESSION_LOGOUT_URL").unwrap_or(defaults.logout_url),
            login_url: env_string("SESSION_LOGIN_URL").unwrap_or(defaults.login_url),
            home_url: env_string("SESSION_HOME_URL").unwrap_or(defaults.home_url),
            opportunistic_check: env_bool("SESSION_OPPORTUNISTIC_CHECK").unwrap_or(defaults.opportunistic_check),
        }
    }
}

// =============================================================================
// ENDPOINT CONFIG
// =============================================================================

/// HTTP verb used for the logout endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogoutMethod {
    #[default]
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported logout method `{0}`; expected GET or POST")]
pub struct InvalidLogoutMethod(pub String);

impl FromStr for LogoutMethod {
    type Err = InvalidLogoutMethod;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            _ => Err(InvalidLogoutMethod(raw.trim().to_owned())),
        }
    }
}

/// Where the session service lives and how to talk to it.
///
/// Deserializes from camelCase keys; missing keys take the defaults and the
/// timeout is given as `timeoutSecs` (0 or absent means none).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointConfig {
    pub base_url: String,
    pub session_path: String,
    pub login_path: String,
    pub logout_path: String,
    pub register_path: String,
    pub logout_method: LogoutMethod,
    #[serde(rename = "timeoutSecs", deserialize_with = "timeout_from_secs")]
    pub timeout: Option<Duration>,
}

fn timeout_from_secs<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = Option::<u64>::deserialize(deserializer)?;
    Ok(secs.filter(|s| *s > 0).map(Duration::from_secs))
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl EndpointConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            session_path: SESSION_PATH.to_owned(),
            login_path: LOGIN_PATH.to_owned(),
            logout_path: LOGOUT_PATH.to_owned(),
            register_path: REGISTER_PATH.to_owned(),
            logout_method: LogoutMethod::Get,
            timeout: None,
        }
    }

    /// Build from environment variables.
    ///
    /// - `SESSION_BASE_URL`: default `http://127.0.0.1:3000`
    /// - `SESSION_LOGOUT_METHOD`: `GET` (default) or `POST`; anything else
    ///   logs a warning and keeps `GET`
    /// - `SESSION_TIMEOUT_SECS`: request timeout, unset means none
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::new(env_string("SESSION_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()));
        config.logout_method = logout_method_or_default(env_string("SESSION_LOGOUT_METHOD").as_deref());
        config.timeout = env_string("SESSION_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        config
    }

    /// Absolute URL for an endpoint path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

pub(crate) fn logout_method_or_default(raw: Option<&str>) -> LogoutMethod {
    match raw.map(str::parse::<LogoutMethod>) {
        None => LogoutMethod::default(),
        Some(Ok(method)) => method,
        Some(Err(e)) => {
            tracing::warn!(error = %e, "ignoring SESSION_LOGOUT_METHOD; using GET");
            LogoutMethod::default()
        }
    }
}
