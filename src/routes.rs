//! Static route classification.
//!
//! A route is protected, pre-login-only, or public. Classification is not
//! stored per navigation; the guard asks the table every time.
//!
//! Patterns are exact paths (`/login`) or prefixes ending in `/*`
//! (`/recipes/*` matches `/recipes` and everything below it). Rules are
//! checked in insertion order and the first match wins.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use serde::Deserialize;

use crate::config::AuthConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClassification {
    /// Requires a valid session.
    Protected,
    /// Only for visitors without a session (e.g. the login page).
    PreLoginOnly,
    #[default]
    Public,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RouteRule {
    pub pattern: String,
    pub classification: RouteClassification,
}

impl RouteRule {
    fn matches(&self, path: &str) -> bool {
        let path = normalize(path);
        match self.pattern.strip_suffix("/*") {
            Some(base) => {
                let base = normalize(base);
                base == "/" || path == base || path.strip_prefix(base).is_some_and(|rest| rest.starts_with('/'))
            }
            None => path == normalize(&self.pattern),
        }
    }
}

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Ordered route rules with a fallback classification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    rules: Vec<RouteRule>,
    #[serde(default)]
    fallback: RouteClassification,
}

impl RouteTable {
    /// Empty table; everything is public.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Login page pre-login-only, home page protected, rest public.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new().pre_login_only(&config.login_url).protected(&config.home_url)
    }

    #[must_use]
    pub fn route(mut self, pattern: &str, classification: RouteClassification) -> Self {
        self.rules.push(RouteRule { pattern: pattern.to_owned(), classification });
        self
    }

    #[must_use]
    pub fn protected(self, pattern: &str) -> Self {
        self.route(pattern, RouteClassification::Protected)
    }

    #[must_use]
    pub fn pre_login_only(self, pattern: &str) -> Self {
        self.route(pattern, RouteClassification::PreLoginOnly)
    }

    #[must_use]
    pub fn public(self, pattern: &str) -> Self {
        self.route(pattern, RouteClassification::Public)
    }

    #[must_use]
    pub fn with_fallback(mut self, classification: RouteClassification) -> Self {
        self.fallback = classification;
        self
    }

    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClassification {
        self.rules
            .iter()
            .find(|rule| rule.matches(path))
            .map_or(self.fallback, |rule| rule.classification)
    }

    #[must_use]
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}
