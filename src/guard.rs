//! Per-navigation route guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! The host router calls [`RouteGuard::before_each`] before every navigation
//! and applies the returned [`GuardDecision`]. The guard reads the shared
//! auth state and, when it says "logged out", awaits one session check
//! through the controller before deciding.
//!
//! DESIGN
//! ======
//! Each navigation runs `Evaluating -> Allowed | Redirecting(target)`. There
//! are no retries: a failed probe is final for that navigation. Server
//! rendering and hydration replay resolve `Allowed` immediately without a
//! probe, so cookies cross the render boundary untouched and a navigation
//! already rendered on the server is not probed twice.
//!
//! The opportunistic check keeps the state warm while logged out. It is
//! spawned, never awaited, and cannot change the decision of the navigation
//! that started it. On guarded routes it overlaps the guard's own probe;
//! whichever started last wins the state write.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use tokio::task::JoinHandle;

use crate::controller::{AuthController, SessionCheckOutcome};
use crate::navigation::Navigation;
use crate::routes::{RouteClassification, RouteTable};

/// Terminal outcome of a guarded navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Navigation proceeds unmodified.
    Allowed,
    /// Navigation is replaced by a redirect to `target`.
    Redirecting { target: String },
}

impl GuardDecision {
    fn redirect(target: &str) -> Self {
        Self::Redirecting { target: target.to_owned() }
    }

    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Allowed => None,
            Self::Redirecting { target } => Some(target),
        }
    }
}

/// Guard over a shared controller and a static route table.
#[derive(Clone, Debug)]
pub struct RouteGuard {
    controller: AuthController,
    routes: RouteTable,
}

impl RouteGuard {
    #[must_use]
    pub fn new(controller: AuthController, routes: RouteTable) -> Self {
        Self { controller, routes }
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn controller(&self) -> &AuthController {
        &self.controller
    }

    /// Global hook: opportunistic check, then the route guard.
    pub async fn before_each(&self, nav: &Navigation) -> GuardDecision {
        if !nav.phase.is_interactive() {
            tracing::debug!(to = %nav.to, phase = ?nav.phase, "guard skipped outside interactive client");
            return GuardDecision::Allowed;
        }
        let _ = self.opportunistic_check(nav);
        self.evaluate(nav).await
    }

    /// Route guard only. Awaits at most one session check.
    pub async fn evaluate(&self, nav: &Navigation) -> GuardDecision {
        if !nav.phase.is_interactive() {
            return GuardDecision::Allowed;
        }

        let classification = self.routes.classify(nav.path());
        tracing::debug!(to = %nav.to, ?classification, "guard evaluating");
        let config = self.controller.config();

        let decision = match classification {
            RouteClassification::Public => GuardDecision::Allowed,
            RouteClassification::Protected => {
                if self.controller.is_logged_in() || self.controller.check_session().await.valid {
                    GuardDecision::Allowed
                } else {
                    GuardDecision::redirect(&config.login_url)
                }
            }
            RouteClassification::PreLoginOnly => {
                if self.controller.is_logged_in() || self.controller.check_session().await.valid {
                    GuardDecision::redirect(&config.home_url)
                } else {
                    GuardDecision::Allowed
                }
            }
        };

        let decision = match decision {
            GuardDecision::Redirecting { target } if target == nav.path() => {
                tracing::warn!(to = %nav.to, "redirect target equals destination; allowing");
                GuardDecision::Allowed
            }
            other => other,
        };
        match &decision {
            GuardDecision::Allowed => tracing::debug!(to = %nav.to, "guard allowed"),
            GuardDecision::Redirecting { target } => tracing::debug!(to = %nav.to, %target, "guard redirecting"),
        }
        decision
    }

    /// Fire-and-forget session check for logged-out visitors. Returns the
    /// spawned task, if any.
    pub fn opportunistic_check(&self, nav: &Navigation) -> Option<JoinHandle<SessionCheckOutcome>> {
        if !self.controller.config().opportunistic_check
            || !nav.phase.is_interactive()
            || self.controller.is_logged_in()
        {
            return None;
        }
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        tracing::debug!(to = %nav.to, "opportunistic session check");
        let controller = self.controller.clone();
        Some(runtime.spawn(async move { controller.check_session().await }))
    }
}
