//! Navigation primitive consumed by the controller and described to the guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! The host router owns navigation. The controller only issues imperative
//! `navigate_to` calls (after logout and registration); the guard returns a
//! decision that the router applies, so a redirect short-circuits the
//! in-progress navigation instead of racing it.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

/// Imperative target change, e.g. a client-side router push.
#[async_trait::async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate_to(&self, path: &str);
}

/// Where the navigation is being evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderPhase {
    /// Server rendering. Cookies must cross the render boundary untouched,
    /// so guards never probe here.
    Server,
    /// Client replay of a navigation the server already rendered.
    Hydrating,
    /// Interactive client navigation.
    #[default]
    Client,
}

impl RenderPhase {
    /// Guards only run for interactive client navigations.
    #[must_use]
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Client)
    }
}

/// A navigation attempt handed to the guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub to: String,
    pub from: Option<String>,
    pub phase: RenderPhase,
}

impl Navigation {
    /// Interactive client navigation to `to`.
    #[must_use]
    pub fn client(to: impl Into<String>) -> Self {
        Self { to: to.into(), from: None, phase: RenderPhase::Client }
    }

    #[must_use]
    pub fn from_path(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    #[must_use]
    pub fn in_phase(mut self, phase: RenderPhase) -> Self {
        self.phase = phase;
        self
    }

    /// Target path without query string or fragment.
    #[must_use]
    pub fn path(&self) -> &str {
        let end = self.to.find(['?', '#']).unwrap_or(self.to.len());
        &self.to[..end]
    }
}
