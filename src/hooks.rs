//! Login and error hooks.
//!
//! Hooks are level-triggered on auth state transitions, not on the operation
//! that caused them: `on_login` runs whenever a committed write flips
//! `is_logged_in` from false to true (login or a session check), and
//! `on_error` runs whenever an operation installs a new `last_error`.
//! Registration returns a [`Subscription`].

#[cfg(test)]
#[path = "hooks_test.rs"]
mod hooks_test;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::AuthError;
use crate::state::Subscription;

type LoginHook = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;
type ErrorHook = Arc<dyn Fn(&AuthError) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    on_login: Vec<(u64, LoginHook)>,
    on_error: Vec<(u64, ErrorHook)>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Hook registry owned by a controller.
#[derive(Clone, Default)]
pub struct Hooks {
    registry: Arc<Mutex<Registry>>,
}

impl Hooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async callback awaited after every false→true login transition.
    pub fn on_login<F, Fut>(&self, hook: F) -> Subscription
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let hook: LoginHook = Arc::new(move || hook().boxed());
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.on_login.push((id, hook));
            id
        };
        let registry = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).on_login.retain(|(hid, _)| *hid != id);
            }
        })
    }

    /// Register a callback invoked with every newly recorded error.
    pub fn on_error<F>(&self, hook: F) -> Subscription
    where
        F: Fn(&AuthError) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.on_error.push((id, Arc::new(hook)));
            id
        };
        let registry = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).on_error.retain(|(hid, _)| *hid != id);
            }
        })
    }

    pub(crate) async fn fire_login(&self) {
        let hooks: Vec<LoginHook> = lock(&self.registry).on_login.iter().map(|(_, h)| Arc::clone(h)).collect();
        for hook in hooks {
            hook().await;
        }
    }

    pub(crate) fn fire_error(&self, err: &AuthError) {
        let hooks: Vec<ErrorHook> = lock(&self.registry).on_error.iter().map(|(_, h)| Arc::clone(h)).collect();
        for hook in hooks {
            hook(err);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        let registry = lock(&self.registry);
        registry.on_login.len() + registry.on_error.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = lock(&self.registry);
        f.debug_struct("Hooks")
            .field("on_login", &registry.on_login.len())
            .field("on_error", &registry.on_error.len())
            .finish()
    }
}
