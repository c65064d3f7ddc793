//! Auth-session state for the current session context.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `AuthState` exists per session context (browser tab, CLI process).
//! It is created at app start and injected into the controller and the route
//! guard; nothing reaches it through a global. Readers are unrestricted, only
//! the controller writes.
//!
//! DESIGN
//! ======
//! Only writes to `is_logged_in` are ordered. A session check takes a
//! [`WriteTicket`] when it starts and commits only if no later ticket has
//! committed already. Login success and logout are facts known when their
//! response arrives, so [`AuthState::commit_latest`] takes the ticket at that
//! point: every check still in flight becomes stale. Writes that only touch
//! `last_error` go through [`AuthState::set_last_error`] and never invalidate
//! anything.
//!
//! Observers are dispatched outside the data lock (they may call
//! [`AuthState::read`]) but under a dispatch lock, so each observer sees every
//! transition in commit order.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::error::AuthError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Point-in-time view of the auth state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub is_logged_in: bool,
    pub last_error: Option<AuthError>,
}

/// Before/after pair produced by an applied write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub before: AuthSnapshot,
    pub after: AuthSnapshot,
}

impl Transition {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.before != self.after
    }

    /// `is_logged_in` went from false to true.
    #[must_use]
    pub fn became_logged_in(&self) -> bool {
        !self.before.is_logged_in && self.after.is_logged_in
    }
}

/// Outcome of a ticketed write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Commit {
    Applied(Transition),
    /// A later-started operation already committed; the write was dropped.
    Stale,
}

/// Sequence number taken when an operation starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct WriteTicket(u64);

impl WriteTicket {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Handle returned by observer and hook registration.
///
/// Dropping it unsubscribes; call [`Subscription::detach`] to keep the
/// registration for the lifetime of its owner.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// Remove the registration now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the registration alive without holding the handle.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.cancel.is_some()).finish()
    }
}

// =============================================================================
// AUTH STATE
// =============================================================================

type Observer = Arc<dyn Fn(&AuthSnapshot) + Send + Sync>;

struct Inner {
    snapshot: AuthSnapshot,
    last_ticket: u64,
    committed_ticket: u64,
    next_observer_id: u64,
    observers: Vec<(u64, Observer)>,
}

/// Observable `{is_logged_in, last_error}` cell shared by controller and guard.
pub struct AuthState {
    inner: Mutex<Inner>,
    dispatch: Mutex<()>,
}

impl AuthState {
    /// Logged out, no error.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                snapshot: AuthSnapshot::default(),
                last_ticket: 0,
                committed_ticket: 0,
                next_observer_id: 0,
                observers: Vec::new(),
            }),
            dispatch: Mutex::new(()),
        }
    }

    /// Convenience for the usual `Arc`-shared instance.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Current snapshot. Never blocks on in-flight network calls.
    #[must_use]
    pub fn read(&self) -> AuthSnapshot {
        lock(&self.inner).snapshot.clone()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        lock(&self.inner).snapshot.is_logged_in
    }

    /// Register an observer called with the new snapshot after every change.
    pub fn subscribe<F>(self: &Arc<Self>, observer: F) -> Subscription
    where
        F: Fn(&AuthSnapshot) + Send + Sync + 'static,
    {
        let id = {
            let mut inner = lock(&self.inner);
            let id = inner.next_observer_id;
            inner.next_observer_id += 1;
            inner.observers.push((id, Arc::new(observer)));
            id
        };
        let weak: Weak<Self> = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                lock(&state.inner).observers.retain(|(oid, _)| *oid != id);
            }
        })
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        lock(&self.inner).observers.len()
    }

    /// Take a ticket for an operation that is about to start.
    pub(crate) fn begin(&self) -> WriteTicket {
        let mut inner = lock(&self.inner);
        inner.last_ticket += 1;
        WriteTicket(inner.last_ticket)
    }

    /// Apply `update` unless a later ticket already committed.
    pub(crate) fn commit<F>(&self, ticket: WriteTicket, update: F) -> Commit
    where
        F: FnOnce(&mut AuthSnapshot),
    {
        let _dispatch = lock(&self.dispatch);
        let mut inner = lock(&self.inner);
        if ticket.0 <= inner.committed_ticket {
            tracing::debug!(
                ticket = ticket.0,
                committed = inner.committed_ticket,
                "discarding stale auth state write"
            );
            return Commit::Stale;
        }
        inner.committed_ticket = ticket.0;
        Commit::Applied(Self::apply_and_notify(inner, update))
    }

    /// Apply `update` under a fresh ticket, superseding every ticket taken
    /// before. Never stale.
    pub(crate) fn commit_latest<F>(&self, update: F) -> Transition
    where
        F: FnOnce(&mut AuthSnapshot),
    {
        let _dispatch = lock(&self.dispatch);
        let mut inner = lock(&self.inner);
        inner.last_ticket += 1;
        inner.committed_ticket = inner.last_ticket;
        Self::apply_and_notify(inner, update)
    }

    /// Replace `last_error` without touching ticket order.
    pub(crate) fn set_last_error(&self, err: Option<AuthError>) -> Transition {
        let _dispatch = lock(&self.dispatch);
        let inner = lock(&self.inner);
        Self::apply_and_notify(inner, |s| s.last_error = err)
    }

    /// Caller holds the dispatch lock for the whole call.
    fn apply_and_notify<F>(mut inner: MutexGuard<'_, Inner>, update: F) -> Transition
    where
        F: FnOnce(&mut AuthSnapshot),
    {
        let before = inner.snapshot.clone();
        update(&mut inner.snapshot);
        let transition = Transition { before, after: inner.snapshot.clone() };
        let observers: Vec<Observer> = if transition.changed() {
            inner.observers.iter().map(|(_, o)| Arc::clone(o)).collect()
        } else {
            Vec::new()
        };
        drop(inner);

        for observer in observers {
            observer(&transition.after);
        }
        transition
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState").field("snapshot", &self.read()).finish_non_exhaustive()
    }
}
