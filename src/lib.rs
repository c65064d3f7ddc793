//! Cookie-session authentication state for a web client.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server owns the session (an HttpOnly cookie). This crate keeps the
//! client's view of it: one shared [`AuthState`], one [`AuthController`] that
//! logs in, logs out, registers, and probes the session endpoint, and a
//! [`RouteGuard`] that the host router consults before every navigation.
//!
//! ```text
//! RouteGuard ──check_session──▶ AuthController ──▶ SessionApi (HTTP)
//!      │                              │
//!      └────────── reads ─────────▶ AuthState ◀── observers
//! ```
//!
//! Network code sits behind the [`SessionApi`] trait and navigation behind
//! [`Navigator`], so the core runs against mocks in tests and against
//! [`HttpSessionApi`] in the CLI.

pub mod config;
pub mod controller;
pub mod error;
pub mod guard;
pub mod hooks;
pub mod loader;
pub mod navigation;
pub mod net;
pub mod probe;
pub mod routes;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::{AuthConfig, EndpointConfig, InvalidLogoutMethod, LogoutMethod};
pub use controller::{AuthController, AuthControllerBuilder, SessionCheckOutcome};
pub use error::{ApiError, AuthError, ErrorInfo, ErrorKind, ProbeError};
pub use guard::{GuardDecision, RouteGuard};
pub use navigation::{Navigation, Navigator, RenderPhase};
pub use net::api::{HttpSessionApi, SessionApi};
pub use net::types::{Credentials, Registration};
pub use routes::{RouteClassification, RouteTable};
pub use state::{AuthSnapshot, AuthState, Subscription};
