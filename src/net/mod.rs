//! Networking seam between the auth core and the session service.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` defines the [`api::SessionApi`] contract and its `reqwest`
//! implementation, `types` holds the request bodies, and `ssr` forwards
//! session cookies across the server-render boundary.

pub mod api;
pub mod ssr;
pub mod types;
