//! Session cookie forwarding across the server-render boundary.
//!
//! SYSTEM CONTEXT
//! ==============
//! During server rendering the browser talks to the render server, not to
//! the session service. Calls proxied from a render handler must carry the
//! browser's `Cookie` header upstream, and every upstream `Set-Cookie` must
//! reach the browser unmodified.
//!
//! TRADE-OFFS
//! ==========
//! `Set-Cookie` values are kept as separate header lines. Joining them, or
//! splitting a joined value on commas, corrupts cookies whose `Expires`
//! attribute contains a comma.

#[cfg(test)]
#[path = "ssr_test.rs"]
mod ssr_test;

use std::convert::Infallible;

use axum::body::Bytes;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponseParts, ResponseParts};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// `Set-Cookie` values captured from an upstream response, in order.
///
/// Return it from an axum handler (e.g. `(cookies, body)`) to re-emit them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForwardedCookies(Vec<HeaderValue>);

impl ForwardedCookies {
    /// Capture every `Set-Cookie` line of an upstream response.
    #[must_use]
    pub fn from_upstream(headers: &HeaderMap) -> Self {
        Self(headers.get_all(SET_COOKIE).iter().cloned().collect())
    }

    /// Build from raw `Set-Cookie` strings, one per line.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidHeader`] if a value is not a valid header.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .map(|line| HeaderValue::from_str(line.as_ref()).map_err(ApiError::from))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderValue> {
        self.0.iter()
    }

    /// Append each captured cookie as its own `Set-Cookie` line.
    pub fn apply_to(&self, headers: &mut HeaderMap) {
        for value in &self.0 {
            headers.append(SET_COOKIE, value.clone());
        }
    }
}

impl IntoResponseParts for ForwardedCookies {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.apply_to(res.headers_mut());
        Ok(res)
    }
}

/// Upstream answer of a proxied call.
#[derive(Debug)]
pub struct ProxiedResponse {
    pub status: StatusCode,
    pub body: Bytes,
    pub cookies: ForwardedCookies,
}

impl ProxiedResponse {
    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Proxy a call to the session service on behalf of an incoming request.
///
/// The incoming `Cookie` lines are sent upstream; the upstream `Set-Cookie`
/// lines are captured in [`ProxiedResponse::cookies`]. Non-success statuses
/// are returned, not converted to errors, so the render handler can relay
/// them. Use a client without a cookie store: cookies here belong to the
/// browser, not to the render server.
///
/// # Errors
///
/// Returns [`ApiError::Network`] if the upstream call fails and
/// [`ApiError::Decode`] if its body cannot be read.
pub async fn fetch_with_cookie(
    client: &reqwest::Client,
    incoming: &HeaderMap,
    method: Method,
    url: &str,
    body: Option<&serde_json::Value>,
) -> Result<ProxiedResponse, ApiError> {
    let mut request = client.request(method, url);
    for cookie in incoming.get_all(COOKIE) {
        request = request.header(COOKIE, cookie.clone());
    }
    if let Some(body) = body {
        request = request.json(body);
    }

    let resp = request.send().await?;
    let status = resp.status();
    let cookies = ForwardedCookies::from_upstream(resp.headers());
    tracing::debug!(%url, status = status.as_u16(), cookies = cookies.len(), "proxied session call");
    let body = resp.bytes().await.map_err(|e| ApiError::Decode(e.to_string()))?;

    Ok(ProxiedResponse { status, body, cookies })
}
