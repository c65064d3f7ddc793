use super::*;
use axum::response::IntoResponse;

fn upstream_headers(cookies: &[&'static str]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for cookie in cookies {
        headers.append(SET_COOKIE, HeaderValue::from_static(cookie));
    }
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    headers
}

// =============================================================================
// ForwardedCookies
// =============================================================================

#[test]
fn captures_every_set_cookie_line() {
    let cookies = ForwardedCookies::from_upstream(&upstream_headers(&["a=1; Path=/", "b=2; HttpOnly"]));
    assert_eq!(cookies.len(), 2);
    let values: Vec<_> = cookies.iter().map(|v| v.to_str().unwrap()).collect();
    assert_eq!(values, vec!["a=1; Path=/", "b=2; HttpOnly"]);
}

#[test]
fn comma_in_expires_is_not_split() {
    let raw = "session=abc; Expires=Wed, 21 Oct 2026 07:28:00 GMT; Path=/";
    let cookies = ForwardedCookies::from_upstream(&upstream_headers(&[raw, "theme=dark"]));
    let mut out = HeaderMap::new();
    cookies.apply_to(&mut out);

    let lines: Vec<_> = out.get_all(SET_COOKIE).iter().map(|v| v.to_str().unwrap()).collect();
    assert_eq!(lines, vec![raw, "theme=dark"]);
}

#[test]
fn apply_appends_without_replacing_existing_cookies() {
    let cookies = ForwardedCookies::from_upstream(&upstream_headers(&["a=1"]));
    let mut out = HeaderMap::new();
    out.append(SET_COOKIE, HeaderValue::from_static("local=1"));
    cookies.apply_to(&mut out);
    assert_eq!(out.get_all(SET_COOKIE).iter().count(), 2);
}

#[test]
fn no_set_cookie_is_empty() {
    let cookies = ForwardedCookies::from_upstream(&upstream_headers(&[]));
    assert!(cookies.is_empty());
}

#[test]
fn into_response_parts_emits_separate_lines() {
    let cookies = ForwardedCookies::from_upstream(&upstream_headers(&["a=1", "b=2", "c=3"]));
    let response = (cookies, "ok").into_response();
    assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 3);
}

// =============================================================================
// ProxiedResponse
// =============================================================================

#[test]
fn proxied_response_decodes_json_body() {
    let resp = ProxiedResponse {
        status: StatusCode::OK,
        body: Bytes::from_static(br#"{"id":7}"#),
        cookies: ForwardedCookies::default(),
    };
    let value: serde_json::Value = resp.json().unwrap();
    assert_eq!(value["id"], 7);
}

#[test]
fn proxied_response_rejects_invalid_json() {
    let resp = ProxiedResponse {
        status: StatusCode::OK,
        body: Bytes::from_static(b"not json"),
        cookies: ForwardedCookies::default(),
    };
    assert!(matches!(resp.json::<serde_json::Value>(), Err(ApiError::Decode(_))));
}

#[test]
fn from_lines_keeps_order_and_rejects_bad_values() {
    let cookies = ForwardedCookies::from_lines(["a=1", "b=2; Path=/"]).unwrap();
    let values: Vec<_> = cookies.iter().map(|v| v.to_str().unwrap()).collect();
    assert_eq!(values, vec!["a=1", "b=2; Path=/"]);

    let err = ForwardedCookies::from_lines(["ok=1", "bad=\n1"]).unwrap_err();
    assert!(matches!(err, ApiError::InvalidHeader(_)));
}
