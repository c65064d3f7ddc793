use super::*;

#[test]
fn success_statuses_are_accepted() {
    assert!(is_accepted(StatusCode::OK, false));
    assert!(is_accepted(StatusCode::NO_CONTENT, false));
}

#[test]
fn redirect_only_accepted_when_allowed() {
    assert!(!is_accepted(StatusCode::PERMANENT_REDIRECT, false));
    assert!(is_accepted(StatusCode::PERMANENT_REDIRECT, true));
}

#[test]
fn client_errors_never_accepted() {
    assert!(!is_accepted(StatusCode::UNAUTHORIZED, true));
    assert!(!is_accepted(StatusCode::NOT_FOUND, false));
    assert!(!is_accepted(StatusCode::INTERNAL_SERVER_ERROR, true));
}

#[test]
fn http_session_api_keeps_endpoints() {
    let api = HttpSessionApi::new(EndpointConfig::new("http://example.test")).unwrap();
    assert_eq!(api.endpoints().base_url, "http://example.test");
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    // Port 9 (discard) on loopback is closed in test environments.
    let api = HttpSessionApi::new(EndpointConfig::new("http://127.0.0.1:9")).unwrap();
    let err = api.session().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)), "unexpected error: {err:?}");
}
