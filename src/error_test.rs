use super::*;

// =============================================================================
// ErrorKind::classify
// =============================================================================

#[test]
fn classify_network_failure() {
    let err = ApiError::Network("connection refused".into());
    assert_eq!(ErrorKind::classify(&err), ErrorKind::Network);
}

#[test]
fn classify_4xx_as_unauthorized() {
    for status in [400, 401, 403, 404, 422] {
        let err = ApiError::Status { status, message: "nope".into() };
        assert_eq!(ErrorKind::classify(&err), ErrorKind::Unauthorized, "status {status}");
    }
}

#[test]
fn classify_5xx_as_server() {
    let err = ApiError::Status { status: 502, message: "bad gateway".into() };
    assert_eq!(ErrorKind::classify(&err), ErrorKind::Server);
}

#[test]
fn classify_redirect_status_as_server() {
    let err = ApiError::Status { status: 308, message: "moved".into() };
    assert_eq!(ErrorKind::classify(&err), ErrorKind::Server);
}

#[test]
fn classify_decode_as_server() {
    let err = ApiError::Decode("eof".into());
    assert_eq!(ErrorKind::classify(&err), ErrorKind::Server);
}

// =============================================================================
// AuthError / ProbeError conversion
// =============================================================================

#[test]
fn auth_error_keeps_status_and_body_message() {
    let err = AuthError::from(ApiError::Status { status: 401, message: "bad credentials".into() });
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(err.http_status, Some(401));
    assert_eq!(err.message, "bad credentials");
}

#[test]
fn auth_error_from_network_has_no_status() {
    let err = AuthError::from(ApiError::Network("timed out".into()));
    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.http_status, None);
    assert!(err.message.contains("timed out"));
}

#[test]
fn auth_error_display_includes_kind() {
    let err = AuthError::new(ErrorKind::Server, "boom", Some(500));
    assert_eq!(err.to_string(), "server error: boom");
}

#[test]
fn probe_error_carries_status() {
    let err = ProbeError::from(ApiError::Status { status: 401, message: "Unauthorized".into() });
    assert_eq!(err.http_status, Some(401));
    assert!(err.to_string().starts_with("session probe failed"));
}

#[test]
fn auth_error_serializes_kind_snake_case() {
    let err = AuthError::new(ErrorKind::Unauthorized, "x", Some(401));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["kind"], "unauthorized");
    assert_eq!(json["http_status"], 401);
}

// =============================================================================
// status_message
// =============================================================================

#[test]
fn status_message_prefers_body() {
    assert_eq!(status_message(reqwest::StatusCode::NOT_FOUND, " user not found \n"), "user not found");
}

#[test]
fn status_message_falls_back_to_reason() {
    assert_eq!(status_message(reqwest::StatusCode::UNAUTHORIZED, ""), "Unauthorized");
}
