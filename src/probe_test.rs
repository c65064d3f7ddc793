use super::*;
use crate::error::ApiError;
use crate::test_helpers::{MockApi, server_error};

#[tokio::test]
async fn probe_succeeds_with_active_session() {
    let api = MockApi::with_session().shared();
    let probe = SessionProbe::new(api.clone());
    assert!(probe.probe().await.is_ok());
    assert_eq!(api.session_calls(), 1);
}

#[tokio::test]
async fn probe_reports_status_on_rejection() {
    let probe = SessionProbe::new(MockApi::new().shared());
    let err = probe.probe().await.unwrap_err();
    assert_eq!(err.http_status, Some(401));
}

#[tokio::test]
async fn probe_reports_server_errors() {
    let api = MockApi::with_session();
    api.fail_session(server_error());
    let err = SessionProbe::new(api.shared()).probe().await.unwrap_err();
    assert_eq!(err.http_status, Some(500));
}

#[tokio::test]
async fn probe_network_failure_has_no_status() {
    let api = MockApi::new();
    api.fail_session(ApiError::Network("connection reset".into()));
    let err = SessionProbe::new(api.shared()).probe().await.unwrap_err();
    assert_eq!(err.http_status, None);
    assert!(err.message.contains("connection reset"));
}
