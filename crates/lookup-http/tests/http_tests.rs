//! HTTP Backend Tests
//!
//! Run the HTTP lookup service and health probe against a local warp server
//! that answers the way the example backend does.
//!
use lookup_core::prelude::*;
use lookup_core::ViewText;
use lookup_http::{HealthProbe, HttpLookupError, HttpLookupService};
use lookup_test_utils::{example_record, test_config};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use warp::http::StatusCode;
use warp::Filter;

const KNOWN: &str = "00000000-0000-0000-0000-000000000001";

fn error_body(code: &str, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}

async fn spawn_backend() -> SocketAddr {
    let slow = warp::path!("api" / "example" / "slow").and_then(|| async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok::<_, Infallible>(warp::reply::json(&json!({ "id": "slow" })))
    });

    let example = warp::path!("api" / "example" / String).map(|id: String| {
        let (status, body) = match Uuid::parse_str(&id) {
            Ok(uuid) if uuid.to_string() == KNOWN => (
                StatusCode::OK,
                json!({ "data": example_record(KNOWN).to_json() }),
            ),
            Ok(_) => (
                StatusCode::NOT_FOUND,
                error_body("EXAMPLE_NOT_FOUND", "Example not found"),
            ),
            Err(_) => (
                StatusCode::BAD_REQUEST,
                error_body("INVALID_EXAMPLE_ID", "Example id must be a valid UUID"),
            ),
        };
        warp::reply::with_status(warp::reply::json(&body), status)
    });

    let collection =
        warp::path!("api" / "example").map(|| warp::reply::json(&json!({ "data": [1, 2] })));

    let health =
        warp::path!("api" / "health").map(|| warp::reply::json(&json!({ "status": "ok" })));

    let (addr, server) = warp::serve(slow.or(example).or(collection).or(health)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

async fn spawn_unhealthy_backend() -> SocketAddr {
    let health = warp::path!("api" / "health")
        .map(|| warp::reply::with_status("down", StatusCode::SERVICE_UNAVAILABLE));
    let (addr, server) = warp::serve(health).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn config_for(addr: SocketAddr) -> LookupConfig {
    test_config().with_base_url(format!("http://{addr}"))
}

#[tokio::test]
async fn test_known_id_resolves_record() {
    let addr = spawn_backend().await;
    let service = HttpLookupService::new(&config_for(addr)).unwrap();

    let payload = service.fetch(KNOWN).await.unwrap();
    assert_eq!(payload.identifier, KNOWN);
    assert_eq!(payload.record().unwrap(), example_record(KNOWN));
}

#[tokio::test]
async fn test_invalid_id_surfaces_backend_message() {
    let addr = spawn_backend().await;
    let service = HttpLookupService::new(&config_for(addr)).unwrap();

    let err = service.fetch("invalid-uuid-format").await.unwrap_err();
    match &err {
        HttpLookupError::Status { status, code, .. } => {
            assert_eq!(*status, 400);
            assert_eq!(code.as_deref(), Some("INVALID_EXAMPLE_ID"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_retryable());

    let err = service.lookup("invalid-uuid-format").await.unwrap_err();
    assert_eq!(
        err.message(),
        "backend returned 400: Example id must be a valid UUID"
    );
}

#[tokio::test]
async fn test_unknown_uuid_is_not_found() {
    let addr = spawn_backend().await;
    let service = HttpLookupService::new(&config_for(addr)).unwrap();

    let err = service
        .fetch("00000000-0000-0000-0000-000000000002")
        .await
        .unwrap_err();
    assert!(matches!(err, HttpLookupError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let addr = spawn_backend().await;
    let config = config_for(addr).with_request_timeout(Duration::from_millis(100));
    let service = HttpLookupService::new(&config).unwrap();

    let err = service.fetch("slow").await.unwrap_err();
    assert!(matches!(err, HttpLookupError::Timeout));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = test_config().with_base_url(format!("http://127.0.0.1:{port}"));
    let service = HttpLookupService::new(&config).unwrap();

    let err = service.fetch(KNOWN).await.unwrap_err();
    assert!(matches!(err, HttpLookupError::Transport(_)));
}

#[tokio::test]
async fn test_health_probe_reports_healthy() {
    let addr = spawn_backend().await;
    let probe = HealthProbe::new(&config_for(addr)).unwrap();

    let report = probe.check().await.unwrap();
    assert!(report.healthy);
    assert_eq!(report.status_code, 200);
    assert_eq!(report.body, Some(json!({ "status": "ok" })));
}

#[tokio::test]
async fn test_health_probe_reports_unhealthy() {
    let addr = spawn_unhealthy_backend().await;
    let probe = HealthProbe::new(&config_for(addr)).unwrap();

    let report = probe.check().await.unwrap();
    assert!(!report.healthy);
    assert_eq!(report.status_code, 503);
    assert!(report.body.is_none());
}

#[tokio::test]
async fn test_controller_over_http() {
    let addr = spawn_backend().await;
    let config = config_for(addr);
    let service = HttpLookupService::new(&config).unwrap();
    let handle = LookupController::spawn(Arc::new(service), &config);

    handle.submit_identifier("invalid-uuid-format");
    let snapshot = handle.wait_until_settled(1).await.unwrap();
    let view = StatusView::render(&snapshot.state, &ViewText::default());
    assert_eq!(view.badge, StatusKind::Error);
    assert_eq!(
        view.message.as_deref(),
        Some("Request failed: backend returned 400: Example id must be a valid UUID")
    );

    handle.submit_identifier(format!("  {KNOWN}  "));
    let snapshot = handle.wait_until_settled(2).await.unwrap();
    assert_eq!(snapshot.status(), StatusKind::Success);
    assert_eq!(snapshot.state.identifier(), Some(KNOWN));
}

#[tokio::test]
async fn test_dot_identifier_does_not_reach_collection() {
    let addr = spawn_backend().await;
    let config = config_for(addr);
    let service = HttpLookupService::new(&config).unwrap();

    let err = service.fetch("..").await.unwrap_err();
    assert!(matches!(err, HttpLookupError::UnaddressableIdentifier(_)));

    let handle = LookupController::spawn(Arc::new(service), &config);
    handle.submit_identifier("..");
    let snapshot = handle.wait_until_settled(1).await.unwrap();
    assert_eq!(snapshot.status(), StatusKind::Error);
    assert_eq!(
        snapshot.state.error().map(LookupError::message),
        Some("identifier `..` cannot be sent as a path segment")
    );

    handle.submit_identifier(".");
    let snapshot = handle.wait_until_settled(2).await.unwrap();
    assert_eq!(snapshot.status(), StatusKind::Error);
    assert!(snapshot.state.payload().is_none());
}
