//! Blynk HTTP transport against a local fake of the Blynk external API.

use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use app_status::config::DashboardConfig;
use app_status::connection::Connection;
use app_status::tracker::RunTracker;
use app_status::{PinPayload, TransportError};

type Params = Vec<(String, String)>;

#[derive(Clone, Default)]
struct FakeBlynk {
    batches: Arc<Mutex<Vec<Params>>>,
}

const GOOD_TOKEN: &str = "good-token";

fn token_ok(params: &Params) -> bool {
    params.iter().any(|(k, v)| k == "token" && v == GOOD_TOKEN)
}

async fn is_hardware_connected(Query(params): Query<Params>) -> (StatusCode, String) {
    if token_ok(&params) {
        (StatusCode::OK, "true".to_string())
    } else {
        (
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"Invalid token."}}"#.to_string(),
        )
    }
}

async fn batch_update(
    State(fake): State<FakeBlynk>,
    Query(params): Query<Params>,
) -> (StatusCode, String) {
    if !token_ok(&params) {
        return (StatusCode::BAD_REQUEST, "Invalid token.".to_string());
    }
    let pins = params.into_iter().filter(|(k, _)| k != "token").collect();
    fake.batches.lock().unwrap().push(pins);
    (StatusCode::OK, String::new())
}

async fn spawn_fake() -> (String, FakeBlynk) {
    let fake = FakeBlynk::default();
    let app = Router::new()
        .route("/external/api/isHardwareConnected", get(is_hardware_connected))
        .route("/external/api/batch/update", get(batch_update))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), fake)
}

fn dashboard(url: String) -> DashboardConfig {
    DashboardConfig {
        server_url: url,
        request_timeout_secs: 5,
        ..DashboardConfig::default()
    }
}

fn pairs(raw: &[(&str, &str)]) -> Params {
    raw.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_open_rejects_bad_token() {
    let (url, _fake) = spawn_fake().await;
    let err = Connection::open("wrong", &dashboard(url)).await.unwrap_err();
    match err {
        TransportError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("Invalid token"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_push_sends_one_ordered_batch() {
    let (url, fake) = spawn_fake().await;
    let conn = Connection::open(GOOD_TOKEN, &dashboard(url)).await.unwrap();
    assert!(fake.batches.lock().unwrap().is_empty());

    let mut payload = PinPayload::new();
    payload.set(4, "S1 F0 B0").set(2, "1/10").set(3, 10.0);
    conn.push(&payload).await.unwrap();

    let batches = fake.batches.lock().unwrap().clone();
    assert_eq!(
        batches,
        vec![pairs(&[("V4", "S1 F0 B0"), ("V2", "1/10"), ("V3", "10")])]
    );
}

#[tokio::test]
async fn test_tracker_over_http() {
    let (url, fake) = spawn_fake().await;
    let conn = Arc::new(Connection::open(GOOD_TOKEN, &dashboard(url)).await.unwrap());
    let mut tracker = RunTracker::new(conn, 2).unwrap();

    tracker.start(1, 4, Some("Nightly")).await.unwrap();
    tracker.add_failed(1).await.unwrap();
    tracker.stop(1).await.unwrap();

    let batches = fake.batches.lock().unwrap().clone();
    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0][0], ("V10".to_string(), "Nightly".to_string()));
    assert_eq!(batches[0].len(), 6);
    assert_eq!(
        batches[1],
        pairs(&[
            ("V12", "1/4"),
            ("V13", "25"),
            ("V14", "S0 F1 B0"),
            ("V15", "255"),
        ])
    );
    assert_eq!(batches[2], pairs(&[("V15", "0")]));
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    // Port 9 (discard) is closed on test hosts.
    let err = Connection::open(GOOD_TOKEN, &dashboard("http://127.0.0.1:9".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Http(_)));
}
