//! End-to-end tests for the lookup API.
//!
//! Most tests drive the router in-process with `oneshot`; one test binds a real
//! socket to exercise the server loop and its graceful shutdown.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use port_lookup::{
    server::{self, create_router, AppState},
    settings::Settings,
    LoadError, Loader, PortStore,
};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tracing_test::traced_test;

const AJMAN: &str = r#"{"AEAJM": {"name":"Ajman","city":"Ajman","country":"United Arab Emirates","coordinates":[55.5136433,25.4052165]}}"#;

fn ajman_store() -> Arc<PortStore> {
    let store = Arc::new(PortStore::new());
    Loader::new(store.clone())
        .load_slice(AJMAN.as_bytes())
        .unwrap();
    store
}

fn ajman_app() -> Router {
    create_router(AppState::new(ajman_store(), Settings::default()))
}

async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Option<String>, String) {
    use tower::ServiceExt;

    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
#[traced_test]
async fn test_known_port_returns_record() {
    let (status, content_type, body) = send(ajman_app(), Method::GET, "/ports/AEAJM").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert!(body.contains(r#""name":"Ajman""#));

    let record: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(record["country"], "United Arab Emirates");
    assert_eq!(record["coordinates"][0], 55.5136433);
    assert_eq!(record["coordinates"][1], 25.4052165);
    assert_eq!(record["unlocs"], serde_json::json!([]));
}

#[tokio::test]
#[traced_test]
async fn test_unknown_port_returns_404() {
    let (status, content_type, body) = send(ajman_app(), Method::GET, "/ports/UNKNOWN").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert_eq!(body, "Port not found");
}

#[tokio::test]
async fn test_lookup_is_exact_match() {
    let (status, _, _) = send(ajman_app(), Method::GET, "/ports/aeajm").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(ajman_app(), Method::GET, "/ports/AEAJ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_get_is_routed() {
    let (status, _, _) = send(ajman_app(), Method::POST, "/ports/AEAJM").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _, _) = send(ajman_app(), Method::GET, "/ports").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_loaded_count() {
    let (status, _, body) = send(ajman_app(), Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["ports_loaded"], 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups() {
    let app = ajman_app();

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let uri = if i % 2 == 0 { "/ports/AEAJM" } else { "/ports/UNKNOWN" };
                let (status, _, body) = send(app, Method::GET, uri).await;
                (i, status, body)
            })
        })
        .collect();

    for handle in handles {
        let (i, status, body) = handle.await.unwrap();
        if i % 2 == 0 {
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains(r#""city":"Ajman""#));
        } else {
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
    }
}

#[test]
fn test_unparsable_source_fails_load() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"{\"AEAJM\": {\"name\": ").unwrap();

    let store = Arc::new(PortStore::new());
    let err = Loader::new(store.clone()).load_path(file.path()).unwrap_err();

    assert!(matches!(err, LoadError::MalformedData(_)));
    assert!(store.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_server_serves_file_and_shuts_down() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(AJMAN.as_bytes()).unwrap();

    let store = Arc::new(PortStore::new());
    Loader::new(store.clone()).load_path(file.path()).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(server::run(
        listener,
        AppState::new(store, Settings::default()),
        async {
            let _ = shutdown_rx.await;
        },
    ));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /ports/AEAJM HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(response.contains(r#""name":"Ajman""#));

    shutdown_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
