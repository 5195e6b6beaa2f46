//! End-to-end behaviour of the relay against real backends.

use std::convert::Infallible;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use futures_util::stream::{self, StreamExt};
use reqwest::Method;
use tokio::sync::Notify;

mod common;

use common::{assert_cors, client, relay_config, CountingAssets};

#[tokio::test]
async fn test_prefix_rewritten_and_query_kept() {
    let (backend, recorder) = common::start_recording_backend().await;
    let (relay, shutdown) = common::start_relay(relay_config(backend), Arc::default()).await;

    let res = client()
        .get(format!("http://{}/api/users/5?active=true", relay))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let seen = recorder.last();
    assert_eq!(seen.uri.path(), "/api_backend_ai/users/5");
    assert_eq!(seen.uri.query(), Some("active=true"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_bare_prefix_maps_to_bare_backend_prefix() {
    let (backend, recorder) = common::start_recording_backend().await;
    let (relay, shutdown) = common::start_relay(relay_config(backend), Arc::default()).await;

    let res = client().get(format!("http://{}/api", relay)).send().await.unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(recorder.last().uri.path(), "/api_backend_ai");

    shutdown.trigger();
}

#[tokio::test]
async fn test_preflight_answered_without_backend() {
    let (backend, recorder) = common::start_recording_backend().await;
    let (relay, shutdown) = common::start_relay(relay_config(backend), Arc::default()).await;

    let res = client()
        .request(Method::OPTIONS, format!("http://{}/api/users", relay))
        .header("origin", "https://app.example.com")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_cors(res.headers());
    assert!(res.bytes().await.unwrap().is_empty());
    assert_eq!(recorder.calls(), 0, "preflight must not reach the backend");

    shutdown.trigger();
}

#[tokio::test]
async fn test_backend_headers_kept_and_cors_merged() {
    let (backend, _recorder) = common::start_recording_backend().await;
    let (relay, shutdown) = common::start_relay(relay_config(backend), Arc::default()).await;

    let res = client()
        .post(format!("http://{}/api/items", relay))
        .body("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-backend"], "recorded");
    assert_eq!(res.headers()["content-type"], "application/octet-stream");
    assert_cors(res.headers());
    assert_eq!(res.text().await.unwrap(), "payload");

    shutdown.trigger();
}

#[tokio::test]
async fn test_method_headers_and_body_forwarded() {
    let (backend, recorder) = common::start_recording_backend().await;
    let (relay, shutdown) = common::start_relay(relay_config(backend), Arc::default()).await;

    // Non-UTF-8 bytes must arrive unchanged.
    let payload: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();

    for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
        let res = client()
            .request(method.clone(), format!("http://{}/api/blob", relay))
            .header("authorization", "Token abc")
            .header("content-type", "application/octet-stream")
            .header("x-custom", "kept")
            .body(payload.clone())
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);

        let seen = recorder.last();
        assert_eq!(seen.method, method);
        assert_eq!(seen.headers["authorization"], "Token abc");
        assert_eq!(seen.headers["x-custom"], "kept");
        assert_eq!(seen.headers["host"], backend.to_string());
        assert_eq!(&seen.body[..], &payload[..]);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_get_body_not_forwarded() {
    let (backend, recorder) = common::start_recording_backend().await;
    let (relay, shutdown) = common::start_relay(relay_config(backend), Arc::default()).await;

    let res = client()
        .get(format!("http://{}/api/search", relay))
        .body("should not travel")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert!(recorder.last().body.is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_backend_error_status_passed_through() {
    let backend = common::start_programmable_backend(|| async {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            [("content-type", "application/json")],
            r#"{"message":"cedula invalida"}"#,
        )
            .into_response()
    })
    .await;
    let (relay, shutdown) = common::start_relay(relay_config(backend), Arc::default()).await;

    let res = client().get(format!("http://{}/api/report/1", relay)).send().await.unwrap();

    assert_eq!(res.status(), 422);
    assert_cors(res.headers());
    assert_eq!(res.text().await.unwrap(), r#"{"message":"cedula invalida"}"#);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_backend_gives_json_500() {
    let backend = common::unused_addr().await;
    let (relay, shutdown) = common::start_relay(relay_config(backend), Arc::default()).await;

    let res = client()
        .post(format!("http://{}/api/users", relay))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_cors(res.headers());

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Failed to reach backend");
    assert!(body["message"].as_str().unwrap().starts_with("connection to backend failed"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_repeated_get_is_stable() {
    let backend = common::start_programmable_backend(|| async { "stable".into_response() }).await;
    let (relay, shutdown) = common::start_relay(relay_config(backend), Arc::default()).await;
    let url = format!("http://{}/api/status", relay);

    let first = client().get(&url).send().await.unwrap();
    let (status_a, body_a) = (first.status(), first.text().await.unwrap());
    let second = client().get(&url).send().await.unwrap();
    let (status_b, body_b) = (second.status(), second.text().await.unwrap());

    assert_eq!(status_a, status_b);
    assert_eq!(body_a, body_b);
    assert_eq!(body_a, "stable");

    shutdown.trigger();
}

#[tokio::test]
async fn test_non_api_paths_go_to_assets_once() {
    let (backend, recorder) = common::start_recording_backend().await;
    let assets = Arc::new(CountingAssets::default());
    let (relay, shutdown) = common::start_relay(relay_config(backend), assets.clone()).await;

    let res = client().get(format!("http://{}/index.html", relay)).send().await.unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "asset /index.html");
    assert_eq!(assets.calls.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.calls(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_custom_prefixes() {
    let (backend, recorder) = common::start_recording_backend().await;
    let mut config = relay_config(backend);
    config.proxy.public_prefix = "/gateway".into();
    config.proxy.backend_prefix = "/v2".into();
    let assets = Arc::new(CountingAssets::default());
    let (relay, shutdown) = common::start_relay(config, assets.clone()).await;

    client().get(format!("http://{}/gateway/orders", relay)).send().await.unwrap();
    assert_eq!(recorder.last().uri.path(), "/v2/orders");

    client().get(format!("http://{}/api/orders", relay)).send().await.unwrap();
    assert_eq!(recorder.calls(), 1);
    assert_eq!(assets.calls.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_dot_segments_never_reach_outside_backend_prefix() {
    let (backend, recorder) = common::start_recording_backend().await;
    let (relay, shutdown) = common::start_relay(relay_config(backend), Arc::default()).await;

    for path in ["/api/../internal/admin", "/api/%2e%2e/internal/admin", "/api/x/../../secret"] {
        let response = common::raw_request(relay, "GET", path).await;

        assert!(response.starts_with("HTTP/1.1 500"), "{}: {}", path, response);
        assert!(response.to_ascii_lowercase().contains("access-control-allow-origin: *"));
        assert!(response.contains("Failed to resolve backend target"));
    }
    assert_eq!(recorder.calls(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_response_body_streams_before_backend_finishes() {
    let release = Arc::new(Notify::new());
    let gate = release.clone();
    let app = Router::new().fallback(move || {
        let gate = gate.clone();
        async move {
            let first = stream::once(async { Ok::<_, Infallible>(Bytes::from_static(b"first")) });
            let rest = stream::once(async move {
                gate.notified().await;
                Ok::<_, Infallible>(Bytes::from_static(b"second"))
            });
            Body::from_stream(first.chain(rest))
        }
    });
    let backend = common::spawn(app).await;
    let (relay, shutdown) = common::start_relay(relay_config(backend), Arc::default()).await;

    let mut res = client().get(format!("http://{}/api/feed", relay)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_cors(res.headers());

    // The backend is still holding the rest of the body.
    let chunk = tokio::time::timeout(Duration::from_secs(5), res.chunk())
        .await
        .expect("first chunk should arrive while the backend is still open")
        .unwrap();
    assert_eq!(chunk.as_deref(), Some(&b"first"[..]));

    release.notify_one();
    let mut rest = Vec::new();
    while let Some(chunk) = res.chunk().await.unwrap() {
        rest.extend_from_slice(&chunk);
    }
    assert_eq!(rest, b"second");

    shutdown.trigger();
}
