use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use stt_relay::config::{Config, HttpConfig, RealtimeSettings, RelaySettings, ServiceConfig};
use stt_relay::{create_router, AppState, InspectStore};
use tower::ServiceExt;

fn test_config(api_key: &str) -> Config {
    Config {
        service: ServiceConfig {
            name: "stt-relay-test".to_string(),
            http: HttpConfig {
                bind: "127.0.0.1".to_string(),
                port: 0,
            },
            cors_origins: String::new(),
        },
        realtime: RealtimeSettings {
            url: "wss://example.test/v1/realtime".to_string(),
            api_key: api_key.to_string(),
            beta_header: false,
            language: "en".to_string(),
        },
        relay: RelaySettings {
            commit_interval_ms: 1000,
            idle_timeout_secs: 10,
        },
    }
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn healthz_is_ok_with_credential_and_url() {
    let router = create_router(AppState::new(test_config("sk-test")));
    let (status, body) = get(router, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn healthz_reports_not_ok_without_credential() {
    let router = create_router(AppState::new(test_config("")));
    let (status, body) = get(router, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn sessions_listing_starts_empty() {
    let router = create_router(AppState::new(test_config("sk-test")));
    let (status, body) = get(router, "/sessions").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(vec![]));
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let router = create_router(AppState::new(test_config("sk-test")));
    let (status, body) = get(router, "/sessions/sess-missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("sess-missing"));
}

#[tokio::test]
async fn recorded_session_shows_up_in_listing_and_detail() {
    let state = AppState::new(test_config("sk-test"));

    state.inspect.register("sess-1").await;
    state.inspect.record_audio("sess-1", 320).await;
    state.inspect.record_audio("sess-1", 320).await;
    state.inspect.record_delta("sess-1", "hello", false).await;
    state.inspect.record_delta("sess-1", " world", true).await;

    let (status, listing) = get(create_router(state.clone()), "/sessions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().unwrap().len(), 1);
    assert_eq!(listing[0]["session_id"], "sess-1");
    assert_eq!(listing[0]["audio_chunks"], 2);
    assert_eq!(listing[0]["audio_bytes"], 640);
    assert_eq!(listing[0]["delta_count"], 2);

    let (status, detail) = get(create_router(state), "/sessions/sess-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["deltas"][0]["text"], "hello");
    assert_eq!(detail["deltas"][0]["is_final"], false);
    assert_eq!(detail["deltas"][1]["text"], " world");
    assert_eq!(detail["deltas"][1]["is_final"], true);
}

#[tokio::test]
async fn inspect_store_bounds_deltas_per_session() {
    let store = InspectStore::new();
    store.register("sess-ring").await;

    for i in 0..300 {
        store.record_delta("sess-ring", &format!("d{}", i), false).await;
    }

    let trace = store.session("sess-ring").await.unwrap();
    assert_eq!(trace.deltas.len(), 256);
    // Oldest entries were evicted
    assert_eq!(trace.deltas.front().unwrap().text, "d44");
    assert_eq!(trace.deltas.back().unwrap().text, "d299");
}
