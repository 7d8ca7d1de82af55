#![allow(clippy::unwrap_used)]
// Integration tests for `StatusPoller` against a mocked bridge facade.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lumen_api::{BridgeClient, TransportConfig};
use lumen_core::{BridgeState, LiveStore, Loadable, RefreshOutcome, StatusPoller};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, StatusPoller, Arc<LiveStore>) {
    let server = MockServer::start().await;
    let client = BridgeClient::new(
        Url::parse(&server.uri()).unwrap(),
        &TransportConfig::default(),
    )
    .unwrap();
    let store = Arc::new(LiveStore::new());
    let poller = StatusPoller::new(client, Arc::clone(&store));
    (server, poller, store)
}

fn lights_body() -> serde_json::Value {
    json!({"lights": [
        {"name": "Lamp B", "color": {"r": 255, "g": 0, "b": 0}, "on": true, "reachable": true, "brightness": 254},
        {"name": "Lamp A", "color": {"r": 0, "g": 0, "b": 255}, "on": false, "reachable": true, "brightness": 10}
    ]})
}

// ── In-flight guard ─────────────────────────────────────────────────

#[tokio::test]
async fn test_overlapping_refreshes_do_not_double_enter() {
    let (server, poller, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/lights/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(lights_body())
                .set_delay(Duration::from_millis(200)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let (first, second) = tokio::join!(
        poller.refresh_light_status(),
        poller.refresh_light_status()
    );
    assert_eq!(first, RefreshOutcome::Refreshed);
    assert_eq!(second, RefreshOutcome::Skipped);
    assert!(!poller.lights_in_flight());

    // The guard is released, so the next tick proceeds.
    assert_eq!(poller.refresh_light_status().await, RefreshOutcome::Refreshed);

    let lights = store.lights();
    let names: Vec<&str> = lights
        .ready()
        .unwrap()
        .iter()
        .map(|l| l.name.as_str())
        .collect();
    assert_eq!(names, ["Lamp A", "Lamp B"]);
}

#[tokio::test]
async fn test_failure_shows_error_and_releases_guard() {
    let (server, poller, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/lights/status"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "bridge offline"})))
        .expect(2)
        .mount(&server)
        .await;

    assert_eq!(poller.refresh_light_status().await, RefreshOutcome::Failed);
    assert!(store.lights().is_error());
    assert!(!poller.lights_in_flight());
    assert_eq!(poller.refresh_light_status().await, RefreshOutcome::Failed);
}

// ── Bridge status ───────────────────────────────────────────────────

#[tokio::test]
async fn test_bridge_status_published() {
    let (server, poller, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/bridge/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "connected": true, "bridge_ip": "192.168.1.2", "light_count": 2
        })))
        .mount(&server)
        .await;

    assert_eq!(poller.refresh_bridge_status().await, RefreshOutcome::Refreshed);
    assert_eq!(
        store.bridge(),
        Loadable::Ready(BridgeState::Connected {
            ip: "192.168.1.2".into(),
            light_count: 2
        })
    );
}

#[tokio::test]
async fn test_guards_are_independent_per_stream() {
    let (server, poller, _store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/lights/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(lights_body())
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/bridge/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"connected": false})))
        .mount(&server)
        .await;

    let (lights, bridge) = poller.refresh_all().await;
    assert_eq!(lights, RefreshOutcome::Refreshed);
    assert_eq!(bridge, RefreshOutcome::Refreshed);
}
