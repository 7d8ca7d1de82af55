#![allow(clippy::unwrap_used)]
// Integration tests for `Controller`: apply validation, positions
// round-trip, and mirror command routing.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lumen_core::{
    BridgeConfig, ChannelState, Command, CommandResult, CommandRoute, Controller, CoreError,
    Loadable, MirrorStartRequest, Position, ReconnectPolicy,
};

// ── Helpers ─────────────────────────────────────────────────────────

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

fn quiet_config(url: &str) -> BridgeConfig {
    let mut config = BridgeConfig::new(Url::parse(url).unwrap());
    config.websocket_enabled = false;
    config.poll_interval = Duration::ZERO;
    config
}

async fn setup() -> (MockServer, Controller) {
    let server = MockServer::start().await;
    let controller = Controller::new(quiet_config(&server.uri())).unwrap();
    controller.connect().await.unwrap();
    (server, controller)
}

fn positions_body(second_enabled: bool) -> serde_json::Value {
    json!({
        "lights": [
            {"name": "Hue Play 1", "enabled": true, "position": "left"},
            {"name": "Hue Play 2", "enabled": second_enabled, "position": "right"}
        ],
        "positions": [
            {"id": "none", "label": "None", "description": "Not mirrored"},
            {"id": "left", "label": "Left", "description": "Left edge"},
            {"id": "right", "label": "Right", "description": "Right edge"}
        ]
    })
}

// ── Apply ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_apply_without_selection_never_hits_network() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/apply"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = controller.apply_form("", "5", "30").await.unwrap_err();
    assert!(matches!(err, CoreError::NoConfigurationSelected));

    let err = controller
        .apply_form("Movie Night", "soon", "")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
}

#[tokio::test]
async fn test_apply_sends_parsed_numbers() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/apply"))
        .and(body_json(json!({
            "config_name": "Movie Night",
            "transition_time_secs": 5,
            "duration_minutes": 30
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Configuração 'Movie Night' aplicada",
            "details": {"config_name": "Movie Night", "transition_time_secs": 5.0, "duration_minutes": 30.0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = controller
        .apply_form("Movie Night", "5", "30")
        .await
        .unwrap();
    assert_eq!(outcome.config_name, "Movie Night");
    assert_eq!(outcome.message, "Configuração 'Movie Night' aplicada");
}

#[tokio::test]
async fn test_apply_unknown_configuration_is_not_found() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/apply"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Configuração 'X' não encontrada"})),
        )
        .mount(&server)
        .await;

    let err = controller.apply_form("X", "", "").await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

// ── Positions ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_positions_round_trip_preserves_toggle() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/positions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(positions_body(false)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/positions"))
        .and(body_json(json!({"lights": [
            {"name": "Hue Play 1", "enabled": true, "position": "left"},
            {"name": "Hue Play 2", "enabled": true, "position": "right"}
        ]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Posições salvas"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/positions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(positions_body(true)))
        .mount(&server)
        .await;

    let mut map = controller.load_positions().await.unwrap();
    assert!(!map.light("Hue Play 2").unwrap().enabled);
    assert!(map.toggle("Hue Play 2").unwrap());

    let message = controller.save_positions(&map).await.unwrap();
    assert_eq!(message, "Posições salvas");

    let reloaded = controller.load_positions().await.unwrap();
    assert!(reloaded.light("Hue Play 2").unwrap().enabled);
    assert_eq!(reloaded.light("Hue Play 2").unwrap().position, Position::Right);
    assert_eq!(
        controller.positions_snapshot().ready().map(|m| m.lights.len()),
        Some(2)
    );
}

#[tokio::test]
async fn test_reset_refetches_positions() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/positions/reset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(positions_body(true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/positions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(positions_body(false)))
        .expect(1)
        .mount(&server)
        .await;

    let map = controller.reset_positions().await.unwrap();
    // The value comes from the follow-up GET, not the reset response.
    assert!(!map.light("Hue Play 2").unwrap().enabled);
}

// ── Command processor ───────────────────────────────────────────────

#[tokio::test]
async fn test_execute_requires_connect() {
    let controller = Controller::new(quiet_config("http://127.0.0.1:9")).unwrap();
    let err = controller.execute(Command::StopMirror).await.unwrap_err();
    assert!(matches!(err, CoreError::NotConnected));
}

#[tokio::test]
async fn test_mirror_falls_back_to_http_without_socket() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/mirror/start"))
        .and(body_json(json!({"fps": 25, "brightness": 200})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Espelhamento iniciado",
            "status": {"running": true, "fps": 25, "brightness": 200, "colors": {}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mirror/stop"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Espelhamento não está ativo"})),
        )
        .mount(&server)
        .await;

    let result = controller
        .execute(Command::StartMirror(MirrorStartRequest::default()))
        .await
        .unwrap();
    let CommandResult::Mirror(dispatch) = result else {
        panic!("expected mirror result, got {result:?}");
    };
    assert_eq!(dispatch.route, CommandRoute::Http);
    assert_eq!(dispatch.message, "Espelhamento iniciado");
    assert!(controller.mirror_snapshot().unwrap().running);

    let err = controller.execute(Command::StopMirror).await.unwrap_err();
    assert!(matches!(err, CoreError::Api { status: Some(400), .. }));

    controller.disconnect().await;
    assert!(!controller.is_connected());
}

#[tokio::test]
async fn test_http_stop_clears_live_colors() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/mirror/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Espelhamento iniciado",
            "status": {"running": true, "fps": 25, "brightness": 200, "colors": {"A": [255, 0, 0]}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mirror/stop"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Espelhamento parado"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    controller
        .execute(Command::StartMirror(MirrorStartRequest::default()))
        .await
        .unwrap();
    assert!(controller.mirror_snapshot().unwrap().live_colors().is_some());

    let result = controller.execute(Command::StopMirror).await.unwrap();
    let CommandResult::Mirror(dispatch) = result else {
        panic!("expected mirror result, got {result:?}");
    };
    assert_eq!(dispatch.message, "Espelhamento parado");
    assert!(dispatch.status.is_some_and(|s| !s.running));

    let snapshot = controller.mirror_snapshot().unwrap();
    assert!(!snapshot.running);
    assert!(snapshot.colors.is_empty());
    assert!(snapshot.live_colors().is_none());
    assert_eq!(snapshot.fps, 25);

    controller.disconnect().await;
}

// ── Live socket ─────────────────────────────────────────────────────

/// Accepts every connection; plain HTTP requests fail the handshake and
/// are dropped, the first socket client gets the scripted exchange.
async fn spawn_mirror_server(listener: TcpListener) {
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(msg)) = ws.next().await {
                    let Message::Text(text) = msg else { continue };
                    let cmd: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
                    if cmd["action"] == "start" {
                        let frame = json!({
                            "running": true, "fps": cmd["fps"], "brightness": 200,
                            "colors": {"Strip": [255, 0, 0], "Lamp": [0, 0, 255]}
                        });
                        ws.send(Message::text(frame.to_string())).await.unwrap();
                    }
                }
            });
        }
    });
}

#[tokio::test]
async fn test_socket_route_and_pushed_frames() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    spawn_mirror_server(listener).await;

    let mut config = quiet_config(&format!("http://{addr}"));
    config.websocket_enabled = true;
    config.timeout = Duration::from_secs(2);
    config.reconnect = ReconnectPolicy {
        base_delay: Duration::from_millis(5),
        max_retries: 5,
    };
    let controller = Controller::new(config).unwrap();
    let mut mirror = controller.mirror();
    controller.connect().await.unwrap();

    let mut states = controller.channel_state();
    tokio::time::timeout(TEST_TIMEOUT, states.wait_for(|s| s.is_open()))
        .await
        .unwrap()
        .unwrap();

    let dispatch = controller
        .start_mirror(MirrorStartRequest {
            fps: 30,
            brightness: 200,
        })
        .await
        .unwrap();
    assert_eq!(dispatch.route, CommandRoute::Socket);

    let snapshot = tokio::time::timeout(TEST_TIMEOUT, async {
        loop {
            let value = mirror.changed().await.unwrap();
            if let Some(snapshot) = value.filter(|s| s.running) {
                return snapshot;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(snapshot.fps, 30);
    let names: Vec<&str> = snapshot.colors.keys().map(String::as_str).collect();
    assert_eq!(names, ["Strip", "Lamp"]);
    assert!(controller.store().last_push().is_some());

    controller.disconnect().await;
    assert_eq!(*controller.channel_state().borrow(), ChannelState::TornDown);
}

#[tokio::test]
async fn test_connect_loads_mirror_status_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mirror/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "running": false, "fps": 25, "colors": {}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/positions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(positions_body(true)))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = quiet_config(&server.uri());
    config.websocket_enabled = true;
    config.reconnect = ReconnectPolicy {
        base_delay: Duration::from_millis(5),
        max_retries: 1,
    };
    let controller = Controller::new(config).unwrap();
    let mut mirror = controller.mirror();
    controller.connect().await.unwrap();

    let view = tokio::time::timeout(TEST_TIMEOUT, mirror.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(view.is_some_and(|s| !s.running));
    assert!(matches!(controller.positions_snapshot(), Loadable::Loading));

    controller.disconnect().await;
}
