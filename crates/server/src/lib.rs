use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tower_http::cors::CorsLayer;

use skylark_flight::{CommandClassifier, FeatureExtractor, FlightIntegrator};
use skylark_shared::*;

// ---------------------------------------------------------------------------
// Serde types for WebSocket messages
// ---------------------------------------------------------------------------

/// Messages the client may send over /api/session.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    /// One detection cycle's worth of keypoints.
    Keypoints { joints: BTreeMap<JointId, Keypoint> },
    Pause,
    Resume,
}

/// Sent once on connect so the client can mirror the active tuning.
#[derive(Debug, Serialize)]
struct ConfigMessage {
    #[serde(rename = "type")]
    msg_type: &'static str,
    tick_rate: u32,
    config: FlightConfig,
}

/// Bird state streamed to the client at the render cadence.
#[derive(Debug, Serialize)]
struct StateMessage {
    #[serde(rename = "type")]
    msg_type: &'static str,
    tick: u32,
    bird: BirdState,
    command: FlightCommand,
}

/// Error message sent to the client.
#[derive(Debug, Serialize)]
struct ErrorMessage {
    #[serde(rename = "type")]
    msg_type: &'static str,
    error: String,
}

fn error_json(error: &str) -> String {
    let msg = ErrorMessage {
        msg_type: "error",
        error: error.to_string(),
    };
    serde_json::to_string(&msg).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// HTTP / WebSocket handlers
// ---------------------------------------------------------------------------

/// GET /api/config -- the active flight tuning.
async fn get_config(State(config): State<FlightConfig>) -> Json<FlightConfig> {
    Json(config)
}

/// GET /api/session -- WebSocket upgrade endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(config): State<FlightConfig>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, config))
}

/// Handle an individual WebSocket connection.
///
/// Two halves run independently: this task reads keypoint messages and keeps
/// the latest classified command in a watch channel, while a spawned task
/// owns the write half and advances physics at the fixed tick rate. A slow
/// or silent client therefore never stalls the simulation.
async fn handle_socket(socket: WebSocket, config: FlightConfig) {
    let (mut sink, mut stream) = socket.split();

    let hello = ConfigMessage {
        msg_type: "config",
        tick_rate: TICK_RATE,
        config,
    };
    match serde_json::to_string(&hello) {
        Ok(json) => {
            if sink.send(Message::Text(json.into())).await.is_err() {
                return;
            }
        }
        Err(_) => return,
    }

    let (cmd_tx, mut cmd_rx) = watch::channel(FlightCommand::idle());
    let (pause_tx, pause_rx) = watch::channel(false);
    // Replies from the read side funnel through the single sink owner.
    let (out_tx, mut out_rx) = mpsc::channel::<String>(16);

    let tick_task = tokio::spawn(async move {
        let integrator = FlightIntegrator::new(config);
        let mut bird = BirdState::spawn(&config);
        let mut interval = tokio::time::interval(Duration::from_micros(TICK_DURATION_US));
        let mut tick: u32 = 0;
        let mut last = Instant::now();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now = Instant::now();
                    if *pause_rx.borrow() {
                        // Keep the clock pinned so resuming never produces
                        // a catch-up step.
                        last = now;
                        continue;
                    }
                    let dt = (now - last).as_secs_f32();
                    last = now;

                    let command = *cmd_rx.borrow_and_update();
                    integrator.tick(&mut bird, &command, dt);
                    tick += 1;

                    if tick % FRAME_INTERVAL == 0 {
                        let msg = StateMessage {
                            msg_type: "state",
                            tick,
                            bird,
                            command,
                        };
                        let json = match serde_json::to_string(&msg) {
                            Ok(j) => j,
                            Err(_) => continue,
                        };
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            return; // client disconnected
                        }
                    }
                }
                reply = out_rx.recv() => {
                    match reply {
                        Some(json) => {
                            if sink.send(Message::Text(json.into())).await.is_err() {
                                return;
                            }
                        }
                        None => return, // read side is gone
                    }
                }
            }
        }
    });

    // Read loop: classify keypoints into commands, watch for silence.
    let idle_timeout = Duration::from_secs_f32(config.idle_timeout_secs);
    let mut extractor = FeatureExtractor::new(config);
    let mut classifier = CommandClassifier::new(config);
    let mut last_frame = Instant::now();
    let mut deadline = Instant::now() + idle_timeout;
    let mut silenced = false;

    loop {
        tokio::select! {
            msg = stream.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue, // pings and binary frames
                    Some(Err(_)) => break,
                };

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Keypoints { joints }) => {
                        let now = Instant::now();
                        // Real inter-frame time; floored against duplicate
                        // timestamps blowing up velocities.
                        let cycle_dt = (now - last_frame).as_secs_f32().max(1e-3);
                        last_frame = now;
                        deadline = now + idle_timeout;
                        silenced = false;

                        let frame = KeypointFrame { joints };
                        let features = extractor.extract(Some(&frame), cycle_dt);
                        let command = classifier.classify(&features);
                        if cmd_tx.send(command).is_err() {
                            break; // tick task is gone
                        }
                    }
                    Ok(ClientMessage::Pause) => {
                        let _ = pause_tx.send(true);
                    }
                    Ok(ClientMessage::Resume) => {
                        let _ = pause_tx.send(false);
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "rejected client message");
                        if out_tx.send(error_json(&format!("invalid message: {e}"))).await.is_err() {
                            break;
                        }
                    }
                }
            }
            _ = tokio::time::sleep_until(deadline), if !silenced => {
                silenced = true;
                classifier.force_idle();
                let _ = cmd_tx.send(FlightCommand::idle());
                tracing::info!("client went quiet, forcing idle");
            }
        }
    }

    tick_task.abort();
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Build the axum `Router`.
pub fn app(config: FlightConfig) -> Router {
    Router::new()
        .route("/api/config", get(get_config))
        .route("/api/session", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(config)
}

/// Start the server on the given port.
pub async fn run_server(port: u16, config: FlightConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = app(config);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!(port, "skylark server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoints_message_parses() {
        let text = r#"{
            "type": "keypoints",
            "joints": {
                "left_wrist": { "x": 0.6, "y": 0.4, "confidence": 0.9 },
                "nose": { "x": 0.5, "y": 0.41, "confidence": 0.8 }
            }
        }"#;
        let msg: ClientMessage = serde_json::from_str(text).unwrap();
        match msg {
            ClientMessage::Keypoints { joints } => {
                assert_eq!(joints.len(), 2);
                assert!(joints.contains_key(&JointId::LeftWrist));
            }
            other => panic!("expected keypoints, got {other:?}"),
        }
    }

    #[test]
    fn test_pause_resume_parse() {
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"pause"}"#).unwrap(),
            ClientMessage::Pause
        ));
        assert!(matches!(
            serde_json::from_str::<ClientMessage>(r#"{"type":"resume"}"#).unwrap(),
            ClientMessage::Resume
        ));
    }

    #[test]
    fn test_unknown_message_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"teleport"}"#).is_err());
    }

    #[test]
    fn test_state_message_wire_shape() {
        let config = FlightConfig::default();
        let msg = StateMessage {
            msg_type: "state",
            tick: 120,
            bird: BirdState::spawn(&config),
            command: FlightCommand::idle(),
        };
        let value: serde_json::Value = serde_json::from_str(&serde_json::to_string(&msg).unwrap()).unwrap();
        assert_eq!(value["type"], "state");
        assert_eq!(value["tick"], 120);
        assert_eq!(value["bird"]["height"], config.start_height);
        assert_eq!(value["command"]["vertical"]["kind"], "idle");
    }

    #[test]
    fn test_error_message_wire_shape() {
        let value: serde_json::Value = serde_json::from_str(&error_json("bad frame")).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["error"], "bad frame");
    }
}
