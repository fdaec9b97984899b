//! HTTP + WebSocket API for Handsign
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /round - Current round state
//! - POST /round/start - Start a round
//! - POST /round/restart - Start again after a round ended
//! - POST /round/stop - End the running round
//! - POST /classify - Feed one classifier result
//! - GET /highscore - Persisted high score
//! - WS /ws - Live updates

use axum::{
    extract::{State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::core::controller::{ControllerError, GameHandle};
use crate::core::feed::validate_confidence;
use crate::types::{ClassificationEvent, GameUpdate, RoundSnapshot};

/// Classify request
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub label: String,
    pub confidence: f64,
}

/// Response for accepted commands
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub accepted: bool,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// High score response
#[derive(Debug, Serialize)]
pub struct HighScoreResponse {
    pub highscore: u32,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

impl From<ControllerError> for ApiError {
    fn from(err: ControllerError) -> Self {
        api_error(StatusCode::SERVICE_UNAVAILABLE, err)
    }
}

/// Create the API router around a running controller
pub fn create_router(handle: GameHandle) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/round", get(get_round))
        .route("/round/start", post(start_round))
        .route("/round/restart", post(restart_round))
        .route("/round/stop", post(stop_round))
        .route("/classify", post(classify))
        .route("/highscore", get(get_highscore))
        .route("/ws", get(websocket_handler))
        .with_state(handle)
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Get round state
async fn get_round(State(handle): State<GameHandle>) -> Json<RoundSnapshot> {
    Json(handle.snapshot())
}

fn accepted(result: Result<(), ControllerError>) -> Result<impl IntoResponse, ApiError> {
    result?;
    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true })))
}

async fn start_round(State(handle): State<GameHandle>) -> Result<impl IntoResponse, ApiError> {
    accepted(handle.start())
}

async fn restart_round(State(handle): State<GameHandle>) -> Result<impl IntoResponse, ApiError> {
    accepted(handle.restart())
}

async fn stop_round(State(handle): State<GameHandle>) -> Result<impl IntoResponse, ApiError> {
    accepted(handle.stop())
}

/// Feed one classifier result
async fn classify(
    State(handle): State<GameHandle>,
    Json(req): Json<ClassifyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_confidence(req.confidence).map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
    accepted(handle.classify(ClassificationEvent::new(req.label, req.confidence)))
}

async fn get_highscore(State(handle): State<GameHandle>) -> Json<HighScoreResponse> {
    Json(HighScoreResponse {
        highscore: handle.high_score(),
    })
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(handle): State<GameHandle>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = handle.subscribe();
    let initial = handle.snapshot();
    ws.on_upgrade(move |socket| handle_websocket(socket, initial, rx))
}

/// Handle WebSocket connection
async fn handle_websocket(
    socket: WebSocket,
    initial: RoundSnapshot,
    mut rx: broadcast::Receiver<GameUpdate>,
) {
    let (mut sink, mut stream) = socket.split();

    let first = serde_json::to_string(&GameUpdate::State(initial)).unwrap_or_default();
    if sink.send(Message::Text(first)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Ok(update) => {
                    let json = serde_json::to_string(&update).unwrap_or_default();
                    if sink.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                // Slow client, skip what it missed
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    log::debug!("websocket lagged by {} updates", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = stream.next() => match msg {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

/// Run the API server
pub async fn run_server(addr: &str, handle: GameHandle) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(handle);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("handsign API listening on {}", addr);
    println!("✋ Handsign API running on {}", addr);
    println!("  GET  /health         - Health check");
    println!("  GET  /round          - Round state");
    println!("  POST /round/start    - Start round");
    println!("  POST /round/restart  - Restart round");
    println!("  POST /round/stop     - Stop round");
    println!("  POST /classify       - Feed classifier result");
    println!("  GET  /highscore      - High score");
    println!("  WS   /ws             - Live updates");
    axum::serve(listener, router).await?;
    Ok(())
}
