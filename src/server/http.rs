use std::sync::{Arc, PoisonError};

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;

use crate::engine::controller::ControllerHandle;
use crate::engine::options::SharedOptions;
use crate::foundation::error::{PixelcastError, PixelcastResult};
use crate::params::parameter::UpdateRequest;

/// Frames buffered per visualizer subscriber before the oldest are dropped.
const FRAME_BUFFER: usize = 10;

/// Pre-serialized visualizer frames, published once per tick.
pub type FrameSender = broadcast::Sender<Arc<String>>;

pub fn frame_channel() -> FrameSender {
    broadcast::channel(FRAME_BUFFER).0
}

#[derive(Clone)]
pub struct AppState {
    pub controller: ControllerHandle,
    pub options: SharedOptions,
    pub frames: FrameSender,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/patterns", get(get_patterns))
        .route("/patterns/{name}", put(update_pattern))
        .route("/options", get(get_options))
        .route("/options/{id}", put(update_option))
        .route("/options/reset", post(reset_options))
        .route("/colorMasks", get(get_color_masks))
        .route("/colorMask/{name}", put(set_color_mask))
        .route("/colorMask", delete(clear_color_mask))
        .route("/socket", get(socket))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

struct ApiError(PixelcastError);

impl From<PixelcastError> for ApiError {
    fn from(e: PixelcastError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PixelcastError::UnknownName(_) => StatusCode::NOT_FOUND,
            PixelcastError::ParameterType(_)
            | PixelcastError::ParameterRange(_)
            | PixelcastError::Validation(_) => StatusCode::BAD_REQUEST,
            PixelcastError::ChannelFull(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}

async fn root() -> &'static str {
    "pixelcast web server"
}

async fn health() -> &'static str {
    "Healthy"
}

async fn get_patterns(State(state): State<AppState>) -> Result<Response, ApiError> {
    let catalog = state.controller.catalog().await?;
    Ok(Json(serde_json::json!({
        "patterns": catalog.patterns,
        "activePattern": catalog.active_pattern,
    }))
    .into_response())
}

async fn update_pattern(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let request = parse_body(&body)?.unwrap_or_default();
    state.controller.update_pattern(&name, request).await?;
    Ok(StatusCode::OK)
}

async fn get_options(State(state): State<AppState>) -> Response {
    let options = state
        .options
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    Json(options).into_response()
}

async fn update_option(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| PixelcastError::parameter_type(format!("invalid request body: {e}")))?;
    let value = payload
        .get("value")
        .ok_or_else(|| PixelcastError::parameter_type("request must include a 'value' field"))?;

    let updated = {
        let mut options = state.options.write().unwrap_or_else(PoisonError::into_inner);
        options.set(&id, value)?;
        options.clone()
    };
    tracing::info!(option = %id, %value, "option updated");
    Ok(Json(updated).into_response())
}

async fn reset_options(State(state): State<AppState>) -> Response {
    let updated = {
        let mut options = state.options.write().unwrap_or_else(PoisonError::into_inner);
        options.reset();
        options.clone()
    };
    tracing::info!("options reset to defaults");
    Json(updated).into_response()
}

async fn get_color_masks(State(state): State<AppState>) -> Result<Response, ApiError> {
    let catalog = state.controller.catalog().await?;
    Ok(Json(serde_json::json!({
        "colorMasks": catalog.color_masks,
        "activeColorMask": catalog.active_color_mask,
    }))
    .into_response())
}

async fn set_color_mask(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let request = parse_body(&body)?;
    state.controller.update_color_mask(&name, request).await?;
    Ok(StatusCode::OK)
}

async fn clear_color_mask(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.controller.clear_color_mask().await?;
    Ok(StatusCode::OK)
}

/// Parse an optional `{"parameters": …}` body; an empty body means "no
/// parameter changes".
fn parse_body(body: &Bytes) -> PixelcastResult<Option<UpdateRequest>> {
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| PixelcastError::parameter_type(format!("invalid request body: {e}")))
}

async fn socket(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| stream_frames(socket, state.frames.subscribe()))
}

/// Push one visualizer frame per render tick. A subscriber that stops
/// reading only loses its own frames; the render task never blocks on it.
async fn stream_frames(mut socket: WebSocket, mut frames: broadcast::Receiver<Arc<String>>) {
    loop {
        match frames.recv().await {
            Ok(frame) => {
                if socket
                    .send(Message::Text(frame.as_str().into()))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "slow visualizer subscriber, dropping frames");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
