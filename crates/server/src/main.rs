use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use game::{Coordinator, DeviceSession};
use shared::protocol::SessionStatus;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_catalog, load_settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let catalog = load_catalog(settings.catalog_path.as_deref())?;
    info!(controls = catalog.len(), "control catalog loaded");

    let coordinator = Coordinator::new(settings.game_config(), catalog);
    let app = build_router(Arc::new(AppState { coordinator }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/status", get(status))
        .route("/session/start", post(start_session))
        .route("/session/stop", post(stop_session))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn status(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    Json(state.coordinator.status())
}

async fn start_session(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    Json(state.coordinator.start_session())
}

async fn stop_session(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    Json(state.coordinator.stop_session())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_connection(state.coordinator.clone(), socket))
}

async fn ws_connection(coordinator: Coordinator, socket: WebSocket) {
    use futures::{SinkExt, StreamExt};

    let (mut sender, mut receiver) = socket.split();
    let DeviceSession {
        device_id,
        mut events,
        ..
    } = coordinator.connect();

    let send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let text = match event.encode() {
                Ok(v) => v,
                Err(error) => {
                    warn!(%error, "failed to encode event");
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                coordinator.handle_text(device_id, &text);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(error) => {
                debug!(%device_id, %error, "websocket receive failed");
                break;
            }
        }
    }

    coordinator.disconnect(device_id);
    send_task.abort();
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
