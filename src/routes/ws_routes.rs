//! Canal de actualizaciones en vivo
//!
//! Cada conexión recibe la proyección actual apenas se establece y después
//! un payload nuevo por cada cambio de estado. Un receptor que se atrasa
//! pierde payloads intermedios sin afectar al resto; el siguiente payload
//! trae el estado completo. La desconexión del cliente solo limpia su
//! receptor.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::services::broadcast_service::QueueUpdate;
use crate::state::AppState;

/// Vista que pide la conexión: la página pública usa la completa, el TV la
/// reducida
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubscribedView {
    Full,
    Tv,
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub view: Option<String>,
}

pub fn create_ws_router() -> Router<AppState> {
    Router::new().route("/queue", get(queue_ws_handler))
}

async fn queue_ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let view = match params.view.as_deref() {
        Some("tv") => SubscribedView::Tv,
        _ => SubscribedView::Full,
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, view))
}

async fn handle_socket(socket: WebSocket, state: AppState, view: SubscribedView) {
    // Suscribir antes de computar el snapshot inicial: un cambio que entre
    // en el medio llega igual por el canal y nunca viaja antes que un
    // estado más viejo dentro de esta conexión
    let mut updates = state.broadcaster.subscribe();
    let queue_service = state.queue_service();

    let (mut sender, mut receiver) = socket.split();

    match queue_service.run_housekeeping().await {
        // La conexión disparó expiraciones: el resto de los suscriptores
        // también tiene que enterarse
        Ok(expired) if expired > 0 => queue_service.publish_current_state().await,
        Ok(_) => {}
        Err(e) => tracing::warn!("Housekeeping on WebSocket connect failed: {}", e),
    }

    let initial = match queue_service.current_update().await {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!("Could not compute initial queue state for WebSocket: {}", e);
            return;
        }
    };

    if send_view(&mut sender, &initial, view).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(update) => {
                    if send_view(&mut sender, &update, view).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("WebSocket receiver lagged, skipped {} payload(s)", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = client_disconnected(&mut receiver) => break,
        }
    }
}

/// Drenar mensajes del cliente hasta Close o fin del stream; cualquier otro
/// payload entrante se ignora.
async fn client_disconnected(receiver: &mut SplitStream<WebSocket>) {
    loop {
        match receiver.next().await {
            Some(Ok(Message::Close(_))) | None => return,
            Some(Err(e)) => {
                tracing::debug!("WebSocket error: {}", e);
                return;
            }
            Some(Ok(_)) => continue,
        }
    }
}

async fn send_view(
    sender: &mut SplitSink<WebSocket, Message>,
    update: &QueueUpdate,
    view: SubscribedView,
) -> Result<(), axum::Error> {
    let payload = match view {
        SubscribedView::Full => serde_json::to_string(&update.queue),
        SubscribedView::Tv => serde_json::to_string(&update.tv),
    };

    match payload {
        Ok(json) => sender.send(Message::Text(json)).await,
        Err(e) => {
            tracing::error!("Failed to serialize queue payload: {}", e);
            Ok(())
        }
    }
}
