use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::models::timestamp_now;
use crate::ws::events::{ClientEvent, ServerEvent};
use crate::ws::gateway::ClientId;
use crate::AppState;

/// WebSocket upgrade handler. The room is public; no credentials required.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let client_id = state.gateway.next_client_id().await;
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Create mpsc channel for sending messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    state.gateway.register(client_id, tx).await;
    state.presence.connect(client_id).await;

    tracing::debug!("client {} connected", client_id);

    // Everyone, the new client included, sees the updated counter
    let count = state.presence.count().await;
    state
        .gateway
        .broadcast_all(&ServerEvent::UserCount { count }, None)
        .await;

    // Task to forward messages from mpsc to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(WsMessage::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Receive loop
    let state_clone = state.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                WsMessage::Text(text) => {
                    let text_str: &str = &text;
                    if let Ok(event) = serde_json::from_str::<ClientEvent>(text_str) {
                        handle_client_event(&state_clone, client_id, event).await;
                    }
                }
                WsMessage::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    // Clean up: drop the connection, then per-name state if this was the
    // last connection holding the name
    state.gateway.unregister(client_id).await;

    if let Some(released) = state.presence.release(client_id).await {
        if released.last_for_name {
            if let Some(name) = released.name {
                state.limiter.forget(&name).await;
                state
                    .gateway
                    .broadcast_all(
                        &ServerEvent::UserLeft {
                            name,
                            timestamp: timestamp_now(),
                        },
                        None,
                    )
                    .await;
            }
        }
    }

    let count = state.presence.count().await;
    state
        .gateway
        .broadcast_all(&ServerEvent::UserCount { count }, None)
        .await;

    tracing::debug!("client {} disconnected", client_id);
}

async fn handle_client_event(state: &AppState, client_id: ClientId, event: ClientEvent) {
    match event {
        ClientEvent::JoinChat { name } => {
            if let Err(e) = parley_shared::validation::validate_username(&name) {
                state
                    .gateway
                    .send_to(client_id, &ServerEvent::Error { message: e })
                    .await;
                return;
            }

            // Only the first live claim of a name announces a join; extra
            // tabs under the same name stay silent
            if state.presence.claim(client_id, &name).await {
                state
                    .gateway
                    .broadcast_all(
                        &ServerEvent::UserJoined {
                            name,
                            timestamp: timestamp_now(),
                        },
                        Some(client_id),
                    )
                    .await;
            }
        }
        ClientEvent::TypingStart { name } => {
            state
                .gateway
                .broadcast_all(
                    &ServerEvent::UserTyping { name, typing: true },
                    Some(client_id),
                )
                .await;
        }
        ClientEvent::TypingStop { name } => {
            state
                .gateway
                .broadcast_all(
                    &ServerEvent::UserTyping {
                        name,
                        typing: false,
                    },
                    Some(client_id),
                )
                .await;
        }
        ClientEvent::Ping => {}
    }
}
