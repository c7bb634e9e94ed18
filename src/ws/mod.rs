pub mod handlers;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::IntoResponse,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::room::{Room, RoomEvent};
use crate::state::AppState;

/// Close code sent when the requested room does not exist
pub const ROOM_NOT_FOUND_CODE: u16 = 4000;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub player_id: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path((room_code, player_name)): Path<(String, String)>,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!(
        "WebSocket connection request: room={}, name={}, player_id={:?}",
        room_code,
        player_name,
        params.player_id
    );

    ws.on_upgrade(move |socket| handle_socket(socket, room_code, player_name, params, state))
}

async fn send_json(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(e) => {
            tracing::error!("Failed to serialize message: {}", e);
            Ok(())
        }
    }
}

/// Handle individual WebSocket connection
async fn handle_socket(
    mut socket: WebSocket,
    room_code: String,
    player_name: String,
    params: WsQuery,
    state: Arc<AppState>,
) {
    let Some(room) = state.rooms.get(&room_code).await else {
        tracing::warn!("WebSocket for unknown room {}", room_code);
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: ROOM_NOT_FOUND_CODE,
                reason: "Room not found".into(),
            })))
            .await;
        return;
    };

    let joined = room
        .session
        .lock()
        .await
        .join(params.player_id.as_deref(), &player_name);
    let player_id = joined.player_id.clone();
    room.connect(&player_id).await;

    let (mut sender, mut receiver) = socket.split();

    let welcome = ServerMessage::Welcome {
        protocol: "1.0".to_string(),
        player_id: player_id.clone(),
        room_code: room.code.clone(),
        reconnected: joined.reconnected,
        server_now: chrono::Utc::now().to_rfc3339(),
    };
    if send_json(&mut sender, &welcome).await.is_err() {
        tracing::error!("Failed to send welcome message");
        room.disconnect(&player_id).await;
        return;
    }

    let mut events = room.subscribe();
    let verb = if joined.reconnected {
        "再接続しました"
    } else {
        "参加しました"
    };
    room.notify(Some(format!("{}さんが{}", joined.name, verb)));

    let mut left = false;
    loop {
        tokio::select! {
            event = events.recv() => {
                let snapshot = match event {
                    Ok(RoomEvent::StateChanged { message }) => {
                        room.snapshot_for(&player_id, message).await
                    }
                    Ok(RoomEvent::Terminated { message }) => {
                        let _ = send_json(&mut sender, &ServerMessage::ReturnToTitle { message }).await;
                        break;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Player {} lagged {} room events", player_id, skipped);
                        room.snapshot_for(&player_id, None).await
                    }
                    Err(RecvError::Closed) => break,
                };
                if send_json(&mut sender, &snapshot).await.is_err() {
                    break;
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message from {}: {}", player_id, text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                let leaving = matches!(client_msg, ClientMessage::Leave);
                                match handlers::handle_message(client_msg, &player_id, &room).await {
                                    Some(response) => {
                                        if send_json(&mut sender, &response).await.is_err() {
                                            tracing::error!("Failed to send response");
                                            break;
                                        }
                                    }
                                    None if leaving => {
                                        left = true;
                                        break;
                                    }
                                    None => {}
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                let _ = send_json(&mut sender, &error).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed by {}", player_id);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    on_disconnect(&state, &room, &player_id, left).await;
    tracing::info!("WebSocket connection closed for player {}", player_id);
}

/// Release one channel. The host dropping its last channel closes the room.
async fn on_disconnect(state: &AppState, room: &Arc<Room>, player_id: &str, left: bool) {
    if room.disconnect(player_id).await || left {
        return;
    }

    let player = room
        .session
        .lock()
        .await
        .player(player_id)
        .map(|p| (p.name.clone(), p.is_host));
    let Some((name, is_host)) = player else {
        return;
    };

    if is_host {
        tracing::info!("Host {} left room {}, closing it", name, room.code);
        room.terminate("ホストが切断しました。タイトルに戻ります。".to_string());
        state.rooms.remove(&room.code).await;
    } else {
        room.notify(Some(format!("{}さんが切断しました", name)));
    }
}
