//! WebSocket message dispatch
//!
//! Each handler mutates the session inside one lock scope, releases it, then
//! tells the room to refresh. Rejections go back to the caller only.

use crate::broadcast::{resolution_message, spawn_challenge_timer};
use crate::error::GameError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::room::Room;
use crate::session::{MoveOutcome, Session, VoteOutcome};
use crate::types::CardKind;
use std::sync::Arc;

fn name_of(session: &Session, player_id: &str) -> String {
    session
        .player(player_id)
        .map(|p| p.name.clone())
        .unwrap_or_default()
}

/// Handle a client message. Returns a direct reply for the sender, if any;
/// accepted mutations are announced to the whole room instead.
pub async fn handle_message(
    msg: ClientMessage,
    player_id: &str,
    room: &Arc<Room>,
) -> Option<ServerMessage> {
    let result = match msg {
        ClientMessage::StartGame => handle_start_game(room, player_id).await,
        ClientMessage::PlayWord { word, card_index } => {
            handle_play_word(room, player_id, &word, card_index).await
        }
        ClientMessage::Approve => handle_vote(room, player_id, true).await,
        ClientMessage::Reject => handle_vote(room, player_id, false).await,
        ClientMessage::Exchange { card_index } => {
            handle_exchange(room, player_id, card_index).await
        }
        ClientMessage::Reroll => handle_reroll(room, player_id).await,
        ClientMessage::SetPriority { priority } => {
            handle_set_priority(room, player_id, &priority).await
        }
        ClientMessage::ViewHand { target_id } => {
            let session = room.session.lock().await;
            return Some(match session.opponent_hand(&target_id) {
                Ok((target_name, hand)) => ServerMessage::ViewHand {
                    target_id,
                    target_name,
                    hand,
                },
                Err(e) => e.into(),
            });
        }
        ClientMessage::Leave => handle_leave(room, player_id).await,
    };

    match result {
        Ok(announcement) => {
            room.notify(announcement);
            None
        }
        Err(e) => {
            tracing::debug!("Room {}: rejected request from {}: {}", room.code, player_id, e);
            Some(e.into())
        }
    }
}

async fn handle_start_game(room: &Arc<Room>, player_id: &str) -> Result<Option<String>, GameError> {
    let mut session = room.session.lock().await;
    session.ensure_host(player_id)?;
    session.start()?;
    Ok(Some(format!(
        "{}さんがゲームを開始しました！",
        name_of(&session, player_id)
    )))
}

async fn handle_play_word(
    room: &Arc<Room>,
    player_id: &str,
    word: &str,
    card_index: Option<usize>,
) -> Result<Option<String>, GameError> {
    let (outcome, name) = {
        let mut session = room.session.lock().await;
        let outcome = session.play_word(player_id, word, card_index)?;
        (outcome, name_of(&session, player_id))
    };

    let message = match outcome {
        MoveOutcome::Played { word, .. } => format!("{}さんが「{}」を出しました！", name, word),
        MoveOutcome::FinishingCheck {
            word, challenge_id, ..
        } => {
            spawn_challenge_timer(room.clone(), challenge_id);
            format!(
                "{}さんが「{}」で手札を出し切りました！承認または拒否してください",
                name, word
            )
        }
    };
    Ok(Some(message))
}

async fn handle_vote(
    room: &Arc<Room>,
    player_id: &str,
    approve: bool,
) -> Result<Option<String>, GameError> {
    let mut session = room.session.lock().await;
    let outcome = if approve {
        session.approve_vote(player_id)?
    } else {
        session.reject_vote(player_id)?
    };

    let message = match outcome {
        VoteOutcome::Pending => {
            let verb = if approve { "承諾" } else { "拒否" };
            format!("{}さんが{}しました", name_of(&session, player_id), verb)
        }
        VoteOutcome::Resolved(resolution) => {
            resolution_message(&resolution, |id| name_of(&session, id))
        }
    };
    Ok(Some(message))
}

async fn handle_exchange(
    room: &Arc<Room>,
    player_id: &str,
    card_index: usize,
) -> Result<Option<String>, GameError> {
    let mut session = room.session.lock().await;
    session.exchange(player_id, card_index)?;
    Ok(Some(format!(
        "{}さんが手札を交換しました",
        name_of(&session, player_id)
    )))
}

async fn handle_reroll(room: &Arc<Room>, player_id: &str) -> Result<Option<String>, GameError> {
    let mut session = room.session.lock().await;
    let hand_size = session.reroll(player_id)?;
    Ok(Some(format!(
        "{}さんがリロールしました（{}枚）",
        name_of(&session, player_id),
        hand_size
    )))
}

async fn handle_set_priority(
    room: &Arc<Room>,
    player_id: &str,
    priority: &[CardKind],
) -> Result<Option<String>, GameError> {
    room.session
        .lock()
        .await
        .set_priority(player_id, priority)?;
    Ok(None)
}

async fn handle_leave(room: &Arc<Room>, player_id: &str) -> Result<Option<String>, GameError> {
    let player = room.session.lock().await.remove_player(player_id)?;
    Ok(Some(format!("{}さんが退出しました", player.name)))
}
