use crate::room::Room;
use crate::session::Resolution;
use std::sync::Arc;

/// Text announced to the room when a challenge resolves
pub fn resolution_message(resolution: &Resolution, name_of: impl Fn(&str) -> String) -> String {
    match resolution {
        Resolution::Confirmed(finish) => {
            let mut msg = format!(
                "{}さんが{}位で確定しました！",
                name_of(&finish.player_id),
                finish.rank
            );
            if finish.game_over {
                msg.push_str(" ゲーム終了！");
            } else {
                msg.push_str(" ゲームを続けます。");
            }
            msg
        }
        Resolution::Reverted { player_id } => {
            format!("{}さんの上がりは却下されました", name_of(player_id))
        }
    }
}

/// Spawn the timer that forces a decision on a challenge.
///
/// If the challenge was already settled by votes, or replaced by a newer one,
/// the timer does nothing when it fires.
pub fn spawn_challenge_timer(room: Arc<Room>, challenge_id: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(room.challenge_timeout).await;

        let message = {
            let mut session = room.session.lock().await;
            let Some(resolution) = session.resolve_timeout(challenge_id) else {
                tracing::debug!(
                    "Room {}: timer for challenge {} fired after resolution",
                    room.code,
                    challenge_id
                );
                return;
            };
            let name_of = |id: &str| {
                session
                    .player(id)
                    .map(|p| p.name.clone())
                    .unwrap_or_default()
            };
            format!("投票時間終了。{}", resolution_message(&resolution, name_of))
        };

        room.notify(Some(message));
    });
}
