use super::Session;
use crate::protocol::{GameStateView, PlayerSummary};
use crate::types::*;
use std::collections::HashSet;

impl Session {
    fn summarize(&self, player: &Player, connected: &HashSet<PlayerId>) -> PlayerSummary {
        PlayerSummary {
            player_id: player.id.clone(),
            name: player.name.clone(),
            hand_count: player.hand.len(),
            is_host: player.is_host,
            rank: player.rank,
            is_connected: connected.contains(&player.id),
        }
    }

    /// Snapshot of the room as seen by one recipient
    pub fn snapshot_for(
        &self,
        viewer_id: &str,
        connected: &HashSet<PlayerId>,
        dictionary_size: usize,
        message: Option<String>,
    ) -> GameStateView {
        let challenge = self.pending_challenge.as_ref();
        let finishing_player_id = challenge.map(|c| c.finishing_player_id.clone());

        let ranks: Vec<PlayerSummary> = self
            .finished_players
            .iter()
            .filter_map(|id| self.player(id))
            .map(|p| self.summarize(p, connected))
            .collect();
        let winner = ranks.first().map(|p| p.name.clone());

        let active_voting_players = self
            .players
            .iter()
            .filter(|p| p.rank.is_none() && Some(&p.id) != finishing_player_id.as_ref())
            .count();

        let viewer = self.player(viewer_id);

        GameStateView {
            room_code: self.room_code.clone(),
            status: self.status,
            current_word: self.current_word.clone(),
            target_char: self.target_char(),
            deck_count: self.deck.len(),
            discard_count: self.discard.len(),
            dictionary_size,
            message,
            game_over: self.status == SessionStatus::Finished,
            winner,
            ranks,
            approval_votes: challenge.map_or(0, |c| c.approvals.len()),
            rejection_votes: challenge.map_or(0, |c| c.rejections.len()),
            active_players: self.players.len(),
            active_voting_players,
            finishing_player_id,
            players_info: self
                .players
                .iter()
                .map(|p| self.summarize(p, connected))
                .collect(),
            my_player_id: viewer_id.to_string(),
            my_hand: viewer.map(|p| p.hand.clone()).unwrap_or_default(),
            is_host: viewer.is_some_and(|p| p.is_host),
            my_priority: viewer.map_or(DEFAULT_PRIORITY, |p| p.card_priority),
            has_voted: challenge.is_some_and(|c| c.has_voted(viewer_id)),
        }
    }
}
