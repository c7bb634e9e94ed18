//! Challenge period opened by a hand-emptying move.
//!
//! Votes and the timeout all funnel into [`Session::confirm`] or
//! [`Session::revert`]. Both are no-ops once the challenge is gone, so a vote
//! racing the timer can never rank a player twice.

use super::Session;
use crate::error::{GameError, GameResult};
use crate::types::*;
use std::collections::HashSet;

/// Outcome of confirming a finish
#[derive(Debug, Clone, PartialEq)]
pub struct FinishOutcome {
    pub player_id: PlayerId,
    pub rank: u32,
    /// Last remaining player ranked without playing out
    pub auto_ranked: Option<PlayerId>,
    pub game_over: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Confirmed(FinishOutcome),
    Reverted { player_id: PlayerId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum VoteOutcome {
    Pending,
    Resolved(Resolution),
}

impl Session {
    pub(super) fn open_challenge(
        &mut self,
        player_id: &str,
        previous_word: String,
        returned_card: Card,
    ) -> u64 {
        self.challenge_seq += 1;
        let previous_rank = self.player(player_id).and_then(|p| p.rank);
        self.pending_challenge = Some(ChallengeState {
            id: self.challenge_seq,
            finishing_player_id: player_id.to_string(),
            previous_word,
            returned_card,
            previous_rank,
            approvals: HashSet::new(),
            rejections: HashSet::new(),
        });
        self.set_status(SessionStatus::FinishingCheck);

        tracing::info!(
            "Room {}: {} emptied their hand, challenge {} open",
            self.room_code,
            player_id,
            self.challenge_seq
        );
        self.challenge_seq
    }

    fn check_voter(&self, voter_id: &str) -> GameResult<()> {
        let challenge = self
            .pending_challenge
            .as_ref()
            .ok_or(GameError::NoPendingChallenge)?;
        if self.player(voter_id).is_none() {
            return Err(GameError::PlayerNotFound);
        }
        if challenge.finishing_player_id == voter_id {
            return Err(GameError::OwnMove);
        }
        if challenge.has_voted(voter_id) {
            return Err(GameError::AlreadyVoted);
        }
        Ok(())
    }

    /// Everyone except the challenged player may vote
    fn eligible_voters(&self) -> usize {
        self.players.len().saturating_sub(1)
    }

    /// Resolve by tally once every eligible voter has spoken
    fn resolve_if_complete(&mut self) -> VoteOutcome {
        let Some(challenge) = self.pending_challenge.as_ref() else {
            return VoteOutcome::Pending;
        };
        if challenge.total_votes() < self.eligible_voters() {
            return VoteOutcome::Pending;
        }

        let resolution = if challenge.approval_carries() {
            self.confirm().map(Resolution::Confirmed)
        } else {
            self.revert()
        };
        resolution.map_or(VoteOutcome::Pending, VoteOutcome::Resolved)
    }

    /// Vote to reject the finishing move. A strict majority of all players reverts it.
    pub fn reject_vote(&mut self, voter_id: &str) -> GameResult<VoteOutcome> {
        self.check_voter(voter_id)?;

        let total_players = self.players.len();
        let Some(challenge) = self.pending_challenge.as_mut() else {
            return Err(GameError::NoPendingChallenge);
        };
        challenge.rejections.insert(voter_id.to_string());

        if challenge.rejections.len() * 2 > total_players {
            let resolution = self.revert().ok_or(GameError::NoPendingChallenge)?;
            return Ok(VoteOutcome::Resolved(resolution));
        }
        Ok(self.resolve_if_complete())
    }

    /// Vote to approve the finishing move
    pub fn approve_vote(&mut self, voter_id: &str) -> GameResult<VoteOutcome> {
        self.check_voter(voter_id)?;

        let Some(challenge) = self.pending_challenge.as_mut() else {
            return Err(GameError::NoPendingChallenge);
        };
        challenge.approvals.insert(voter_id.to_string());

        Ok(self.resolve_if_complete())
    }

    /// Forced decision when the voting window closes. Silence counts as approval.
    ///
    /// Returns `None` if the challenge was already resolved or has been replaced
    /// by a newer one.
    pub fn resolve_timeout(&mut self, challenge_id: u64) -> Option<Resolution> {
        let challenge = self.pending_challenge.as_ref()?;
        if challenge.id != challenge_id {
            return None;
        }

        tracing::info!(
            "Room {}: challenge {} timed out ({} approve / {} reject)",
            self.room_code,
            challenge_id,
            challenge.approvals.len(),
            challenge.rejections.len()
        );

        if challenge.total_votes() == 0 || challenge.approval_carries() {
            self.confirm().map(Resolution::Confirmed)
        } else {
            self.revert()
        }
    }

    /// Rank the challenged player and end the game when at most one player is left
    pub fn confirm(&mut self) -> Option<FinishOutcome> {
        let challenge = self.pending_challenge.take()?;
        let player_id = challenge.finishing_player_id;

        self.discard.push(challenge.returned_card);
        let rank = self.assign_next_rank(&player_id);

        let mut auto_ranked = None;
        let remaining = self.unranked_count();
        let game_over = if remaining == 0 {
            true
        } else if remaining == 1 && self.players.len() > 1 {
            if let Some(last_id) = self
                .players
                .iter()
                .find(|p| p.rank.is_none())
                .map(|p| p.id.clone())
            {
                self.assign_next_rank(&last_id);
                auto_ranked = Some(last_id);
            }
            true
        } else {
            false
        };

        if game_over {
            self.set_status(SessionStatus::Finished);
        } else {
            self.set_status(SessionStatus::Playing);
        }

        if game_over {
            tracing::info!(
                "Room {}: game over, ranking {:?}",
                self.room_code,
                self.finished_players
            );
        }

        Some(FinishOutcome {
            player_id,
            rank,
            auto_ranked,
            game_over,
        })
    }

    /// Ranks are permanent; an already ranked player keeps theirs
    fn assign_next_rank(&mut self, player_id: &str) -> u32 {
        if let Some(rank) = self.player(player_id).and_then(|p| p.rank) {
            return rank;
        }
        let rank = self.finished_players.len() as u32 + 1;
        if let Some(player) = self.player_mut(player_id) {
            player.rank = Some(rank);
        }
        self.finished_players.push(player_id.to_string());
        tracing::info!("Room {}: {} finished at rank {}", self.room_code, player_id, rank);
        rank
    }

    /// Undo the finishing move: card back to hand, previous word back on the table
    pub fn revert(&mut self) -> Option<Resolution> {
        let challenge = self.pending_challenge.take()?;
        let player_id = challenge.finishing_player_id;

        if let Some(player) = self.player_mut(&player_id) {
            player.hand.push(challenge.returned_card);
            player.rank = challenge.previous_rank;
        } else {
            self.discard.push(challenge.returned_card);
        }
        self.current_word = challenge.previous_word;
        self.set_status(SessionStatus::Playing);

        tracing::info!("Room {}: finishing move by {} reverted", self.room_code, player_id);
        Some(Resolution::Reverted { player_id })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::started_session;
    use super::*;

    /// p1 holds one card and empties it with あいいい on target あ
    fn challenged_session(player_count: usize) -> Session {
        let mut session = started_session(player_count, "ゲーム開始_あ");
        session.players[0].hand = vec![Card::char('い')];
        session.check_move("p1", "あいいい", 0).unwrap();
        session
    }

    #[test]
    fn test_majority_reject_reverts() {
        let mut session = challenged_session(3);
        let total = session.card_total();

        // 1 of 3 is not a strict majority
        assert_eq!(session.reject_vote("p2"), Ok(VoteOutcome::Pending));
        assert_eq!(session.status, SessionStatus::FinishingCheck);

        let outcome = session.reject_vote("p3").unwrap();
        assert_eq!(
            outcome,
            VoteOutcome::Resolved(Resolution::Reverted {
                player_id: "p1".to_string()
            })
        );
        assert_eq!(session.status, SessionStatus::Playing);
        assert_eq!(session.players[0].hand, vec![Card::char('い')]);
        assert_eq!(session.current_word, "ゲーム開始_あ");
        assert_eq!(session.players[0].rank, None);
        assert!(session.pending_challenge.is_none());
        assert_eq!(session.card_total(), total);
    }

    #[test]
    fn test_double_vote_rejected() {
        let mut session = challenged_session(4);
        session.approve_vote("p2").unwrap();

        assert_eq!(session.approve_vote("p2"), Err(GameError::AlreadyVoted));
        assert_eq!(session.reject_vote("p2"), Err(GameError::AlreadyVoted));

        let challenge = session.pending_challenge.as_ref().unwrap();
        assert_eq!(challenge.approvals.len(), 1);
        assert!(challenge.rejections.is_empty());
    }

    #[test]
    fn test_vote_guards() {
        let mut session = challenged_session(3);
        assert_eq!(session.approve_vote("p1"), Err(GameError::OwnMove));
        assert_eq!(session.reject_vote("ghost"), Err(GameError::PlayerNotFound));

        let mut idle = started_session(3, "ゲーム開始_あ");
        assert_eq!(idle.approve_vote("p2"), Err(GameError::NoPendingChallenge));
        assert_eq!(idle.reject_vote("p2"), Err(GameError::NoPendingChallenge));
    }

    #[test]
    fn test_all_approve_confirms_immediately() {
        let mut session = challenged_session(3);

        assert_eq!(session.approve_vote("p2"), Ok(VoteOutcome::Pending));
        let outcome = session.approve_vote("p3").unwrap();

        match outcome {
            VoteOutcome::Resolved(Resolution::Confirmed(finish)) => {
                assert_eq!(finish.player_id, "p1");
                assert_eq!(finish.rank, 1);
                assert!(!finish.game_over);
            }
            other => panic!("Expected confirmation, got {:?}", other),
        }
        assert_eq!(session.status, SessionStatus::Playing);
        assert_eq!(session.finished_players, vec!["p1".to_string()]);
    }

    #[test]
    fn test_split_vote_approves_on_tie() {
        let mut session = challenged_session(3);
        session.reject_vote("p2").unwrap();
        let outcome = session.approve_vote("p3").unwrap();

        assert!(matches!(
            outcome,
            VoteOutcome::Resolved(Resolution::Confirmed(_))
        ));
        assert_eq!(session.players[0].rank, Some(1));
    }

    #[test]
    fn test_complete_tie_confirms() {
        // 5 players, 4 voters: 2 rejections never exceed 2.5
        let mut session = challenged_session(5);
        session.approve_vote("p2").unwrap();
        session.reject_vote("p3").unwrap();
        assert_eq!(session.reject_vote("p4"), Ok(VoteOutcome::Pending));
        let outcome = session.approve_vote("p5").unwrap();

        assert!(matches!(
            outcome,
            VoteOutcome::Resolved(Resolution::Confirmed(_))
        ));
    }

    #[test]
    fn test_complete_vote_without_majority_reverts() {
        // 4 players, 3 voters: 2 rejections are not > 2, but outvote 1 approval
        let mut session = challenged_session(4);
        session.approve_vote("p2").unwrap();
        assert_eq!(session.reject_vote("p3"), Ok(VoteOutcome::Pending));
        let outcome = session.reject_vote("p4").unwrap();

        assert_eq!(
            outcome,
            VoteOutcome::Resolved(Resolution::Reverted {
                player_id: "p1".to_string()
            })
        );
        assert_eq!(session.status, SessionStatus::Playing);
    }

    #[test]
    fn test_timeout_without_votes_approves() {
        let mut session = challenged_session(3);
        let id = session.pending_challenge.as_ref().unwrap().id;

        let resolution = session.resolve_timeout(id).unwrap();
        assert!(matches!(resolution, Resolution::Confirmed(ref f) if f.rank == 1));
        assert_eq!(session.players[0].rank, Some(1));
    }

    #[test]
    fn test_timeout_tallies_cast_votes() {
        let mut session = challenged_session(4);
        let id = session.pending_challenge.as_ref().unwrap().id;
        session.reject_vote("p2").unwrap();

        let resolution = session.resolve_timeout(id).unwrap();
        assert_eq!(
            resolution,
            Resolution::Reverted {
                player_id: "p1".to_string()
            }
        );
        assert_eq!(session.players[0].hand.len(), 1);
    }

    #[test]
    fn test_stale_timeout_is_noop() {
        let mut session = challenged_session(3);
        let id = session.pending_challenge.as_ref().unwrap().id;
        session.reject_vote("p2").unwrap();
        session.reject_vote("p3").unwrap();

        assert_eq!(session.resolve_timeout(id), None);
        assert_eq!(session.status, SessionStatus::Playing);

        // A new challenge ignores the previous challenge's timer
        session.check_move("p1", "あいいい", 0).unwrap();
        assert_eq!(session.resolve_timeout(id), None);
        assert_eq!(session.status, SessionStatus::FinishingCheck);
        let new_id = session.pending_challenge.as_ref().unwrap().id;
        assert_ne!(new_id, id);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut session = challenged_session(3);
        assert!(session.confirm().is_some());
        assert_eq!(session.confirm(), None);
        assert_eq!(session.revert(), None);

        assert_eq!(session.players[0].rank, Some(1));
        assert_eq!(session.finished_players.len(), 1);
        assert_eq!(session.players[0].hand.len(), 0);
    }

    #[test]
    fn test_ranked_player_cannot_act_again() {
        let mut session = challenged_session(3);
        session.confirm().unwrap();
        assert_eq!(session.status, SessionStatus::Playing);
        let total = session.card_total();

        assert_eq!(session.reroll("p1"), Err(GameError::AlreadyFinished));
        assert_eq!(session.exchange("p1", 0), Err(GameError::AlreadyFinished));
        assert_eq!(
            session.validate_move("p1", "いいいう", 0),
            Err(GameError::AlreadyFinished)
        );
        assert_eq!(
            session.play_word("p1", "いいいう", None),
            Err(GameError::AlreadyFinished)
        );

        assert_eq!(session.players[0].rank, Some(1));
        assert!(session.players[0].hand.is_empty());
        assert_eq!(session.finished_players, vec!["p1".to_string()]);
        assert_eq!(session.card_total(), total);
    }

    #[test]
    fn test_existing_rank_is_never_overwritten() {
        let mut session = challenged_session(3);
        session.confirm().unwrap();

        assert_eq!(session.assign_next_rank("p1"), 1);
        assert_eq!(session.players[0].rank, Some(1));
        assert_eq!(session.finished_players.len(), 1);
    }

    #[test]
    fn test_three_player_game_end() {
        let mut session = started_session(3, "ゲーム開始_あ");
        session.players[0].hand = vec![Card::char('い')];
        session.players[1].hand = vec![Card::char('う'), Card::char('え')];
        session.players[2].hand = vec![Card::char('お'), Card::char('か'), Card::char('き')];

        session.check_move("p1", "あいいい", 0).unwrap();
        let first = session.confirm().unwrap();
        assert_eq!(first.rank, 1);
        assert!(!first.game_over);

        session.check_move("p2", "いいう", 0).unwrap();
        session.check_move("p2", "ういいえ", 0).unwrap();
        assert_eq!(session.status, SessionStatus::FinishingCheck);

        let second = session.confirm().unwrap();
        assert_eq!(second.rank, 2);
        assert!(second.game_over);
        assert_eq!(second.auto_ranked, Some("p3".to_string()));

        assert_eq!(session.status, SessionStatus::Finished);
        assert_eq!(session.players[2].rank, Some(3));
        assert_eq!(
            session.finished_players,
            vec!["p1".to_string(), "p2".to_string(), "p3".to_string()]
        );
    }

    #[test]
    fn test_two_player_game_end() {
        let mut session = challenged_session(2);

        // Single eligible voter decides immediately
        let outcome = session.approve_vote("p2").unwrap();
        match outcome {
            VoteOutcome::Resolved(Resolution::Confirmed(finish)) => {
                assert!(finish.game_over);
                assert_eq!(finish.auto_ranked, Some("p2".to_string()));
            }
            other => panic!("Expected game over, got {:?}", other),
        }
        assert_eq!(session.status, SessionStatus::Finished);
        assert_eq!(session.players[1].rank, Some(2));
    }

    #[test]
    fn test_solo_game_ends_on_confirm() {
        let mut session = challenged_session(1);
        let finish = session.confirm().unwrap();

        assert!(finish.game_over);
        assert_eq!(finish.auto_ranked, None);
        assert_eq!(session.status, SessionStatus::Finished);
    }

    #[test]
    fn test_confirm_moves_card_to_discard() {
        let mut session = challenged_session(3);
        let total = session.card_total();
        let discarded = session.discard.len();

        session.confirm().unwrap();

        assert_eq!(session.discard.len(), discarded + 1);
        assert_eq!(session.card_total(), total);
    }
}
