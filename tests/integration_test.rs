use std::sync::Arc;
use wordbasket::protocol::{ClientMessage, GameStateView, ServerMessage};
use wordbasket::room::Room;
use wordbasket::state::AppState;
use wordbasket::types::{Card, SessionStatus};
use wordbasket::ws::handlers::handle_message;

fn play(word: &str) -> ClientMessage {
    ClientMessage::PlayWord {
        word: word.to_string(),
        card_index: None,
    }
}

fn expect_rejection(reply: Option<ServerMessage>, code: &str) {
    match reply {
        Some(ServerMessage::Rejected {
            valid, reason_code, ..
        }) => {
            assert!(!valid);
            assert_eq!(reason_code, code);
        }
        other => panic!("Expected {} rejection, got {:?}", code, other),
    }
}

async fn view_for(room: &Room, player_id: &str) -> GameStateView {
    match room.snapshot_for(player_id, None).await {
        ServerMessage::GameState(view) => view,
        other => panic!("Expected GameState, got {:?}", other),
    }
}

async fn set_hand(room: &Room, player_id: &str, hand: Vec<Card>) {
    room.session
        .lock()
        .await
        .player_mut(player_id)
        .expect("player should exist")
        .hand = hand;
}

/// End-to-end integration test for a complete three-player game
#[tokio::test]
async fn test_full_game_flow() {
    let state = Arc::new(AppState::default());

    // 1. Setup: open a room and seat three players
    let room = state.rooms.create_room().await;
    let (alice, bob, carol) = {
        let mut session = room.session.lock().await;
        (
            session.join(None, "Alice").player_id,
            session.join(None, "Bob").player_id,
            session.join(None, "Carol").player_id,
        )
    };
    for id in [&alice, &bob, &carol] {
        room.connect(id).await;
    }

    // 2. Only the host may start
    expect_rejection(
        handle_message(ClientMessage::StartGame, &bob, &room).await,
        "NOT_HOST",
    );
    assert!(handle_message(ClientMessage::StartGame, &alice, &room)
        .await
        .is_none());

    let view = view_for(&room, &bob).await;
    assert_eq!(view.status, SessionStatus::Playing);
    assert_eq!(view.my_hand.len(), 7);
    assert_eq!(view.deck_count, 64 - 21);
    assert!(!view.is_host);
    assert!(view.players_info.iter().all(|p| p.is_connected));

    // Starting twice is refused
    expect_rejection(
        handle_message(ClientMessage::StartGame, &alice, &room).await,
        "GAME_IN_PROGRESS",
    );

    // 3. Fix the table so the rest of the game is deterministic
    room.session.lock().await.current_word = "ゲーム開始_あ".to_string();
    set_hand(&room, &alice, vec![Card::char('す')]).await;
    set_hand(&room, &bob, vec![Card::char('う'), Card::length(4)]).await;
    set_hand(
        &room,
        &carol,
        vec![Card::char('か'), Card::row("ま行", "まみむめも"), Card::length(5)],
    )
    .await;

    // 4. Bob plays an ordinary word
    expect_rejection(handle_message(play("いさう"), &bob, &room).await, "WRONG_START_CHAR");
    expect_rejection(handle_message(play("あさん"), &bob, &room).await, "NO_MATCHING_CARD");
    expect_rejection(
        handle_message(
            ClientMessage::PlayWord {
                word: "あさん".to_string(),
                card_index: Some(0),
            },
            &bob,
            &room,
        )
        .await,
        "ENDS_WITH_N",
    );
    assert!(handle_message(play("あさう"), &bob, &room).await.is_none());

    let view = view_for(&room, &carol).await;
    assert_eq!(view.current_word, "あさう");
    assert_eq!(view.target_char, Some('う'));
    assert_eq!(view.discard_count, 1);

    // 5. Alice goes out with her last card, opening a challenge
    expect_rejection(handle_message(play("うです"), &alice, &room).await, "TOO_SHORT");
    assert!(handle_message(play("うぐいす"), &alice, &room).await.is_none());

    let view = view_for(&room, &bob).await;
    assert_eq!(view.status, SessionStatus::FinishingCheck);
    assert_eq!(view.finishing_player_id.as_deref(), Some(alice.as_str()));
    assert_eq!(view.active_voting_players, 2);

    // Moves are frozen while the challenge is open
    expect_rejection(handle_message(play("すいか"), &carol, &room).await, "NOT_PLAYING");

    // 6. Voting: no self-votes, no double votes
    expect_rejection(
        handle_message(ClientMessage::Approve, &alice, &room).await,
        "OWN_MOVE",
    );
    assert!(handle_message(ClientMessage::Approve, &bob, &room)
        .await
        .is_none());
    expect_rejection(
        handle_message(ClientMessage::Reject, &bob, &room).await,
        "ALREADY_VOTED",
    );
    assert!(view_for(&room, &bob).await.has_voted);

    // A 1-1 split among all voters confirms the finish
    assert!(handle_message(ClientMessage::Reject, &carol, &room)
        .await
        .is_none());

    let view = view_for(&room, &carol).await;
    assert_eq!(view.status, SessionStatus::Playing);
    assert_eq!(view.winner.as_deref(), Some("Alice"));
    assert_eq!(view.ranks.len(), 1);
    assert_eq!(view.current_word, "うぐいす");
    assert!(!view.game_over);

    // Alice is out for the rest of the game
    expect_rejection(
        handle_message(ClientMessage::Reroll, &alice, &room).await,
        "ALREADY_FINISHED",
    );

    // 7. Carol exchanges her char card, resetting the target
    assert!(handle_message(ClientMessage::Exchange { card_index: 0 }, &carol, &room)
        .await
        .is_none());
    let view = view_for(&room, &carol).await;
    assert_eq!(view.current_word, "リロード_か");
    assert_eq!(view.target_char, Some('か'));
    assert_eq!(view.my_hand.len(), 4);

    // 8. Bob goes out, but both others reject
    assert!(handle_message(play("かまきり"), &bob, &room).await.is_none());
    assert_eq!(
        room.session.lock().await.status,
        SessionStatus::FinishingCheck
    );
    assert!(handle_message(ClientMessage::Reject, &alice, &room)
        .await
        .is_none());
    assert!(handle_message(ClientMessage::Reject, &carol, &room)
        .await
        .is_none());

    let view = view_for(&room, &bob).await;
    assert_eq!(view.status, SessionStatus::Playing);
    assert_eq!(view.current_word, "リロード_か");
    assert_eq!(view.my_hand, vec![Card::length(4)]);
    assert_eq!(view.ranks.len(), 1);

    // 9. Second attempt is approved; Carol is ranked last automatically
    assert!(handle_message(play("かまきり"), &bob, &room).await.is_none());
    assert!(handle_message(ClientMessage::Approve, &alice, &room)
        .await
        .is_none());
    assert!(handle_message(ClientMessage::Approve, &carol, &room)
        .await
        .is_none());

    let view = view_for(&room, &alice).await;
    assert_eq!(view.status, SessionStatus::Finished);
    assert!(view.game_over);
    let order: Vec<(&str, Option<u32>)> = view
        .ranks
        .iter()
        .map(|p| (p.name.as_str(), p.rank))
        .collect();
    assert_eq!(
        order,
        vec![("Alice", Some(1)), ("Bob", Some(2)), ("Carol", Some(3))]
    );

    // 10. The host can deal a fresh game from the finished table
    assert!(handle_message(ClientMessage::StartGame, &alice, &room)
        .await
        .is_none());
    let view = view_for(&room, &alice).await;
    assert_eq!(view.status, SessionStatus::Playing);
    assert!(view.ranks.is_empty());
    assert_eq!(view.my_hand.len(), 7);
}

#[tokio::test]
async fn test_view_hand_and_lobby_leave() {
    let state = Arc::new(AppState::default());
    let room = state.rooms.create_room().await;
    let (alice, bob) = {
        let mut session = room.session.lock().await;
        (
            session.join(None, "Alice").player_id,
            session.join(None, "Bob").player_id,
        )
    };

    // Host leaves the lobby; Bob takes over
    assert!(handle_message(ClientMessage::Leave, &alice, &room)
        .await
        .is_none());
    assert!(view_for(&room, &bob).await.is_host);

    let carol = room.session.lock().await.join(None, "Carol").player_id;
    assert!(handle_message(ClientMessage::StartGame, &bob, &room)
        .await
        .is_none());

    // Leaving mid-game is refused
    expect_rejection(
        handle_message(ClientMessage::Leave, &carol, &room).await,
        "GAME_IN_PROGRESS",
    );

    let expected = room.session.lock().await.player(&bob).unwrap().hand.clone();
    match handle_message(
        ClientMessage::ViewHand {
            target_id: bob.clone(),
        },
        &carol,
        &room,
    )
    .await
    {
        Some(ServerMessage::ViewHand {
            target_id,
            target_name,
            hand,
        }) => {
            assert_eq!(target_id, bob);
            assert_eq!(target_name, "Bob");
            assert_eq!(hand, expected);
        }
        other => panic!("Expected ViewHand, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reconnect_keeps_identity() {
    let state = Arc::new(AppState::default());
    let room = state.rooms.create_room().await;

    let first = room.session.lock().await.join(None, "Alice");
    assert!(!first.reconnected);

    let again = room
        .session
        .lock()
        .await
        .join(Some(&first.player_id), "Alice (phone)");
    assert!(again.reconnected);
    assert_eq!(again.player_id, first.player_id);
    assert_eq!(again.name, "Alice");
    assert_eq!(room.session.lock().await.players.len(), 1);
}
