//! Chat moderation tests: night silence, last words and the mafia's private channel.

use super::super::{ActionKind, MessageVerdict};
use super::test_utils::*;
use crate::error::GameError;

#[test]
fn living_players_are_silenced_at_night() {
    let mut game = create_standard_game();
    assert_eq!(game.chat_message(4), MessageVerdict::Suppress);
    pass_night(&mut game);
    assert_eq!(game.chat_message(4), MessageVerdict::Deliver);
}

#[test]
fn outsiders_are_never_moderated() {
    let mut game = create_standard_game();
    assert_eq!(game.chat_message(99), MessageVerdict::Deliver);
    assert_eq!(create_lobby(4).chat_message(2), MessageVerdict::Deliver);
}

#[test]
fn eliminated_player_gets_exactly_one_message() {
    let mut game = create_standard_game();
    game.record_action(1, ActionKind::Kill, 4).unwrap();
    pass_night(&mut game);
    assert!(game.player(4).unwrap().last_word_allowed);

    assert_eq!(game.chat_message(4), MessageVerdict::LastWord);
    assert_eq!(game.chat_message(4), MessageVerdict::Suppress);
    assert!(!game.player(4).unwrap().last_word_allowed);
}

#[test]
fn last_word_waits_for_daylight() {
    let mut game = create_standard_game();
    pass_night(&mut game);
    vote_all(&mut game, &[1, 2, 3], 5);
    game.resolve_vote().unwrap();

    // Night silences everyone, including a player with a last word left.
    assert_eq!(game.chat_message(5), MessageVerdict::Suppress);
    assert!(game.player(5).unwrap().last_word_allowed);

    pass_night(&mut game);
    assert_eq!(game.chat_message(5), MessageVerdict::LastWord);
    assert_eq!(game.chat_message(5), MessageVerdict::Suppress);
}

#[test]
fn mafia_talk_privately_at_night() {
    let mut game = create_game_with_don();
    assert_eq!(game.mafia_channel(1).unwrap(), vec![2]);
    assert_eq!(game.mafia_channel(2).unwrap(), vec![1]);
    assert!(matches!(game.mafia_channel(3), Err(GameError::NotEligible)));
    assert!(matches!(game.mafia_channel(50), Err(GameError::PlayerNotFound)));

    game.eliminate(2);
    assert!(game.mafia_channel(1).unwrap().is_empty());
    assert!(matches!(game.mafia_channel(2), Err(GameError::PlayerEliminated)));

    pass_night(&mut game);
    assert!(matches!(game.mafia_channel(1), Err(GameError::PhaseEnded)));
}
