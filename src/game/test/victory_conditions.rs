//! Victory condition tests.

use super::super::player::Role;
use super::super::{ActionKind, Phase, Team};
use super::test_utils::*;

#[test]
fn civilians_win_when_mafia_is_voted_out() {
    let mut game = create_standard_game();
    pass_night(&mut game);
    vote_all(&mut game, &[2, 3, 4, 5], 1);
    let outcome = game.resolve_vote().unwrap();

    assert_eq!(outcome.winner, Some(Team::Civilian));
    assert_eq!(game.phase, Phase::Ended);
    assert!(game.final_text(Team::Civilian).contains("The civilians win"));
}

#[test]
fn mafia_wins_at_parity_after_night() {
    let mut game = create_game_with_roles(&[
        Role::Don,
        Role::Mafia,
        Role::Sheriff,
        Role::Doctor,
        Role::Civilian,
    ]);
    game.record_action(1, ActionKind::Kill, 5).unwrap();
    let outcome = game.resolve_night().unwrap();
    assert_eq!(outcome.winner, Some(Team::Mafia));
    assert_eq!(game.phase, Phase::Ended);
}

#[test]
fn mafia_wins_at_parity_after_vote() {
    let mut game = create_game_with_roles(&[Role::Mafia, Role::Sheriff, Role::Doctor, Role::Civilian]);
    game.record_action(1, ActionKind::Kill, 4).unwrap();
    assert_eq!(game.resolve_night().unwrap().winner, None);
    vote_all(&mut game, &[1, 2], 3);
    let outcome = game.resolve_vote().unwrap();
    assert_eq!(outcome.eliminated, Some(3));
    assert_eq!(outcome.winner, Some(Team::Mafia));
}

#[test]
fn win_skips_remaining_night_eliminations() {
    let mut game = create_game_with_roles(&[
        Role::Don,
        Role::Mafia,
        Role::Sheriff,
        Role::Doctor,
        Role::Civilian,
    ]);
    game.record_action(1, ActionKind::Kill, 5).unwrap();
    game.record_action(3, ActionKind::Shoot, 2).unwrap();
    let outcome = game.resolve_night().unwrap();

    assert_eq!(outcome.killed, vec![5]);
    assert_eq!(outcome.winner, Some(Team::Mafia));
    assert!(game.is_alive(2));
}

#[test]
fn sheriff_shot_can_win_the_game() {
    let mut game = create_standard_game();
    game.record_action(1, ActionKind::Kill, 4).unwrap();
    game.record_action(2, ActionKind::Shoot, 1).unwrap();
    let outcome = game.resolve_night().unwrap();
    assert_eq!(outcome.killed, vec![4, 1]);
    assert_eq!(outcome.winner, Some(Team::Civilian));
}

#[test]
fn only_living_winners_have_won() {
    let mut game = create_standard_game();
    game.record_action(1, ActionKind::Kill, 4).unwrap();
    pass_night(&mut game);
    vote_all(&mut game, &[2, 3, 5], 1);
    let winner = game.resolve_vote().unwrap().winner.unwrap();

    assert!(game.player_has_won(2, winner));
    assert!(game.player_has_won(5, winner));
    assert!(!game.player_has_won(4, winner));
    assert!(!game.player_has_won(1, winner));
    assert!(!game.player_has_won(42, winner));
}

#[test]
fn no_winner_while_teams_are_unbalanced() {
    let game = create_game_with_don();
    assert_eq!(game.winner(), None);
    assert_eq!(create_lobby(5).winner(), None);
}

#[test]
fn reveal_lists_mafia_first() {
    let game = create_game_with_roles(&[
        Role::Civilian,
        Role::Sheriff,
        Role::Mafia,
        Role::Doctor,
        Role::Don,
    ]);
    let order: Vec<_> = game.transcript().iter().map(|p| p.id).collect();
    assert_eq!(order, vec![3, 5, 1, 2, 4]);
}
