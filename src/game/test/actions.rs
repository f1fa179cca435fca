//! Action validation tests. Every rejected action must leave the game untouched.

use super::super::{ActionKind, Phase, SheriffAction, Tally};
use super::test_utils::*;
use crate::error::GameError;

#[test]
fn night_actions_are_recorded() {
    let mut game = create_standard_game();
    game.record_action(1, ActionKind::Kill, 4).unwrap();
    game.record_action(2, ActionKind::Check, 1).unwrap();
    game.record_action(3, ActionKind::Heal, 5).unwrap();

    assert_eq!(game.mafia_votes.tally(|_, _| true), Tally::Winner(4));
    assert_eq!(game.sheriff_target, Some(1));
    assert_eq!(game.sheriff_action, Some(SheriffAction::Check));
    assert_eq!(game.doctor_target, Some(5));
}

#[test]
fn later_choice_replaces_earlier() {
    let mut game = create_standard_game();
    game.record_action(2, ActionKind::Check, 1).unwrap();
    game.record_action(2, ActionKind::Shoot, 4).unwrap();
    assert_eq!(game.sheriff_target, Some(4));
    assert_eq!(game.sheriff_action, Some(SheriffAction::Shoot));

    game.record_action(1, ActionKind::Kill, 4).unwrap();
    game.record_action(1, ActionKind::Kill, 5).unwrap();
    assert_eq!(game.mafia_votes.tally(|_, _| true), Tally::Winner(5));
}

#[test]
fn roles_may_only_use_their_own_actions() {
    let mut game = create_standard_game();
    let before = game.clone();
    for (actor, kind) in [
        (4, ActionKind::Kill),
        (2, ActionKind::Heal),
        (3, ActionKind::Check),
        (1, ActionKind::Shoot),
        (5, ActionKind::Heal),
    ] {
        assert!(
            matches!(game.record_action(actor, kind, 1), Err(GameError::NotEligible)),
            "{} using {:?}",
            actor,
            kind
        );
    }
    assert_eq!(game, before);
}

#[test]
fn don_votes_with_the_mafia() {
    let mut game = create_game_with_don();
    game.record_action(1, ActionKind::Kill, 5).unwrap();
    game.record_action(2, ActionKind::Kill, 6).unwrap();
    assert_eq!(game.mafia_votes.tally(|_, _| true), Tally::Tie(vec![5, 6]));
}

#[test]
fn only_doctor_may_target_themselves() {
    let mut game = create_standard_game();
    game.record_action(3, ActionKind::Heal, 3).unwrap();
    assert_eq!(game.doctor_target, Some(3));

    assert!(matches!(game.record_action(1, ActionKind::Kill, 1), Err(GameError::SelfTarget)));
    assert!(matches!(game.record_action(2, ActionKind::Check, 2), Err(GameError::SelfTarget)));
    assert!(matches!(game.record_action(2, ActionKind::Shoot, 2), Err(GameError::SelfTarget)));
}

#[test]
fn targets_must_be_living_players() {
    let mut game = create_standard_game();
    game.eliminate(4);
    let before = game.clone();
    assert!(matches!(
        game.record_action(1, ActionKind::Kill, 4),
        Err(GameError::InvalidPlayerChoice)
    ));
    assert!(matches!(
        game.record_action(1, ActionKind::Kill, 77),
        Err(GameError::InvalidPlayerChoice)
    ));
    assert_eq!(game, before);
}

#[test]
fn eliminated_and_unknown_players_cannot_act() {
    let mut game = create_standard_game();
    game.eliminate(3);
    assert!(matches!(
        game.record_action(3, ActionKind::Heal, 4),
        Err(GameError::PlayerEliminated)
    ));
    assert!(matches!(
        game.record_action(99, ActionKind::Kill, 4),
        Err(GameError::PlayerNotFound)
    ));
}

#[test]
fn actions_outside_their_phase_are_rejected() {
    let mut game = create_standard_game();
    assert!(matches!(game.record_action(4, ActionKind::Vote, 1), Err(GameError::PhaseEnded)));

    pass_night(&mut game);
    assert!(matches!(game.record_action(1, ActionKind::Kill, 4), Err(GameError::PhaseEnded)));
    assert!(matches!(game.record_action(3, ActionKind::Heal, 4), Err(GameError::PhaseEnded)));
    game.record_action(4, ActionKind::Vote, 1).unwrap();
}

#[test]
fn lobby_accepts_no_actions() {
    let mut game = create_lobby(4);
    assert_eq!(game.phase, Phase::Lobby);
    assert!(matches!(game.record_action(1, ActionKind::Vote, 2), Err(GameError::PhaseEnded)));
}

#[test]
fn prompts_offer_living_targets() {
    let mut game = create_standard_game();
    game.eliminate(5);

    let ids = |kind, actor| -> Vec<_> { game.targets(actor, kind).iter().map(|p| p.id).collect() };
    assert_eq!(ids(ActionKind::Kill, 1), vec![2, 3, 4]);
    assert_eq!(ids(ActionKind::Heal, 3), vec![1, 2, 3, 4]);

    let actors: Vec<_> = game.night_actors().map(|p| p.id).collect();
    assert_eq!(actors, vec![1, 2, 3]);
}
