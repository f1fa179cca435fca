//! Helpers for building games in a known state.

use super::super::player::Role;
use super::super::{Game, GameSettings, Phase, PlayerId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const CHAT: i64 = -100;

/// Creates an open lobby with players 1..=num_players, player 1 being the creator.
pub fn create_lobby(num_players: i64) -> Game {
    let mut game = Game::new(CHAT, 1, 1, "Player1", GameSettings::default());
    for id in 2..=num_players {
        game.join(id, &format!("Player{}", id)).unwrap();
    }
    game
}

/// Creates and starts a game with randomly dealt roles.
pub fn create_started_game(num_players: i64, seed: u64) -> Game {
    let mut game = create_lobby(num_players);
    game.settings.min_players = 3;
    game.start(&mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
    game
}

/// Creates a game on its first night where player `i + 1` holds `roles[i]`.
pub fn create_game_with_roles(roles: &[Role]) -> Game {
    let mut game = create_lobby(roles.len() as i64);
    for (player, role) in game.players.iter_mut().zip(roles) {
        player.role = Some(*role);
    }
    game.lobby_open = false;
    game.begin_night();
    game
}

/// The standard five player table: mafia, sheriff, doctor and two civilians.
pub fn create_standard_game() -> Game {
    create_game_with_roles(&[
        Role::Mafia,
        Role::Sheriff,
        Role::Doctor,
        Role::Civilian,
        Role::Civilian,
    ])
}

/// An eight player table with a don and a second mafia member.
pub fn create_game_with_don() -> Game {
    create_game_with_roles(&[
        Role::Don,
        Role::Mafia,
        Role::Sheriff,
        Role::Doctor,
        Role::Civilian,
        Role::Civilian,
        Role::Civilian,
        Role::Civilian,
    ])
}

/// Resolves the current night, expecting the game to reach the day vote.
pub fn pass_night(game: &mut Game) {
    assert_eq!(game.phase, Phase::Night);
    game.resolve_night().unwrap();
    assert_eq!(game.phase, Phase::DayVote);
}

/// Casts the same day vote for every listed voter.
pub fn vote_all(game: &mut Game, voters: &[PlayerId], target: PlayerId) {
    for voter in voters {
        game.record_action(*voter, super::super::ActionKind::Vote, target)
            .unwrap();
    }
}

/// The ids of the players holding the given role.
pub fn players_with_role(game: &Game, role: Role) -> Vec<PlayerId> {
    game.players
        .iter()
        .filter(|p| p.role == Some(role))
        .map(|p| p.id)
        .collect()
}
