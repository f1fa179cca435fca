pub use self::action::{ActionKind, SheriffAction};
pub use self::announce::role_text;
pub use self::chat::MessageVerdict;
pub use self::options::{GameSettings, SettingKey};
pub use self::player::{Player, Role, Team};
pub use self::resolve::{CheckResult, DayOutcome, NightOutcome};
pub use self::votes::Tally;
use self::player::assign_roles;
use self::votes::Ballots;
use crate::error::GameError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod action;
mod announce;
mod chat;
mod options;
mod player;
mod resolve;
mod test;
mod votes;

pub const MAX_PLAYERS: usize = 20;

/// Identifies the chat a game is played in.
pub type ChatId = i64;

/// Identifies a player across chats.
pub type PlayerId = i64;

/// A game of Mafia, as persisted between operations.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Game {
    chat_id: ChatId,
    /// Distinguishes this game from earlier games in the same chat.
    game_id: u64,
    phase: Phase,
    lobby_open: bool,
    creator_id: PlayerId,
    /// In join order.
    players: Vec<Player>,
    settings: GameSettings,
    mafia_votes: Ballots,
    vote_votes: Ballots,
    doctor_target: Option<PlayerId>,
    sheriff_target: Option<PlayerId>,
    sheriff_action: Option<SheriffAction>,
    /// The current night/day cycle, starting at 1 on the first night.
    day: u32,
    started: DateTime<Utc>,
}

/// Represents the current phase in the game loop.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Night,
    DayVote,
    Ended,
}

impl Game {
    /// Opens a new lobby. The creator is the first player to join.
    pub fn new(
        chat_id: ChatId,
        game_id: u64,
        creator_id: PlayerId,
        creator_name: &str,
        settings: GameSettings,
    ) -> Self {
        Self {
            chat_id,
            game_id,
            phase: Phase::Lobby,
            lobby_open: true,
            creator_id,
            players: vec![Player::new(creator_id, creator_name.to_string())],
            settings,
            mafia_votes: Ballots::new(),
            vote_votes: Ballots::new(),
            doctor_target: None,
            sheriff_target: None,
            sheriff_action: None,
            day: 0,
            started: Utc::now(),
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn game_id(&self) -> u64 {
        self.game_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn lobby_open(&self) -> bool {
        self.lobby_open
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }

    /// Gets the players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Gets the display name of a player, or a placeholder for unknown ids.
    pub fn name_of(&self, id: PlayerId) -> &str {
        self.player(id).map(|p| &p.name[..]).unwrap_or("?")
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.player(id).map(|p| p.alive).unwrap_or(false)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &'_ Player> {
        self.players.iter().filter(|p| p.alive)
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    /// Gets the number of living players on the given team.
    pub fn num_alive(&self, team: Team) -> usize {
        self.alive_players().filter(|p| p.team() == Some(team)).count()
    }

    /// Adds a player to the lobby.
    pub fn join(&mut self, id: PlayerId, name: &str) -> Result<(), GameError> {
        if !self.lobby_open {
            return Err(GameError::LobbyClosed);
        }
        if self.player(id).is_some() {
            return Err(GameError::AlreadyJoined);
        }
        if self.players.len() == MAX_PLAYERS {
            return Err(GameError::TooManyPlayers);
        }
        self.players.push(Player::new(id, name.to_string()));
        Ok(())
    }

    /// Changes a setting while the lobby is still open.
    pub fn adjust_setting(&mut self, key: SettingKey, delta: i64) -> Result<GameSettings, GameError> {
        if !self.lobby_open {
            return Err(GameError::SettingsLocked);
        }
        self.settings.adjust(key, delta);
        Ok(self.settings)
    }

    /// Returns `Err` unless the given player created this game.
    pub fn check_creator(&self, requester: PlayerId) -> Result<(), GameError> {
        if requester == self.creator_id {
            Ok(())
        } else {
            Err(GameError::NotCreator)
        }
    }

    /// Returns `Ok` if the lobby can be closed and the game started.
    pub fn can_start(&self) -> Result<(), GameError> {
        if !self.lobby_open || self.phase != Phase::Lobby {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() < self.settings.min_players {
            return Err(GameError::TooFewPlayers {
                min: self.settings.min_players,
            });
        }
        Ok(())
    }

    /// Closes the lobby, deals the roles and begins the first night.
    pub fn start(&mut self, rng: &mut impl rand::Rng) -> Result<(), GameError> {
        self.can_start()?;
        let roles = assign_roles(self.players.len(), rng);
        for (player, role) in self.players.iter_mut().zip(roles) {
            player.role = Some(role);
        }
        self.lobby_open = false;
        self.begin_night();
        Ok(())
    }

    fn begin_night(&mut self) {
        self.phase = Phase::Night;
        self.day += 1;
        self.mafia_votes.clear();
        self.vote_votes.clear();
        self.doctor_target = None;
        self.sheriff_target = None;
        self.sheriff_action = None;
    }

    fn begin_vote(&mut self) {
        self.phase = Phase::DayVote;
        self.vote_votes.clear();
    }

    /// Gets the living players that must be prompted for a night action.
    pub fn night_actors(&self) -> impl Iterator<Item = &'_ Player> {
        self.alive_players()
            .filter(|p| p.role.map(Role::acts_at_night).unwrap_or(false))
    }

    /// Lists every player for the end-of-game reveal: mafia-aligned first, then civilians,
    /// each group in join order.
    pub fn transcript(&self) -> Vec<&Player> {
        let (mut mafia, civilians): (Vec<_>, Vec<_>) =
            self.players.iter().partition(|p| p.is_mafia());
        mafia.extend(civilians);
        mafia
    }
}
