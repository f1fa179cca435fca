use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

const MIN_PHASE_SECS: u64 = 10;
const MAX_PHASE_SECS: u64 = 600;
const MIN_PLAYERS_FLOOR: usize = 3;

/// Timing and size settings for a game of Mafia.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct GameSettings {
    /// Seconds the lobby stays open for joins.
    pub lobby_time: u64,
    /// Seconds the night lasts.
    pub night_time: u64,
    /// Seconds the day vote lasts.
    pub vote_time: u64,
    /// Players required when the lobby closes.
    pub min_players: usize,
}

/// A setting that can be adjusted before the game starts.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    LobbyTime,
    NightTime,
    VoteTime,
    MinPlayers,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            lobby_time: 60,
            night_time: 30,
            vote_time: 30,
            min_players: 4,
        }
    }
}

impl GameSettings {
    /// Reads the default settings from the environment, falling back to the built-in
    /// defaults for missing or malformed values.
    pub fn from_env() -> Self {
        fn var<T: FromStr>(name: &str) -> Option<T> {
            std::env::var(name).ok()?.parse().ok()
        }
        let defaults = Self::default();
        Self {
            lobby_time: var("LOBBY_TIME").unwrap_or(defaults.lobby_time),
            night_time: var("NIGHT_TIME").unwrap_or(defaults.night_time),
            vote_time: var("VOTE_TIME").unwrap_or(defaults.vote_time),
            min_players: var("MIN_PLAYERS").unwrap_or(defaults.min_players),
        }
        .clamped()
    }

    pub fn lobby_duration(&self) -> Duration {
        Duration::from_secs(self.lobby_time)
    }

    pub fn night_duration(&self) -> Duration {
        Duration::from_secs(self.night_time)
    }

    pub fn vote_duration(&self) -> Duration {
        Duration::from_secs(self.vote_time)
    }

    /// Applies a signed change to one setting, clamping it to its allowed range.
    pub fn adjust(&mut self, key: SettingKey, delta: i64) {
        let shift = |value: u64| value.saturating_add_signed(delta);
        match key {
            SettingKey::LobbyTime => self.lobby_time = shift(self.lobby_time),
            SettingKey::NightTime => self.night_time = shift(self.night_time),
            SettingKey::VoteTime => self.vote_time = shift(self.vote_time),
            SettingKey::MinPlayers => {
                self.min_players = shift(self.min_players as u64).min(usize::MAX as u64) as usize
            }
        }
        *self = self.clamped();
    }

    fn clamped(self) -> Self {
        Self {
            lobby_time: self.lobby_time.clamp(MIN_PHASE_SECS, MAX_PHASE_SECS),
            night_time: self.night_time.clamp(MIN_PHASE_SECS, MAX_PHASE_SECS),
            vote_time: self.vote_time.clamp(MIN_PHASE_SECS, MAX_PHASE_SECS),
            min_players: self.min_players.clamp(MIN_PLAYERS_FLOOR, super::MAX_PLAYERS),
        }
    }
}

impl FromStr for SettingKey {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lobby_time" => Ok(SettingKey::LobbyTime),
            "night_time" => Ok(SettingKey::NightTime),
            "vote_time" => Ok(SettingKey::VoteTime),
            "min_players" => Ok(SettingKey::MinPlayers),
            _ => Err(GameError::UnknownSetting),
        }
    }
}
