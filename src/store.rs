use crate::game::{ChatId, Game, Team};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sled::Error),
    #[error("could not encode record: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Durable storage for the games in progress, keyed by chat.
///
/// Each call reads or writes a whole [Game] record. Callers that load, mutate and save
/// must serialise those steps per chat themselves.
pub trait GameStore: Send + Sync {
    /// Loads the game for a chat. Records that cannot be decoded are reported as missing.
    fn load(&self, chat_id: ChatId) -> Result<Option<Game>, StoreError>;
    fn save(&self, game: &Game) -> Result<(), StoreError>;
    fn delete(&self, chat_id: ChatId) -> Result<(), StoreError>;
    /// Lists every decodable game in the store.
    fn list_active(&self) -> Result<Vec<Game>, StoreError>;
    /// Keeps a summary of a finished game.
    fn archive(&self, record: &ArchivedGame) -> Result<(), StoreError>;
}

/// A summary of a finished game.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ArchivedGame {
    pub chat_id: ChatId,
    pub game_id: u64,
    pub players: Vec<String>,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub winner: Team,
    pub days: u32,
}

impl ArchivedGame {
    pub fn new(game: &Game, winner: Team) -> Self {
        Self {
            chat_id: game.chat_id(),
            game_id: game.game_id(),
            players: game.players().iter().map(|p| p.name.clone()).collect(),
            started: game.started(),
            finished: Utc::now(),
            winner,
            days: game.day(),
        }
    }
}

/// The databases that games are persisted to.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    games: sled::Tree,
    archive: sled::Tree,
}

impl SledStore {
    pub fn new(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            db: db.clone(),
            games: db.open_tree("games")?,
            archive: db.open_tree("archive")?,
        })
    }
}

/// Decodes a stored game. Corrupt records are logged and read as no game, so a new lobby can
/// replace them.
fn decode_game(key: impl Display, value: &[u8]) -> Option<Game> {
    match serde_json::from_slice(value) {
        Ok(game) => Some(game),
        Err(err) => {
            log::error!("Ignoring corrupt game record {}: {}", key, err);
            None
        }
    }
}

impl GameStore for SledStore {
    fn load(&self, chat_id: ChatId) -> Result<Option<Game>, StoreError> {
        let key = chat_id.to_string();
        let Some(value) = self.games.get(key.as_bytes())? else {
            return Ok(None);
        };
        Ok(decode_game(&key, &value))
    }

    fn save(&self, game: &Game) -> Result<(), StoreError> {
        let value = serde_json::to_vec(game)?;
        self.games.insert(game.chat_id().to_string().as_bytes(), value)?;
        Ok(())
    }

    fn delete(&self, chat_id: ChatId) -> Result<(), StoreError> {
        self.games.remove(chat_id.to_string().as_bytes())?;
        Ok(())
    }

    fn list_active(&self) -> Result<Vec<Game>, StoreError> {
        let mut games = vec![];
        for entry in self.games.iter() {
            let (key, value) = entry?;
            games.extend(decode_game(String::from_utf8_lossy(&key), &value));
        }
        Ok(games)
    }

    fn archive(&self, record: &ArchivedGame) -> Result<(), StoreError> {
        let key = self.db.generate_id()?.to_be_bytes();
        self.archive.insert(key, serde_json::to_vec(record)?)?;
        Ok(())
    }
}

/// Keeps games in memory as encoded records, for tests and ephemeral deployments.
#[derive(Clone, Default)]
pub struct MemoryStore {
    games: Arc<DashMap<ChatId, Vec<u8>>>,
    archive: Arc<Mutex<Vec<ArchivedGame>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites a record with raw bytes.
    #[cfg(test)]
    pub fn insert_raw(&self, chat_id: ChatId, value: &[u8]) {
        self.games.insert(chat_id, value.to_vec());
    }

    #[cfg(test)]
    pub fn archived(&self) -> Vec<ArchivedGame> {
        self.archive.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl GameStore for MemoryStore {
    fn load(&self, chat_id: ChatId) -> Result<Option<Game>, StoreError> {
        let Some(value) = self.games.get(&chat_id) else {
            return Ok(None);
        };
        Ok(decode_game(chat_id, value.value()))
    }

    fn save(&self, game: &Game) -> Result<(), StoreError> {
        self.games.insert(game.chat_id(), serde_json::to_vec(game)?);
        Ok(())
    }

    fn delete(&self, chat_id: ChatId) -> Result<(), StoreError> {
        self.games.remove(&chat_id);
        Ok(())
    }

    fn list_active(&self) -> Result<Vec<Game>, StoreError> {
        Ok(self
            .games
            .iter()
            .filter_map(|entry| decode_game(entry.key(), entry.value()))
            .collect())
    }

    fn archive(&self, record: &ArchivedGame) -> Result<(), StoreError> {
        if let Ok(mut archive) = self.archive.lock() {
            archive.push(record.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameSettings, Team};

    fn temp_store() -> SledStore {
        let db = sled::Config::new().temporary(true).open().unwrap();
        SledStore::new(&db).unwrap()
    }

    fn lobby(chat_id: ChatId) -> Game {
        let mut game = Game::new(chat_id, 7, 1, "Alex", GameSettings::default());
        game.join(2, "Bob").unwrap();
        game
    }

    #[test]
    fn sled_store_round_trips_games() {
        let store = temp_store();
        let game = lobby(-100);
        store.save(&game).unwrap();
        assert_eq!(store.load(-100).unwrap(), Some(game));
        assert_eq!(store.load(-200).unwrap(), None);
    }

    #[test]
    fn sled_store_lists_and_deletes() {
        let store = temp_store();
        store.save(&lobby(1)).unwrap();
        store.save(&lobby(2)).unwrap();
        assert_eq!(store.list_active().unwrap().len(), 2);
        store.delete(1).unwrap();
        assert_eq!(store.load(1).unwrap(), None);
        assert_eq!(store.list_active().unwrap().len(), 1);
    }

    #[test]
    fn corrupt_records_read_as_missing() {
        let store = temp_store();
        store.games.insert(b"5", b"{not json".to_vec()).unwrap();
        store.save(&lobby(6)).unwrap();
        assert_eq!(store.load(5).unwrap(), None);
        assert_eq!(store.list_active().unwrap().len(), 1);
    }

    #[test]
    fn archive_keeps_finished_games() {
        let store = temp_store();
        let record = ArchivedGame::new(&lobby(3), Team::Civilian);
        store.archive(&record).unwrap();
        assert_eq!(store.archive.len(), 1);
    }

    #[test]
    fn decoding_garbage_yields_no_game() {
        assert_eq!(decode_game(4, b"{\"chat_id\": 4"), None);
        assert_eq!(decode_game("4", b""), None);
        let game = lobby(4);
        assert_eq!(decode_game(4, &serde_json::to_vec(&game).unwrap()), Some(game));
    }

    #[test]
    fn memory_store_fails_closed_on_garbage() {
        let store = MemoryStore::new();
        store.insert_raw(9, b"garbage");
        assert_eq!(store.load(9).unwrap(), None);
        assert!(store.list_active().unwrap().is_empty());
    }
}
