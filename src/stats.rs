use crate::game::PlayerId;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-player counters kept across games.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerStats {
    pub games: u64,
    pub wins: u64,
    /// Times eliminated, at night or by the day vote.
    #[serde(default)]
    pub deaths: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatField {
    Games,
    Wins,
    Deaths,
}

impl PlayerStats {
    fn bump(&mut self, field: StatField) {
        match field {
            StatField::Games => self.games += 1,
            StatField::Wins => self.wins += 1,
            StatField::Deaths => self.deaths += 1,
        }
    }
}

/// A sink for player statistics. Increments are fire-and-forget: failures are logged
/// by the implementation and never reported to the game.
pub trait StatsLedger: Send + Sync {
    fn increment(&self, player: PlayerId, field: StatField);
    fn get(&self, player: PlayerId) -> PlayerStats;
}

/// Stores statistics in a sled tree, one JSON record per player.
#[derive(Clone)]
pub struct SledStats {
    tree: sled::Tree,
}

impl SledStats {
    pub fn new(db: &sled::Db) -> Result<Self, sled::Error> {
        Ok(Self {
            tree: db.open_tree("stats")?,
        })
    }
}

impl StatsLedger for SledStats {
    fn increment(&self, player: PlayerId, field: StatField) {
        // update_and_fetch retries the closure until the swap succeeds, so concurrent
        // increments for the same player are not lost
        let result = self.tree.update_and_fetch(player.to_be_bytes(), |old| {
            let mut stats = old
                .and_then(|bytes| serde_json::from_slice::<PlayerStats>(bytes).ok())
                .unwrap_or_default();
            stats.bump(field);
            serde_json::to_vec(&stats).ok()
        });
        if let Err(err) = result {
            log::error!("Could not update stats for player {}: {}", player, err);
        }
    }

    fn get(&self, player: PlayerId) -> PlayerStats {
        self.tree
            .get(player.to_be_bytes())
            .ok()
            .flatten()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default()
    }
}

/// Keeps statistics in memory.
#[derive(Clone, Default)]
pub struct MemoryStats {
    stats: Arc<DashMap<PlayerId, PlayerStats>>,
}

impl MemoryStats {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsLedger for MemoryStats {
    fn increment(&self, player: PlayerId, field: StatField) {
        self.stats.entry(player).or_default().bump(field);
    }

    fn get(&self, player: PlayerId) -> PlayerStats {
        self.stats.get(&player).map(|s| *s).unwrap_or_default()
    }
}
