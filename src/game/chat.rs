use super::{Game, Phase, PlayerId};
use crate::error::GameError;
use serde::Serialize;

/// Whether a message sent to the game chat may stay there.
#[derive(Clone, Copy, Serialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum MessageVerdict {
    Deliver,
    /// Delivered as the sender's one permitted message after elimination.
    LastWord,
    Suppress,
}

impl Game {
    /// Decides whether a chat message from `sender` is allowed. Every player is silenced at
    /// night. Otherwise an eliminated player may send one last message, consumed here.
    pub fn chat_message(&mut self, sender: PlayerId) -> MessageVerdict {
        let night = self.phase == Phase::Night;
        let Some(player) = self.player_mut(sender) else {
            return MessageVerdict::Deliver;
        };
        if night {
            return MessageVerdict::Suppress;
        }
        if !player.alive {
            if player.last_word_allowed {
                player.last_word_allowed = false;
                return MessageVerdict::LastWord;
            }
            return MessageVerdict::Suppress;
        }
        MessageVerdict::Deliver
    }

    /// Gets the teammates a night message from a mafia-aligned player is relayed to.
    pub fn mafia_channel(&self, sender: PlayerId) -> Result<Vec<PlayerId>, GameError> {
        if self.phase != Phase::Night {
            return Err(GameError::PhaseEnded);
        }
        let player = self.player(sender).ok_or(GameError::PlayerNotFound)?;
        if !player.alive {
            return Err(GameError::PlayerEliminated);
        }
        if !player.is_mafia() {
            return Err(GameError::NotEligible);
        }
        Ok(self
            .alive_players()
            .filter(|p| p.is_mafia() && p.id != sender)
            .map(|p| p.id)
            .collect())
    }
}
