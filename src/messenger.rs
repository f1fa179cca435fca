use crate::game::{ActionKind, ChatId, PlayerId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

/// A notification for the chat front end.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outbound {
    ChatText {
        chat_id: ChatId,
        text: String,
    },
    PlayerText {
        player_id: PlayerId,
        text: String,
    },
    DeleteMessage {
        chat_id: ChatId,
        message_id: i64,
    },
    /// Asks a player privately to pick a target.
    PlayerPrompt {
        player_id: PlayerId,
        text: String,
        actions: Vec<ActionKind>,
        options: Vec<TargetOption>,
    },
    /// Asks the whole chat to pick a target.
    ChatPrompt {
        chat_id: ChatId,
        text: String,
        action: ActionKind,
        options: Vec<TargetOption>,
    },
}

/// A player that can be chosen in a prompt.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetOption {
    pub player_id: PlayerId,
    pub name: String,
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("no gateway is connected")]
    NoGateway,
}

/// Delivers notifications. Delivery is best-effort and must not block.
pub trait Messenger: Send + Sync {
    fn deliver(&self, message: Outbound) -> Result<(), DeliveryError>;
}

/// Fans notifications out to every connected gateway.
#[derive(Clone)]
pub struct GatewayMessenger {
    tx: broadcast::Sender<Outbound>,
}

impl GatewayMessenger {
    pub fn new(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.tx.subscribe()
    }
}

impl Messenger for GatewayMessenger {
    fn deliver(&self, message: Outbound) -> Result<(), DeliveryError> {
        self.tx
            .send(message)
            .map(|_| ())
            .map_err(|_| DeliveryError::NoGateway)
    }
}

/// Records every notification, optionally failing deliveries to chosen players.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct RecordingMessenger {
    sent: std::sync::Arc<std::sync::Mutex<Vec<Outbound>>>,
    unreachable: std::sync::Arc<std::sync::Mutex<Vec<PlayerId>>>,
}

#[cfg(test)]
impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(&self, player: PlayerId) {
        self.unreachable.lock().unwrap().push(player);
    }

    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts sent to the given chat.
    pub fn chat_texts(&self, chat: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m {
                Outbound::ChatText { chat_id, text } if chat_id == chat => Some(text),
                Outbound::ChatPrompt { chat_id, text, .. } if chat_id == chat => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Texts sent privately to the given player.
    pub fn player_texts(&self, player: PlayerId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m {
                Outbound::PlayerText { player_id, text } if player_id == player => Some(text),
                Outbound::PlayerPrompt { player_id, text, .. } if player_id == player => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl Messenger for RecordingMessenger {
    fn deliver(&self, message: Outbound) -> Result<(), DeliveryError> {
        let recipient = match &message {
            Outbound::PlayerText { player_id, .. } | Outbound::PlayerPrompt { player_id, .. } => {
                Some(*player_id)
            }
            _ => None,
        };
        if let Some(player) = recipient {
            if self.unreachable.lock().unwrap().contains(&player) {
                return Err(DeliveryError::NoGateway);
            }
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}
