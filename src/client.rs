use crate::{
    error::GameError,
    game::{ActionKind, ChatId, PlayerId, SettingKey},
    session::GameManager,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// A command sent by a chat front end on behalf of one of its users.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    StartLobby {
        chat_id: ChatId,
        player_id: PlayerId,
        name: String,
    },
    Join {
        chat_id: ChatId,
        player_id: PlayerId,
        name: String,
    },
    CancelLobby {
        chat_id: ChatId,
        player_id: PlayerId,
    },
    ForceStop {
        chat_id: ChatId,
    },
    InstantStart {
        chat_id: ChatId,
        player_id: PlayerId,
    },
    RecordAction {
        chat_id: ChatId,
        player_id: PlayerId,
        action: ActionKind,
        target: PlayerId,
    },
    AdjustSetting {
        chat_id: ChatId,
        key: SettingKey,
        delta: i64,
    },
    Settings {
        chat_id: ChatId,
    },
    Players {
        chat_id: ChatId,
    },
    /// A message posted in the game chat, to be allowed or deleted.
    ChatMessage {
        chat_id: ChatId,
        player_id: PlayerId,
        message_id: i64,
    },
    /// A private message to the bot, relayed to the sender's mafia teammates.
    PrivateMessage {
        chat_id: ChatId,
        player_id: PlayerId,
        text: String,
    },
    Stats {
        player_id: PlayerId,
    },
}

/// A connected front end. Forwards commands to the game manager.
pub struct Client {
    manager: &'static GameManager,
}

impl Client {
    pub fn new(manager: &'static GameManager) -> Self {
        Self { manager }
    }

    /// Runs a command, returning the data to include in the reply.
    pub fn handle(&self, req: Request) -> Result<Value, GameError> {
        let manager = self.manager;
        match req {
            Request::StartLobby {
                chat_id,
                player_id,
                name,
            } => manager.start_lobby(chat_id, player_id, &name)?,
            Request::Join {
                chat_id,
                player_id,
                name,
            } => manager.join(chat_id, player_id, &name)?,
            Request::CancelLobby { chat_id, player_id } => manager.cancel_lobby(chat_id, player_id)?,
            Request::ForceStop { chat_id } => manager.force_stop(chat_id)?,
            Request::InstantStart { chat_id, player_id } => manager.instant_start(chat_id, player_id)?,
            Request::RecordAction {
                chat_id,
                player_id,
                action,
                target,
            } => manager.record_action(chat_id, player_id, action, target)?,
            Request::AdjustSetting {
                chat_id,
                key,
                delta,
            } => {
                let settings = manager.adjust_setting(chat_id, key, delta)?;
                return Ok(json!({ "settings": settings }));
            }
            Request::Settings { chat_id } => {
                let settings = manager.settings(chat_id)?;
                return Ok(json!({ "settings": settings }));
            }
            Request::Players { chat_id } => manager.show_players(chat_id)?,
            Request::ChatMessage {
                chat_id,
                player_id,
                message_id,
            } => {
                let verdict = manager.chat_message(chat_id, player_id, message_id)?;
                return Ok(json!({ "verdict": verdict }));
            }
            Request::PrivateMessage {
                chat_id,
                player_id,
                text,
            } => {
                let relayed = manager.private_message(chat_id, player_id, &text)?;
                return Ok(json!({ "relayed": relayed }));
            }
            Request::Stats { player_id } => {
                return Ok(json!({ "stats": manager.stats(player_id) }));
            }
        }
        Ok(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameSettings;
    use crate::messenger::RecordingMessenger;
    use crate::stats::MemoryStats;
    use crate::store::MemoryStore;

    fn client() -> Client {
        let manager = GameManager::new(
            Box::new(MemoryStore::new()),
            Box::new(MemoryStats::new()),
            Box::new(RecordingMessenger::new()),
            GameSettings::default(),
        );
        Client::new(Box::leak(Box::new(manager)))
    }

    #[test]
    fn parses_commands() {
        let req: Request = serde_json::from_str(
            r#"{"type": "record_action", "chat_id": -5, "player_id": 1, "action": "heal", "target": 2}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            Request::RecordAction {
                chat_id: -5,
                player_id: 1,
                action: ActionKind::Heal,
                target: 2
            }
        );

        let req: Request =
            serde_json::from_str(r#"{"type": "adjust_setting", "chat_id": 3, "key": "night_time", "delta": -5}"#)
                .unwrap();
        assert!(matches!(
            req,
            Request::AdjustSetting {
                key: SettingKey::NightTime,
                delta: -5,
                ..
            }
        ));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(serde_json::from_str::<Request>(r#"{"type": "vote_everyone"}"#).is_err());
        assert!(serde_json::from_str::<Request>(r#"{"type": "join", "chat_id": 1}"#).is_err());
        assert!(serde_json::from_str::<Request>(
            r#"{"type": "adjust_setting", "chat_id": 1, "key": "roles", "delta": 1}"#
        )
        .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn forwards_commands_to_manager() {
        let client = client();
        let reply = client
            .handle(Request::StartLobby {
                chat_id: 1,
                player_id: 10,
                name: "Alex".into(),
            })
            .unwrap();
        assert_eq!(reply, Value::Null);

        let reply = client.handle(Request::Settings { chat_id: 1 }).unwrap();
        assert_eq!(reply["settings"]["lobby_time"], 60);

        let reply = client
            .handle(Request::ChatMessage {
                chat_id: 1,
                player_id: 10,
                message_id: 4,
            })
            .unwrap();
        assert_eq!(reply["verdict"], "deliver");

        let err = client
            .handle(Request::CancelLobby {
                chat_id: 1,
                player_id: 11,
            })
            .unwrap_err();
        assert!(matches!(err, GameError::NotCreator));
    }
}
