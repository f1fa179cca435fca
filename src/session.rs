use crate::driver::{run_game, run_lobby_timer};
use crate::error::GameError;
use crate::game::{
    role_text, ActionKind, ChatId, Game, GameSettings, MessageVerdict, Phase, PlayerId, SettingKey, Team,
};
use crate::messenger::{Messenger, Outbound, TargetOption};
use crate::stats::{PlayerStats, StatField, StatsLedger};
use crate::store::{ArchivedGame, GameStore};
use dashmap::DashMap;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex, PoisonError};

/// Manages all the games running on the server.
///
/// The store is the only shared state: every command loads the chat's game, changes it and
/// saves it back while holding that chat's lock. Notifications go out after the lock is
/// released, and a failed delivery never fails the command.
pub struct GameManager {
    store: Box<dyn GameStore>,
    stats: Box<dyn StatsLedger>,
    messenger: Box<dyn Messenger>,
    /// Settings for newly created lobbies.
    defaults: GameSettings,
    locks: DashMap<ChatId, Arc<Mutex<()>>>,
}

impl GameManager {
    pub fn new(
        store: Box<dyn GameStore>,
        stats: Box<dyn StatsLedger>,
        messenger: Box<dyn Messenger>,
        defaults: GameSettings,
    ) -> Self {
        Self {
            store,
            stats,
            messenger,
            defaults,
            locks: DashMap::new(),
        }
    }

    /// Restarts the timers of every game found in the store, e.g. after a restart.
    /// Returns the number of games resumed.
    pub fn resume(&'static self) -> usize {
        let games = match self.store.list_active() {
            Ok(games) => games,
            Err(err) => {
                log::error!("Could not list active games: {}", err);
                return 0;
            }
        };

        let mut resumed = 0;
        for game in games {
            let (chat_id, game_id) = (game.chat_id(), game.game_id());
            match (game.phase(), game.lobby_open()) {
                (Phase::Lobby, true) => {
                    tokio::spawn(run_lobby_timer(self, chat_id, game_id));
                }
                (Phase::Night | Phase::DayVote, _) => {
                    tokio::spawn(run_game(self, chat_id, game_id));
                }
                _ => {
                    log::warn!("Discarding unresumable game {} in chat {}", game_id, chat_id);
                    self.store.delete(chat_id).ok();
                    continue;
                }
            }
            resumed += 1;
        }
        resumed
    }

    /// Opens a lobby in the given chat.
    pub fn start_lobby(
        &'static self,
        chat_id: ChatId,
        creator_id: PlayerId,
        creator_name: &str,
    ) -> Result<(), GameError> {
        let game = {
            let lock = self.lock(chat_id);
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            if self.store.load(chat_id)?.is_some() {
                return Err(GameError::GameAlreadyRunning);
            }
            let game_id = rand::thread_rng().gen();
            let game = Game::new(chat_id, game_id, creator_id, creator_name, self.defaults);
            self.store.save(&game)?;
            game
        };

        log::info!("Opened lobby {} in chat {}", game.game_id(), chat_id);
        self.send_to_chat(chat_id, game.lobby_text());
        tokio::spawn(run_lobby_timer(self, chat_id, game.game_id()));
        Ok(())
    }

    /// Adds a player to the open lobby.
    pub fn join(&self, chat_id: ChatId, player_id: PlayerId, name: &str) -> Result<(), GameError> {
        let text = self.mutate(chat_id, |game| {
            game.join(player_id, name)?;
            Ok(game.lobby_text())
        })?;
        self.send_to_chat(chat_id, text);
        Ok(())
    }

    /// Cancels the lobby. Only the creator may do this, and only before the game starts.
    pub fn cancel_lobby(&self, chat_id: ChatId, requester: PlayerId) -> Result<(), GameError> {
        self.remove(chat_id, |game| {
            game.check_creator(requester)?;
            if !game.lobby_open() {
                return Err(GameError::AlreadyStarted);
            }
            Ok(())
        })?;
        self.send_to_chat(chat_id, "🚫 The lobby was cancelled.");
        Ok(())
    }

    /// Stops the game in the chat, whatever its phase.
    pub fn force_stop(&self, chat_id: ChatId) -> Result<(), GameError> {
        self.remove(chat_id, |_| Ok(()))?;
        self.send_to_chat(chat_id, "🛑 The game was stopped.");
        Ok(())
    }

    /// Closes the lobby early at the creator's request and starts the game.
    pub fn instant_start(&'static self, chat_id: ChatId, requester: PlayerId) -> Result<(), GameError> {
        let game = self.mutate(chat_id, |game| {
            game.check_creator(requester)?;
            game.start(&mut Self::rng())?;
            Ok(game.clone())
        })?;
        self.launch(&game);
        Ok(())
    }

    /// Records a night action or day vote.
    pub fn record_action(
        &self,
        chat_id: ChatId,
        actor: PlayerId,
        kind: ActionKind,
        target: PlayerId,
    ) -> Result<(), GameError> {
        let ack = self.mutate(chat_id, |game| {
            game.record_action(actor, kind, target)?;
            Ok(game.action_ack_text(kind, target))
        })?;
        self.send_to_player(actor, ack);
        Ok(())
    }

    /// Changes a setting of the open lobby.
    pub fn adjust_setting(
        &self,
        chat_id: ChatId,
        key: SettingKey,
        delta: i64,
    ) -> Result<GameSettings, GameError> {
        let (settings, text) = self.mutate(chat_id, |game| {
            let settings = game.adjust_setting(key, delta)?;
            Ok((settings, game.settings_text()))
        })?;
        self.send_to_chat(chat_id, text);
        Ok(settings)
    }

    /// Posts the current settings to the chat.
    pub fn settings(&self, chat_id: ChatId) -> Result<GameSettings, GameError> {
        let game = self.load(chat_id)?;
        self.send_to_chat(chat_id, game.settings_text());
        Ok(game.settings())
    }

    /// Posts the players and whether they are still alive to the chat.
    pub fn show_players(&self, chat_id: ChatId) -> Result<(), GameError> {
        let game = self.load(chat_id)?;
        self.send_to_chat(chat_id, game.roster_text());
        Ok(())
    }

    /// Decides whether a message in the game chat may stay. Suppressed messages are deleted.
    pub fn chat_message(
        &self,
        chat_id: ChatId,
        sender: PlayerId,
        message_id: i64,
    ) -> Result<MessageVerdict, GameError> {
        let verdict = {
            let lock = self.lock(chat_id);
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(mut game) = self.store.load(chat_id)? else {
                return Ok(MessageVerdict::Deliver);
            };
            let verdict = game.chat_message(sender);
            if verdict == MessageVerdict::LastWord {
                self.store.save(&game)?;
            }
            verdict
        };
        if verdict == MessageVerdict::Suppress {
            self.deliver(Outbound::DeleteMessage { chat_id, message_id });
        }
        Ok(verdict)
    }

    /// Relays a night message from a mafia-aligned player to their living teammates.
    /// Returns the number of teammates it was relayed to.
    pub fn private_message(&self, chat_id: ChatId, sender: PlayerId, text: &str) -> Result<usize, GameError> {
        let game = self.load(chat_id)?;
        let teammates = game.mafia_channel(sender)?;
        for teammate in teammates.iter() {
            self.send_to_player(*teammate, format!("🔫 {}: {}", game.name_of(sender), text));
        }
        Ok(teammates.len())
    }

    pub fn stats(&self, player: PlayerId) -> PlayerStats {
        self.stats.get(player)
    }

    /// Loads the game if it is still the given instance.
    pub(crate) fn snapshot(&self, chat_id: ChatId, game_id: u64) -> Option<Game> {
        match self.store.load(chat_id) {
            Ok(game) => game.filter(|game| game.game_id() == game_id),
            Err(err) => {
                log::error!("Could not load game in chat {}: {}", chat_id, err);
                None
            }
        }
    }

    /// Called when the lobby timer expires. Starts the game, or deletes it if too few
    /// players joined. Does nothing if the lobby is no longer the one the timer was set for.
    pub(crate) fn close_lobby(&'static self, chat_id: ChatId, game_id: u64) {
        match self.start_locked(chat_id, game_id) {
            Some(Ok(game)) => self.launch(&game),
            Some(Err(_)) => {
                self.release(chat_id);
                self.send_to_chat(chat_id, "❌ Not enough players, the lobby is closed.");
            }
            None => self.release(chat_id),
        }
    }

    /// Starts the lobby under the chat's lock. Returns the started game, the reason the lobby
    /// was deleted instead, or `None` if the lobby is no longer the one the timer was set for.
    fn start_locked(&self, chat_id: ChatId, game_id: u64) -> Option<Result<Game, GameError>> {
        let lock = self.lock(chat_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut game = match self.store.load(chat_id) {
            Ok(Some(game)) if game.game_id() == game_id && game.lobby_open() => game,
            Ok(_) => return None,
            Err(err) => {
                log::error!("Could not load lobby in chat {}: {}", chat_id, err);
                return None;
            }
        };
        if let Err(err) = game.start(&mut Self::rng()) {
            log::info!("Closing lobby {} in chat {}: {}", game_id, chat_id, err);
            if let Err(err) = self.store.delete(chat_id) {
                log::error!("Could not delete lobby in chat {}: {}", chat_id, err);
            }
            return Some(Err(err));
        }
        if let Err(err) = self.store.save(&game) {
            log::error!("Could not save game in chat {}: {}", chat_id, err);
            return None;
        }
        Some(Ok(game))
    }

    /// Sends out the roles of a freshly started game and starts its driver.
    fn launch(&'static self, game: &Game) {
        log::info!(
            "Starting game {} in chat {} with {} players",
            game.game_id(),
            game.chat_id(),
            game.num_players()
        );
        for player in game.players() {
            if let Some(role) = player.role {
                self.send_to_player(player.id, role_text(role));
            }
        }
        tokio::spawn(run_game(self, game.chat_id(), game.game_id()));
    }

    /// Announces the night and prompts every living player with a night action.
    pub(crate) fn prompt_night(&self, game: &Game) {
        self.send_to_chat(game.chat_id(), game.night_text());
        for player in game.night_actors() {
            let Some(role) = player.role else {
                continue;
            };
            let actions = ActionKind::night_actions(role);
            let Some(first) = actions.first() else {
                continue;
            };
            let options = game
                .targets(player.id, *first)
                .into_iter()
                .map(|p| TargetOption {
                    player_id: p.id,
                    name: p.name.clone(),
                })
                .collect();
            self.deliver(Outbound::PlayerPrompt {
                player_id: player.id,
                text: game.night_prompt_text(role).to_string(),
                actions: actions.to_vec(),
                options,
            });
        }
    }

    /// Opens the day vote in the chat.
    pub(crate) fn prompt_vote(&self, game: &Game) {
        let options = game
            .alive_players()
            .map(|p| TargetOption {
                player_id: p.id,
                name: p.name.clone(),
            })
            .collect();
        self.deliver(Outbound::ChatPrompt {
            chat_id: game.chat_id(),
            text: game.vote_text(),
            action: ActionKind::Vote,
            options,
        });
    }

    /// Called when a phase timer expires. Returns `true` if the game continues, and `false`
    /// if it ended or the timer is stale.
    pub(crate) fn resolve_phase(&self, chat_id: ChatId, game_id: u64, phase: Phase) -> bool {
        let (notifications, running) = self.resolve_locked(chat_id, game_id, phase);
        if !running {
            self.release(chat_id);
        }
        for notification in notifications {
            self.deliver(notification);
        }
        running
    }

    /// Resolves the phase under the chat's lock, returning the notifications to send once the
    /// lock is released and whether the game continues.
    fn resolve_locked(&self, chat_id: ChatId, game_id: u64, phase: Phase) -> (Vec<Outbound>, bool) {
        let lock = self.lock(chat_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut game = match self.store.load(chat_id) {
            Ok(Some(game)) if game.game_id() == game_id && game.phase() == phase => game,
            Ok(_) => return (vec![], false),
            Err(err) => {
                log::error!("Could not load game in chat {}: {}", chat_id, err);
                return (vec![], false);
            }
        };

        let mut notifications = vec![];
        let mut deaths = vec![];
        let winner = match phase {
            Phase::Night => {
                let Ok(outcome) = game.resolve_night() else {
                    return (vec![], false);
                };
                if let Some(check) = &outcome.check {
                    notifications.push(Outbound::PlayerText {
                        player_id: check.sheriff,
                        text: game.check_text(check),
                    });
                }
                notifications.push(Outbound::ChatText {
                    chat_id,
                    text: game.morning_text(&outcome),
                });
                deaths.extend(outcome.killed.iter().copied());
                outcome.winner
            }
            Phase::DayVote => {
                let Ok(outcome) = game.resolve_vote() else {
                    return (vec![], false);
                };
                notifications.push(Outbound::ChatText {
                    chat_id,
                    text: game.vote_result_text(&outcome),
                });
                deaths.extend(outcome.eliminated);
                outcome.winner
            }
            Phase::Lobby | Phase::Ended => return (vec![], false),
        };

        for player in deaths {
            self.stats.increment(player, StatField::Deaths);
        }

        match winner {
            Some(winner) => {
                self.finish(&game, winner);
                notifications.push(Outbound::ChatText {
                    chat_id,
                    text: game.final_text(winner),
                });
            }
            None => {
                if let Err(err) = self.store.save(&game) {
                    log::error!("Could not save game in chat {}: {}", chat_id, err);
                    return (vec![], false);
                }
            }
        }
        (notifications, winner.is_none())
    }

    fn finish(&self, game: &Game, winner: Team) {
        log::info!(
            "Game {} in chat {} won by {} after {} days",
            game.game_id(),
            game.chat_id(),
            winner,
            game.day()
        );
        if let Err(err) = self.store.delete(game.chat_id()) {
            log::error!("Could not delete game in chat {}: {}", game.chat_id(), err);
        }
        if let Err(err) = self.store.archive(&ArchivedGame::new(game, winner)) {
            log::error!("Could not archive game in chat {}: {}", game.chat_id(), err);
        }
        for player in game.players() {
            self.stats.increment(player.id, StatField::Games);
            if game.player_has_won(player.id, winner) {
                self.stats.increment(player.id, StatField::Wins);
            }
        }
    }

    fn lock(&self, chat_id: ChatId) -> Arc<Mutex<()>> {
        self.locks.entry(chat_id).or_default().value().clone()
    }

    /// Drops the lock of a chat whose game is gone, unless another command holds or awaits it.
    /// Must be called without holding the lock.
    fn release(&self, chat_id: ChatId) {
        self.locks
            .remove_if(&chat_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn load(&self, chat_id: ChatId) -> Result<Game, GameError> {
        self.store.load(chat_id)?.ok_or(GameError::NoActiveGame)
    }

    /// Loads, changes and saves a game while holding the chat's lock.
    /// Nothing is saved if the mutation fails.
    fn mutate<T, F>(&self, chat_id: ChatId, mutation: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut Game) -> Result<T, GameError>,
    {
        let lock = self.lock(chat_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut game = self.load(chat_id)?;
        let result = mutation(&mut game)?;
        self.store.save(&game)?;
        Ok(result)
    }

    /// Deletes the game if `check` allows it.
    fn remove<F>(&self, chat_id: ChatId, check: F) -> Result<(), GameError>
    where
        F: FnOnce(&Game) -> Result<(), GameError>,
    {
        let game = {
            let lock = self.lock(chat_id);
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            let game = self.load(chat_id)?;
            check(&game)?;
            self.store.delete(chat_id)?;
            game
        };
        self.release(chat_id);
        log::info!("Removed game {} in chat {}", game.game_id(), chat_id);
        Ok(())
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(rand::thread_rng().next_u64())
    }

    fn deliver(&self, message: Outbound) {
        if let Err(err) = self.messenger.deliver(message) {
            log::warn!("Could not deliver notification: {}", err);
        }
    }

    fn send_to_chat(&self, chat_id: ChatId, text: impl Into<String>) {
        self.deliver(Outbound::ChatText {
            chat_id,
            text: text.into(),
        });
    }

    fn send_to_player(&self, player_id: PlayerId, text: impl Into<String>) {
        self.deliver(Outbound::PlayerText {
            player_id,
            text: text.into(),
        });
    }
}
