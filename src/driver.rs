use crate::game::{ChatId, Phase};
use crate::session::GameManager;
use std::time::Duration;

/// Waits out the lobby of one game, then closes it. Tolerates the lobby being cancelled,
/// started early, or having its duration changed while waiting.
pub async fn run_lobby_timer(manager: &'static GameManager, chat_id: ChatId, game_id: u64) {
    let mut waited = Duration::ZERO;
    loop {
        let Some(game) = manager.snapshot(chat_id, game_id) else {
            return;
        };
        if !game.lobby_open() {
            return;
        }
        let total = game.settings().lobby_duration();
        if waited >= total {
            break;
        }
        tokio::time::sleep(total - waited).await;
        waited = total;
    }
    manager.close_lobby(chat_id, game_id);
}

/// Drives one game through its nights and day votes until it ends or disappears.
/// Every step reloads the game, so a cancelled game stops the loop at its next wake-up.
pub async fn run_game(manager: &'static GameManager, chat_id: ChatId, game_id: u64) {
    log::info!("Driving game {} in chat {}", game_id, chat_id);
    loop {
        let Some(game) = manager.snapshot(chat_id, game_id) else {
            break;
        };
        let duration = match game.phase() {
            Phase::Night => {
                manager.prompt_night(&game);
                game.settings().night_duration()
            }
            Phase::DayVote => {
                manager.prompt_vote(&game);
                game.settings().vote_duration()
            }
            Phase::Lobby | Phase::Ended => break,
        };

        tokio::time::sleep(duration).await;

        if !manager.resolve_phase(chat_id, game_id, game.phase()) {
            break;
        }
    }
    log::info!("Stopped driving game {} in chat {}", game_id, chat_id);
}
