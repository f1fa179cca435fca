use crate::store::StoreError;
use thiserror::Error;

/// The result of attempting to perform an invalid operation on a [Game] or its session.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("a game is already running in this chat")]
    GameAlreadyRunning,
    #[error("no active game")]
    NoActiveGame,
    #[error("the lobby is closed")]
    LobbyClosed,
    #[error("you have already joined this game")]
    AlreadyJoined,
    #[error("too many players in the game")]
    TooManyPlayers,
    #[error("at least {min} players are needed to start (minimum players)")]
    TooFewPlayers { min: usize },
    #[error("only the game creator can do this")]
    NotCreator,
    #[error("the game has already started")]
    AlreadyStarted,
    #[error("no player exists with the given id")]
    PlayerNotFound,
    #[error("eliminated players cannot act")]
    PlayerEliminated,
    #[error("your role cannot perform this action")]
    NotEligible,
    #[error("phase ended")]
    PhaseEnded,
    #[error("this player cannot be chosen for this action")]
    InvalidPlayerChoice,
    #[error("you cannot target yourself")]
    SelfTarget,
    #[error("unknown setting")]
    UnknownSetting,
    #[error("settings cannot be changed once the game has started")]
    SettingsLocked,
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}
