use thiserror::Error;

use crate::game::types::{GamePhase, PlayerId};

/// Errors surfaced by the game core. Every command either fully applies or
/// returns one of these with the session left untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    // Validation (caller-correctable)
    #[error("invalid player name: {0}")]
    InvalidName(&'static str),

    #[error("the table is full ({max} players)")]
    RosterFull { max: usize },

    #[error("need at least {min} players to start")]
    NotEnoughPlayers { min: usize },

    #[error("{requested} impostors cannot hide among {players} players")]
    TooManyImpostors { requested: usize, players: usize },

    #[error("players cannot vote for themselves")]
    SelfVote,

    #[error("no player with id {0}")]
    UnknownPlayer(PlayerId),

    // Lookup miss
    #[error("no word available in category \"{category}\"")]
    NoWordAvailable { category: String },

    // Invariant violations (bugs in the caller, not recoverable user error)
    #[error("{command} is not valid during the {phase} phase")]
    WrongPhase {
        command: &'static str,
        phase: GamePhase,
    },

    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: GamePhase, to: GamePhase },
}
