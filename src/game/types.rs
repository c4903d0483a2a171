use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)] // Serialize directly as the inner UUID string
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A seat at the table. Insertion order is turn order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Opaque reference into the avatar catalog; the core stores and forwards
    /// it, never interprets it.
    pub avatar: String,
    pub is_impostor: bool,
    pub has_voted: bool,
    pub voted_for: Option<PlayerId>,
}

impl Player {
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            avatar: avatar.into(),
            is_impostor: false,
            has_voted: false,
            voted_for: None,
        }
    }

    pub(crate) fn clear_vote(&mut self) {
        self.has_voted = false;
        self.voted_for = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Setup,
    Reveal,
    Discussion,
    Voting,
    Results,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GamePhase::Setup => "setup",
            GamePhase::Reveal => "reveal",
            GamePhase::Discussion => "discussion",
            GamePhase::Voting => "voting",
            GamePhase::Results => "results",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Civilians,
    Impostors,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Winner::Civilians => "civilians",
            Winner::Impostors => "impostors",
        };
        f.write_str(name)
    }
}

/// Emitted by session mutators so callers can react to what happened without
/// re-deriving it from the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    VoteCast {
        voter_id: PlayerId,
        target_id: PlayerId,
    },
    /// Fired exactly once, on the ballot that completes the round.
    AllVotesIn,
    Eliminated {
        player_id: PlayerId,
    },
    VoteTied,
    GameOver {
        winner: Winner,
    },
}

/// Outcome of tallying the current ballots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteTally {
    /// Ballots per candidate; players who did not vote contribute nothing.
    pub counts: HashMap<PlayerId, usize>,
    /// First candidate (in roster order) to reach a strict maximum. Not
    /// meaningful when `is_tie` is set.
    pub most_voted: Option<PlayerId>,
    pub is_tie: bool,
}

impl VoteTally {
    /// The player the ballot eliminates, if any. Ties eliminate nobody.
    pub fn elimination(&self) -> Option<PlayerId> {
        if self.is_tie {
            None
        } else {
            self.most_voted
        }
    }
}
