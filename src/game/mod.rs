pub mod rules;
pub mod session;
pub mod shuffler;
pub mod types;

pub use session::GameSession;
pub use types::{GameEvent, GamePhase, Player, PlayerId, VoteTally, Winner};
