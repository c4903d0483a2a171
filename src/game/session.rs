use serde::{Deserialize, Serialize};

use super::rules;
use super::shuffler::Shuffler;
use super::types::{GameEvent, GamePhase, Player, PlayerId, VoteTally, Winner};
use crate::config::GameConfig;
use crate::error::GameError;

/// The session-of-record: one table, one device, one aggregate.
///
/// Phases run `setup -> reveal -> discussion -> voting -> results`, with
/// `results -> discussion` (another round on the same word and roles) and
/// `any -> setup` (full reset) as the only ways back. Every mutator either
/// fully applies or rejects with a [`GameError`] and changes nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    players: Vec<Player>,
    word_category: Option<String>,
    secret_word: Option<String>,
    current_player_index: usize,
    phase: GamePhase,
    current_round: u32,
    winner: Option<Winner>,
    eliminated_player_id: Option<PlayerId>,
    /// Session identity for delayed work: bumped whenever a pending timer
    /// must no longer act (start, next round, reset).
    epoch: u64,
    rules: GameConfig,
}

impl GameSession {
    pub fn new(rules: GameConfig) -> Self {
        Self {
            players: Vec::new(),
            word_category: None,
            secret_word: None,
            current_player_index: 0,
            phase: GamePhase::Setup,
            current_round: 1,
            winner: None,
            eliminated_player_id: None,
            epoch: 0,
            rules,
        }
    }

    // Getters
    pub fn get_players(&self) -> &[Player] {
        &self.players
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_phase(&self) -> GamePhase {
        self.phase
    }

    pub fn get_word_category(&self) -> Option<&str> {
        self.word_category.as_deref()
    }

    pub fn get_secret_word(&self) -> Option<&str> {
        self.secret_word.as_deref()
    }

    pub fn get_current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn get_current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    pub fn get_current_round(&self) -> u32 {
        self.current_round
    }

    pub fn get_winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn get_eliminated_player_id(&self) -> Option<PlayerId> {
        self.eliminated_player_id
    }

    pub fn get_epoch(&self) -> u64 {
        self.epoch
    }

    pub fn get_rules(&self) -> &GameConfig {
        &self.rules
    }

    pub fn all_voted(&self) -> bool {
        !self.players.is_empty() && self.players.iter().all(|p| p.has_voted)
    }

    fn require_phase(&self, command: &'static str, expected: GamePhase) -> Result<(), GameError> {
        if self.phase != expected {
            tracing::warn!(command, phase = %self.phase, "command issued outside its phase");
            return Err(GameError::WrongPhase {
                command,
                phase: self.phase,
            });
        }
        Ok(())
    }

    //  --- Public mutators ---
    #[tracing::instrument(skip(self))]
    pub fn add_player(&mut self, name: &str, avatar: &str) -> Result<PlayerId, GameError> {
        self.require_phase("add_player", GamePhase::Setup)?;
        if self.players.len() >= self.rules.max_players {
            return Err(GameError::RosterFull {
                max: self.rules.max_players,
            });
        }

        let name = rules::validate_player_name(name)?;
        let player = Player::new(name, avatar);
        let id = player.id;
        self.players.push(player);
        Ok(id)
    }

    /// Absent ids are a no-op, not an error.
    #[tracing::instrument(skip(self))]
    pub fn remove_player(&mut self, id: PlayerId) -> Result<(), GameError> {
        self.require_phase("remove_player", GamePhase::Setup)?;
        self.players.retain(|p| p.id != id);
        Ok(())
    }

    /// Begin a game: assign roles, store the secret word, enter the reveal
    /// phase with the cursor on seat 0.
    #[tracing::instrument(skip(self, word, shuffler))]
    pub fn start(
        &mut self,
        category: &str,
        word: String,
        shuffler: &mut impl Shuffler,
    ) -> Result<(), GameError> {
        self.require_phase("start", GamePhase::Setup)?;
        if self.players.len() < self.rules.min_players {
            return Err(GameError::NotEnoughPlayers {
                min: self.rules.min_players,
            });
        }

        self.players = rules::assign_roles(&self.players, self.rules.impostor_count, shuffler)?;
        self.word_category = Some(category.to_string());
        self.secret_word = Some(word);
        self.current_player_index = 0;
        self.current_round = 1;
        self.winner = None;
        self.eliminated_player_id = None;
        self.epoch += 1;
        self.phase = GamePhase::Reveal;

        tracing::info!(players = self.players.len(), category, "game started");
        Ok(())
    }

    /// Advance the reveal cursor. Wrapping past the last seat is the sole
    /// exit from the reveal phase.
    #[tracing::instrument(skip(self))]
    pub fn next_player(&mut self) -> Result<GamePhase, GameError> {
        self.require_phase("next_player", GamePhase::Reveal)?;

        let next = self.current_player_index + 1;
        if next >= self.players.len() {
            self.current_player_index = 0;
            self.phase = GamePhase::Discussion;
        } else {
            self.current_player_index = next;
        }
        Ok(self.phase)
    }

    /// Direct transition for the phases with no dedicated command, validated
    /// against the closed transition table: discussion may open the vote, and
    /// the vote may close into results. Everything else goes through
    /// [`start`](Self::start), [`next_player`](Self::next_player),
    /// [`next_round`](Self::next_round), or [`reset`](Self::reset).
    #[tracing::instrument(skip(self))]
    pub fn set_phase(&mut self, phase: GamePhase) -> Result<(), GameError> {
        let allowed = self.phase == phase
            || matches!(
                (self.phase, phase),
                (GamePhase::Discussion, GamePhase::Voting)
                    | (GamePhase::Voting, GamePhase::Results)
            );
        if !allowed {
            tracing::warn!(from = %self.phase, to = %phase, "rejected phase transition");
            return Err(GameError::InvalidTransition {
                from: self.phase,
                to: phase,
            });
        }
        self.phase = phase;
        Ok(())
    }

    /// Record a ballot. Self-votes are rejected here, not left to the UI.
    #[tracing::instrument(skip(self))]
    pub fn cast_vote(
        &mut self,
        voter_id: PlayerId,
        target_id: PlayerId,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.require_phase("cast_vote", GamePhase::Voting)?;
        if voter_id == target_id {
            return Err(GameError::SelfVote);
        }
        if self.get_player(target_id).is_none() {
            return Err(GameError::UnknownPlayer(target_id));
        }

        let was_all_voted = self.all_voted();
        let voter = self
            .players
            .iter_mut()
            .find(|p| p.id == voter_id)
            .ok_or(GameError::UnknownPlayer(voter_id))?;
        voter.has_voted = true;
        voter.voted_for = Some(target_id);

        let mut events = vec![GameEvent::VoteCast {
            voter_id,
            target_id,
        }];
        if !was_all_voted && self.all_voted() {
            tracing::debug!("all votes are in");
            events.push(GameEvent::AllVotesIn);
        }
        Ok(events)
    }

    /// Read-only tally of the current ballots.
    pub fn calculate_votes(&self) -> VoteTally {
        rules::count_votes(&self.players)
    }

    /// Close the vote: record the elimination (nobody on a tie), derive the
    /// verdict, enter results.
    // TODO: survival mode - carry eliminations across rounds instead of
    // resolving each ballot into a single verdict.
    #[tracing::instrument(skip(self))]
    pub fn resolve_votes(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.require_phase("resolve_votes", GamePhase::Voting)?;

        let tally = rules::count_votes(&self.players);
        let mut events = Vec::new();

        self.eliminated_player_id = tally.elimination();
        match self.eliminated_player_id {
            Some(player_id) => events.push(GameEvent::Eliminated { player_id }),
            None => events.push(GameEvent::VoteTied),
        }

        self.winner = rules::determine_winner(&self.players, self.eliminated_player_id);
        if let Some(winner) = self.winner {
            tracing::info!(%winner, "round decided");
            events.push(GameEvent::GameOver { winner });
        }

        self.phase = GamePhase::Results;
        Ok(events)
    }

    /// First write wins; a conflicting later write is a caller race and
    /// no-ops.
    #[tracing::instrument(skip(self))]
    pub fn set_winner(&mut self, winner: Winner) -> Result<(), GameError> {
        match self.winner {
            Some(existing) if existing != winner => {
                tracing::warn!(%existing, attempted = %winner, "winner already decided");
            }
            _ => self.winner = Some(winner),
        }
        Ok(())
    }

    /// Another round of clues on the same word and roles: clear the ballots
    /// and return to discussion.
    #[tracing::instrument(skip(self))]
    pub fn next_round(&mut self) -> Result<(), GameError> {
        self.require_phase("next_round", GamePhase::Results)?;

        self.current_round += 1;
        self.current_player_index = 0;
        self.winner = None;
        self.eliminated_player_id = None;
        for player in &mut self.players {
            player.clear_vote();
        }
        self.epoch += 1;
        self.phase = GamePhase::Discussion;

        tracing::info!(round = self.current_round, "next round");
        Ok(())
    }

    /// Full reset from any phase: an empty table back in setup.
    #[tracing::instrument(skip(self))]
    pub fn reset(&mut self) {
        let epoch = self.epoch + 1;
        *self = Self {
            epoch,
            ..Self::new(self.rules)
        };
        tracing::info!("session reset");
    }
}
