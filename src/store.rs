use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tracing::instrument;

use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::shuffler::ThreadRngShuffler;
use crate::game::types::{GameEvent, GamePhase, PlayerId, VoteTally, Winner};
use crate::game::GameSession;
use crate::words::WordRepository;

pub type SharedStore = Arc<GameStore>;

/// The single source of truth the presentation layer talks to.
///
/// Commands take the write lock, apply one session mutation atomically, and
/// publish the updated aggregate on the watch channel before returning, so
/// observers only ever see fully-applied states and one command is in flight
/// at a time even on a multi-threaded host.
pub struct GameStore {
    session: RwLock<GameSession>,
    words: Arc<dyn WordRepository>,
    resolve_delay: Duration,
    changes: watch::Sender<GameSession>,
}

impl GameStore {
    pub fn new(words: Arc<dyn WordRepository>, rules: GameConfig) -> SharedStore {
        let session = GameSession::new(rules);
        let (changes, _) = watch::channel(session.clone());
        Arc::new(Self {
            session: RwLock::new(session),
            words,
            resolve_delay: Duration::from_millis(rules.resolve_delay_ms),
            changes,
        })
    }

    // --- Read side ---

    /// Current aggregate snapshot.
    pub async fn snapshot(&self) -> GameSession {
        self.session.read().await.clone()
    }

    /// Change notifications: each command publishes the post-command
    /// aggregate.
    pub fn subscribe(&self) -> watch::Receiver<GameSession> {
        self.changes.subscribe()
    }

    pub fn category_names(&self) -> Vec<String> {
        self.words.category_names()
    }

    /// Read-only tally of the current ballots.
    pub async fn calculate_votes(&self) -> VoteTally {
        self.session.read().await.calculate_votes()
    }

    // --- Commands ---

    #[instrument(skip(self))]
    pub async fn add_player(&self, name: &str, avatar: &str) -> Result<PlayerId, GameError> {
        let mut session = self.session.write().await;
        let id = session.add_player(name, avatar)?;
        self.publish(&session);
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn remove_player(&self, id: PlayerId) -> Result<(), GameError> {
        let mut session = self.session.write().await;
        session.remove_player(id)?;
        self.publish(&session);
        Ok(())
    }

    /// Draw a secret word for the category and deal roles. A category with no
    /// words refuses cleanly and leaves the session in setup.
    #[instrument(skip(self))]
    pub async fn start_game(&self, category: &str) -> Result<(), GameError> {
        let mut session = self.session.write().await;
        let word = self
            .words
            .random_word(category)
            .ok_or_else(|| GameError::NoWordAvailable {
                category: category.to_string(),
            })?;
        session.start(category, word, &mut ThreadRngShuffler::new())?;
        self.publish(&session);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn next_player(&self) -> Result<GamePhase, GameError> {
        let mut session = self.session.write().await;
        let phase = session.next_player()?;
        self.publish(&session);
        Ok(phase)
    }

    #[instrument(skip(self))]
    pub async fn set_phase(&self, phase: GamePhase) -> Result<(), GameError> {
        let mut session = self.session.write().await;
        session.set_phase(phase)?;
        self.publish(&session);
        Ok(())
    }

    /// Record a ballot. The ballot that completes the round schedules the
    /// delayed resolution.
    #[instrument(skip(self))]
    pub async fn cast_vote(
        self: &Arc<Self>,
        voter_id: PlayerId,
        target_id: PlayerId,
    ) -> Result<Vec<GameEvent>, GameError> {
        let mut session = self.session.write().await;
        let events = session.cast_vote(voter_id, target_id)?;
        let epoch = session.get_epoch();
        self.publish(&session);
        drop(session);

        if events.contains(&GameEvent::AllVotesIn) {
            self.schedule_auto_resolve(epoch);
        }
        Ok(events)
    }

    #[instrument(skip(self))]
    pub async fn resolve_votes(&self) -> Result<Vec<GameEvent>, GameError> {
        let mut session = self.session.write().await;
        let events = session.resolve_votes()?;
        self.publish(&session);
        Ok(events)
    }

    #[instrument(skip(self))]
    pub async fn set_winner(&self, winner: Winner) -> Result<(), GameError> {
        let mut session = self.session.write().await;
        session.set_winner(winner)?;
        self.publish(&session);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn next_round(&self) -> Result<(), GameError> {
        let mut session = self.session.write().await;
        session.next_round()?;
        self.publish(&session);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn reset_game(&self) {
        let mut session = self.session.write().await;
        session.reset();
        self.publish(&session);
    }

    fn publish(&self, session: &GameSession) {
        // send_replace never fails, even before anyone subscribes
        self.changes.send_replace(session.clone());
    }

    /// Resolve the ballot after the reveal delay, unless the session moved on
    /// in the meantime: the (epoch, phase) check makes a reset or restart
    /// supersede the pending resolution.
    fn schedule_auto_resolve(self: &Arc<Self>, epoch: u64) {
        let store = Arc::clone(self);
        let delay = self.resolve_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut session = store.session.write().await;
            if session.get_epoch() != epoch || session.get_phase() != GamePhase::Voting {
                tracing::debug!(expected_epoch = epoch, "skipping stale vote resolution");
                return;
            }
            match session.resolve_votes() {
                Ok(events) => {
                    tracing::debug!(?events, "auto-resolved the voting round");
                    store.publish(&session);
                }
                Err(e) => tracing::warn!(error = %e, "vote auto-resolution failed"),
            }
        });
    }
}
