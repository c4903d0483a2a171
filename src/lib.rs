pub mod avatars;
pub mod config;
pub mod error;
pub mod game;
pub mod store;
pub mod words;

use std::sync::Arc;

use config::Config;
use store::{GameStore, SharedStore};
use words::StaticWordRepository;

/// Wire a store over the embedded word lists.
pub fn create_store(config: &Config) -> SharedStore {
    let words =
        Arc::new(StaticWordRepository::embedded().expect("embedded word list is malformed"));
    GameStore::new(words, config.game)
}
