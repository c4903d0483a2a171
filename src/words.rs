use rand::Rng;
use serde::Deserialize;

/// One themed word pool.
#[derive(Debug, Clone, Deserialize)]
pub struct WordCategory {
    pub name: String,
    pub description: Option<String>,
    pub words: Vec<String>,
}

/// Supplies categorized secret words. Selection is non-destructive, so the
/// same word may come up again in a later game.
pub trait WordRepository: Send + Sync {
    /// Uniformly random word from the named category (case-insensitive), or
    /// `None` when the category is unknown or empty.
    fn random_word(&self, category: &str) -> Option<String>;

    /// Ordered category names for selection UI.
    fn category_names(&self) -> Vec<String>;
}

const EMBEDDED_WORDS: &str = include_str!("../assets/words.json");

/// Word lists compiled into the binary.
pub struct StaticWordRepository {
    categories: Vec<WordCategory>,
}

impl StaticWordRepository {
    /// Build from the embedded word-list asset.
    pub fn embedded() -> Result<Self, serde_json::Error> {
        let categories = serde_json::from_str(EMBEDDED_WORDS)?;
        Ok(Self { categories })
    }

    pub fn new(categories: Vec<WordCategory>) -> Self {
        Self { categories }
    }

    /// Case-insensitive category lookup.
    pub fn category(&self, name: &str) -> Option<&WordCategory> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Random word from the union of every pool.
    pub fn random_word_any(&self) -> Option<String> {
        let total: usize = self.categories.iter().map(|c| c.words.len()).sum();
        if total == 0 {
            return None;
        }
        let mut index = rand::rng().random_range(0..total);
        for category in &self.categories {
            if index < category.words.len() {
                return Some(category.words[index].clone());
            }
            index -= category.words.len();
        }
        None
    }
}

impl WordRepository for StaticWordRepository {
    fn random_word(&self, category: &str) -> Option<String> {
        let category = self.category(category)?;
        if category.words.is_empty() {
            return None;
        }
        let index = rand::rng().random_range(0..category.words.len());
        category.words.get(index).cloned()
    }

    fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_asset_parses_with_all_categories() {
        let repo = StaticWordRepository::embedded().unwrap();
        assert_eq!(
            repo.category_names(),
            vec![
                "Animals",
                "Food",
                "Places",
                "Objects",
                "Activities & Concepts"
            ]
        );
        for name in repo.category_names() {
            assert!(!repo.category(&name).unwrap().words.is_empty());
        }
    }

    #[test]
    fn test_category_lookup_is_case_insensitive() {
        let repo = StaticWordRepository::embedded().unwrap();
        assert!(repo.category("animals").is_some());
        assert!(repo.category("ANIMALS").is_some());
        assert!(repo.random_word("fOoD").is_some());
    }

    #[test]
    fn test_unknown_category_yields_no_word() {
        let repo = StaticWordRepository::embedded().unwrap();
        assert_eq!(repo.random_word("Cryptids"), None);
        assert!(repo.category("Cryptids").is_none());
    }

    #[test]
    fn test_random_word_comes_from_the_requested_pool() {
        let repo = StaticWordRepository::embedded().unwrap();
        let pool = &repo.category("Places").unwrap().words;
        for _ in 0..20 {
            let word = repo.random_word("Places").unwrap();
            assert!(pool.contains(&word));
        }
    }

    #[test]
    fn test_empty_pool_yields_no_word() {
        let repo = StaticWordRepository::new(vec![WordCategory {
            name: "Empty".into(),
            description: None,
            words: vec![],
        }]);
        assert_eq!(repo.random_word("Empty"), None);
        assert_eq!(repo.random_word_any(), None);
    }

    #[test]
    fn test_random_word_any_draws_across_pools() {
        let repo = StaticWordRepository::new(vec![
            WordCategory {
                name: "A".into(),
                description: None,
                words: vec!["Left".into()],
            },
            WordCategory {
                name: "B".into(),
                description: None,
                words: vec!["Right".into()],
            },
        ]);
        for _ in 0..10 {
            let word = repo.random_word_any().unwrap();
            assert!(word == "Left" || word == "Right");
        }
    }
}
