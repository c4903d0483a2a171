/// Source of randomness for the game core. Every call site draws an index,
/// so the seam is an index pick rather than a full RNG surface.
pub trait Shuffler {
    /// Uniformly random index in `0..bound`. Callers never pass 0.
    fn pick_index(&mut self, bound: usize) -> usize;
}

pub struct ThreadRngShuffler {
    rng: rand::rngs::ThreadRng,
}

impl ThreadRngShuffler {
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for ThreadRngShuffler {
    fn default() -> Self {
        Self::new()
    }
}

impl Shuffler for ThreadRngShuffler {
    fn pick_index(&mut self, bound: usize) -> usize {
        use rand::Rng;
        self.rng.random_range(0..bound)
    }
}

/// Returns picks from a scripted sequence. Panics when exhausted, so a test
/// that draws more than it scripted fails loudly.
#[cfg(test)]
pub struct SequenceShuffler {
    values: Vec<usize>,
    index: usize,
}

#[cfg(test)]
impl SequenceShuffler {
    pub fn new(values: Vec<usize>) -> Self {
        Self { values, index: 0 }
    }
}

#[cfg(test)]
impl Shuffler for SequenceShuffler {
    fn pick_index(&mut self, _bound: usize) -> usize {
        let value = self.values[self.index];
        self.index += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_rng_shuffler_stays_in_bounds() {
        let mut shuffler = ThreadRngShuffler::new();

        for _ in 0..100 {
            let pick = shuffler.pick_index(10);
            assert!(pick < 10);
        }

        // A bound of 1 leaves only one possible pick
        let pick = shuffler.pick_index(1);
        assert_eq!(pick, 0);
    }

    #[test]
    fn test_sequence_shuffler_replays_script() {
        let mut shuffler = SequenceShuffler::new(vec![3, 0, 2]);
        assert_eq!(shuffler.pick_index(5), 3);
        assert_eq!(shuffler.pick_index(5), 0);
        assert_eq!(shuffler.pick_index(5), 2);
    }
}
