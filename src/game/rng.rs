use rand::Rng;
use rand::rngs::StdRng;

/// Source of randomness handed to the engine at construction
///
/// Food placement only ever needs one uniform index into the list of free
/// cells, so that is the whole capability.
pub trait RandomSource {
    /// Uniform index in `0..len`. Callers never pass `len == 0`.
    fn pick(&mut self, len: usize) -> usize;
}

impl RandomSource for StdRng {
    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Replays a fixed list of picks, wrapping each into range
///
/// Handy for reproducing a specific food layout.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    picks: Vec<usize>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(picks: Vec<usize>) -> Self {
        Self { picks, cursor: 0 }
    }

    /// Always picks the first free cell
    pub fn first() -> Self {
        Self::new(vec![0])
    }
}

impl RandomSource for ScriptedSource {
    fn pick(&mut self, len: usize) -> usize {
        let raw = self.picks.get(self.cursor).copied().unwrap_or(0);
        if !self.picks.is_empty() {
            self.cursor = (self.cursor + 1) % self.picks.len();
        }
        raw % len
    }
}
