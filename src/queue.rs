//! Next-pair queue
//!
//! Holds the upcoming color pairs. Every pop is followed by a push of a fresh
//! random pair so the preview always shows two pairs.

use crate::board::{Cell, NORMAL_COLORS};
use crate::puyo::ColorPair;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Number of pairs kept ready
pub const PREVIEW_LEN: usize = 2;

/// Seeded queue of upcoming pairs
#[derive(Debug, Clone)]
pub struct NextQueue {
    queue: VecDeque<ColorPair>,
    seed: u64,
    rng: ChaCha8Rng,
}

impl Default for NextQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl NextQueue {
    /// Create a queue with a random seed
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a reproducible queue
    pub fn with_seed(seed: u64) -> Self {
        let mut queue = Self {
            queue: VecDeque::with_capacity(PREVIEW_LEN + 1),
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        queue.refill();
        queue
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the stream from its seed, so the pairs repeat from the first one
    pub fn reseed(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.queue.clear();
        self.refill();
    }

    fn refill(&mut self) {
        while self.queue.len() < PREVIEW_LEN {
            let pair = self.random_pair();
            self.queue.push_back(pair);
        }
    }

    fn random_color(&mut self) -> Cell {
        NORMAL_COLORS[self.rng.gen_range(0..NORMAL_COLORS.len())]
    }

    /// Two independent uniform draws from the normal colors
    pub fn random_pair(&mut self) -> ColorPair {
        let main = self.random_color();
        let sub = self.random_color();
        ColorPair::new(main, sub)
    }

    /// Remove the front pair. Callers push a replacement straight after.
    pub fn pop(&mut self) -> Option<ColorPair> {
        self.queue.pop_front()
    }

    pub fn push(&mut self, pair: ColorPair) {
        self.queue.push_back(pair);
    }

    /// Take the next pair and top the queue back up
    pub fn deal(&mut self) -> ColorPair {
        let pair = match self.pop() {
            Some(pair) => pair,
            None => self.random_pair(),
        };
        let replacement = self.random_pair();
        self.push(replacement);
        self.refill();
        pair
    }

    /// The next two pairs, front first
    pub fn preview(&self) -> [ColorPair; PREVIEW_LEN] {
        std::array::from_fn(|i| self.queue[i])
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
