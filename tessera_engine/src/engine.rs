// Generation-addressed batch engine.
//
// A `GenerationEngine` produces fixed-size batches of floats in [0, 1). Each
// batch belongs to an integer generation `g` and is drawn from a fresh
// `SeededRng` seeded with `"{seed}-{g}"`. Consecutive generations are
// therefore independent streams rather than a continuation of one stream.
// Consumers (the timecode generator, procedural art/music) rely on that
// discontinuity, and on being able to jump straight to any generation with
// `to()` and get the same batch every time.
//
// The engine keeps the last `memory` batches in a FIFO history. Evicting the
// oldest batch never affects what later generations produce.
//
// Lifecycle of one `generate()` call:
//   1. draw `size` values from the current stream
//   2. push them onto history (evicting from the front if full)
//   3. advance `generation` and reseed for the new generation
//
// So after `to(g)` the latest batch is generation `g`'s and the engine is
// already positioned at `g + 1`.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tessera_prng::SeededRng;

use crate::config::EngineConfig;

/// Seed string for one generation's stream.
pub fn stream_seed(seed: &str, generation: u64) -> String {
    format!("{seed}-{generation}")
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationEngine {
    seed: String,
    size: usize,
    memory: usize,
    generation: u64,
    history: VecDeque<Vec<f64>>,
    rng: SeededRng,
}

impl GenerationEngine {
    /// Create an engine positioned at generation 0 with empty history.
    pub fn new(seed: impl Into<String>, size: usize, memory: usize) -> Self {
        let seed = seed.into();
        let rng = SeededRng::from_seed(&stream_seed(&seed, 0));
        Self {
            seed,
            size,
            memory,
            generation: 0,
            history: VecDeque::with_capacity(memory),
            rng,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.seed.clone(), config.size, config.memory)
    }

    /// Produce one batch for the current generation, then advance.
    pub fn generate(&mut self) {
        let mut batch = vec![0.0; self.size];
        self.rng.fill_f64(&mut batch);
        tracing::trace!(generation = self.generation, size = self.size, "generated batch");

        if self.memory > 0 {
            while self.history.len() >= self.memory {
                self.history.pop_front();
            }
            self.history.push_back(batch);
        }

        self.generation = self.generation.wrapping_add(1);
        self.reseed();
    }

    /// Jump to `generation` and immediately generate its batch.
    ///
    /// Afterwards `values()` is the batch for `generation` and `generation()`
    /// reports `generation + 1`. History is kept; the new batch is appended.
    pub fn to(&mut self, generation: u64) {
        tracing::debug!(from = self.generation, to = generation, "jumping to generation");
        self.generation = generation;
        self.reseed();
        self.generate();
    }

    /// Jump back to generation 0.
    pub fn reset(&mut self) {
        self.to(0);
    }

    /// Most recent batch, or `None` if nothing has been generated yet or the
    /// engine retains no history.
    pub fn values(&self) -> Option<&[f64]> {
        self.history.back().map(Vec::as_slice)
    }

    /// Retained batches, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &[f64]> {
        self.history.iter().map(Vec::as_slice)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Compute the batch for any generation without touching engine state.
    /// Equal to what `to(generation)` would append.
    pub fn batch_at(&self, generation: u64) -> Vec<f64> {
        let mut rng = SeededRng::from_seed(&stream_seed(&self.seed, generation));
        let mut batch = vec![0.0; self.size];
        rng.fill_f64(&mut batch);
        batch
    }

    /// The generation the next `generate()` call will produce.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn memory(&self) -> usize {
        self.memory
    }

    fn reseed(&mut self) {
        self.rng = SeededRng::from_seed(&stream_seed(&self.seed, self.generation));
    }
}
