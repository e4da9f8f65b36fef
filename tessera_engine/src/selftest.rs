// Determinism self-test.
//
// Replays a fixed call sequence (`to(start)` then `generate()` N times) on a
// fresh engine and folds every batch into a CRC32. Running the replay twice
// and comparing checksums is the project's reproducibility check: any
// platform- or build-dependent behavior in the PRNG or the engine shows up
// as a mismatch.

use crate::config::EngineConfig;
use crate::engine::GenerationEngine;

/// Outcome of one replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replay {
    pub checksum: u32,
    pub history_len: usize,
    /// Engine generation after the replay.
    pub generation: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeterminismReport {
    pub first: Replay,
    pub second: Replay,
}

impl DeterminismReport {
    pub fn passed(&self) -> bool {
        self.first == self.second
    }
}

/// Run `to(start)` followed by `iterations` calls to `generate()` on a fresh
/// engine, checksumming each batch as it is produced.
///
/// With `memory == 0` no batch is observable and the checksum covers nothing.
pub fn replay(config: &EngineConfig, start: u64, iterations: u64) -> Replay {
    let mut engine = GenerationEngine::from_config(config);
    let mut hasher = crc32fast::Hasher::new();

    engine.to(start);
    absorb(&mut hasher, &engine);
    for _ in 0..iterations {
        engine.generate();
        absorb(&mut hasher, &engine);
    }

    Replay {
        checksum: hasher.finalize(),
        history_len: engine.history_len(),
        generation: engine.generation(),
    }
}

/// Replay twice from fresh engines and report both results.
pub fn check_determinism(config: &EngineConfig, start: u64, iterations: u64) -> DeterminismReport {
    let first = replay(config, start, iterations);
    let second = replay(config, start, iterations);
    if first != second {
        tracing::warn!(?first, ?second, "replays diverged");
    }
    DeterminismReport { first, second }
}

fn absorb(hasher: &mut crc32fast::Hasher, engine: &GenerationEngine) {
    if let Some(values) = engine.values() {
        for v in values {
            hasher.update(&v.to_bits().to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: &str) -> EngineConfig {
        EngineConfig {
            seed: seed.into(),
            size: 10,
            memory: 4,
        }
    }

    #[test]
    fn replay_is_reproducible() {
        let report = check_determinism(&config("test"), 100, 50);
        assert!(report.passed(), "{report:?}");
        assert_eq!(report.first.history_len, 4);
        assert_eq!(report.first.generation, 151);
    }

    #[test]
    fn different_seeds_give_different_checksums() {
        let a = replay(&config("a"), 0, 10);
        let b = replay(&config("b"), 0, 10);
        assert_ne!(a.checksum, b.checksum);
    }

    #[test]
    fn different_start_gives_different_checksum() {
        let a = replay(&config("test"), 0, 10);
        let b = replay(&config("test"), 1, 10);
        assert_ne!(a.checksum, b.checksum);
    }
}
