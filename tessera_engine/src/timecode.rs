// Rotating timecodes derived from coarse time buckets.
//
// Time is cut into fixed-width buckets of `seconds * 1000` ms. The bucket's
// start timestamp (its "position") is used directly as the engine generation,
// so every bucket maps to one reproducible batch, and each value in the batch
// picks one character of the Crockford base32 alphabet. The result is a short
// code that every holder of the same seed derives independently, and which
// rotates when the bucket does.
//
// Codes are memoized per bucket in a bounded map owned by the generator. When
// the map exceeds `memo_capacity` the oldest bucket is dropped; asking for it
// again simply regenerates the identical code.
//
// Time comes from a `Clock` so callers and tests can substitute their own.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::config::TimecodeConfig;
use crate::engine::GenerationEngine;
use crate::error::{Result, TesseraError};

/// Crockford base32: digits and uppercase letters minus I, L, O and U.
pub const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // A clock set before 1970 reads as the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// One resolved timecode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timecode {
    pub code: String,
    /// Milliseconds left in the bucket, in `(0, width]`.
    pub expiry_ms: u64,
    /// Bucket start timestamp in ms.
    pub position: u64,
}

/// Map a batch of values in [0, 1) onto `ALPHABET`, one character each.
pub fn encode(values: &[f64]) -> String {
    values
        .iter()
        .map(|&v| {
            let index = (v * ALPHABET.len() as f64) as usize;
            char::from(ALPHABET[index.min(ALPHABET.len() - 1)])
        })
        .collect()
}

pub struct TimecodeGenerator<C: Clock = SystemClock> {
    engine: GenerationEngine,
    width_ms: u64,
    memo: BTreeMap<u64, String>,
    memo_capacity: usize,
    clock: C,
}

impl TimecodeGenerator<SystemClock> {
    /// Generator driven by the system clock.
    pub fn with_system_clock(config: &TimecodeConfig) -> Result<Self> {
        Self::new(config, SystemClock)
    }
}

impl<C: Clock> TimecodeGenerator<C> {
    /// Fails with `InvalidBucketWidth` if `config.seconds` is zero or too
    /// large to express in milliseconds.
    pub fn new(config: &TimecodeConfig, clock: C) -> Result<Self> {
        let width_ms = config
            .seconds
            .checked_mul(1000)
            .filter(|&w| w > 0)
            .ok_or(TesseraError::InvalidBucketWidth {
                seconds: config.seconds,
            })?;
        Ok(Self {
            engine: GenerationEngine::new(config.seed.clone(), config.size, 1),
            width_ms,
            memo: BTreeMap::new(),
            memo_capacity: config.memo_capacity,
            clock,
        })
    }

    /// Timecode for the clock's current time.
    pub fn current(&mut self) -> Timecode {
        let now = self.clock.now_ms();
        self.at(now)
    }

    /// Timecode for the bucket containing `now_ms`.
    pub fn at(&mut self, now_ms: u64) -> Timecode {
        let offset = now_ms % self.width_ms;
        let position = now_ms - offset;
        let expiry_ms = self.width_ms - offset;

        if let Some(code) = self.memo.get(&position) {
            return Timecode {
                code: code.clone(),
                expiry_ms,
                position,
            };
        }

        self.engine.to(position);
        let code = encode(self.engine.values().unwrap_or_default());
        tracing::debug!(position, code = %code, "generated timecode");

        if self.memo_capacity > 0 {
            self.memo.insert(position, code.clone());
            while self.memo.len() > self.memo_capacity {
                if let Some((evicted, _)) = self.memo.pop_first() {
                    tracing::debug!(position = evicted, "evicted memoized timecode");
                }
            }
        }

        Timecode {
            code,
            expiry_ms,
            position,
        }
    }

    pub fn bucket_width_ms(&self) -> u64 {
        self.width_ms
    }

    /// Number of buckets currently memoized.
    pub fn memoized(&self) -> usize {
        self.memo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Clock that tests move by hand.
    struct ManualClock(Cell<u64>);

    impl ManualClock {
        fn advance(&self, ms: u64) {
            self.0.set(self.0.get() + ms);
        }
    }

    impl Clock for &ManualClock {
        fn now_ms(&self) -> u64 {
            self.0.get()
        }
    }

    fn config(seed: &str, size: usize, seconds: u64) -> TimecodeConfig {
        TimecodeConfig {
            seed: seed.into(),
            size,
            seconds,
            memo_capacity: 64,
        }
    }

    #[test]
    fn known_code_for_reference_bucket() {
        let mut timecodes = TimecodeGenerator::new(&config("timecode", 6, 30), SystemClock).unwrap();
        let tc = timecodes.at(1_700_000_010_000);
        assert_eq!(tc.code, "RX1X9Y");
        assert_eq!(tc.position, 1_700_000_010_000);
        assert_eq!(tc.expiry_ms, 30_000);

        let mut demo = TimecodeGenerator::new(&config("demo", 8, 30), SystemClock).unwrap();
        let tc = demo.at(0);
        assert_eq!(tc.code, "NSEKPR9B");
        assert_eq!(tc.position, 0);
    }

    #[test]
    fn code_stable_within_bucket() {
        let clock = ManualClock(Cell::new(1_700_000_010_000));
        let mut timecodes = TimecodeGenerator::new(&config("timecode", 6, 30), &clock).unwrap();
        let first = timecodes.current();
        let mut last_expiry = first.expiry_ms;
        for _ in 0..29 {
            clock.advance(1_000);
            let tc = timecodes.current();
            assert_eq!(tc.code, first.code);
            assert_eq!(tc.position, first.position);
            assert!(tc.expiry_ms <= last_expiry);
            last_expiry = tc.expiry_ms;
        }
        assert_eq!(last_expiry, 1_000);
        assert_eq!(timecodes.memoized(), 1);
    }

    #[test]
    fn code_changes_across_buckets() {
        let clock = ManualClock(Cell::new(1_700_000_010_000));
        let mut timecodes = TimecodeGenerator::new(&config("timecode", 6, 30), &clock).unwrap();
        let first = timecodes.current();
        clock.advance(timecodes.bucket_width_ms());
        let second = timecodes.current();
        assert_eq!(second.position, first.position + 30_000);
        assert_ne!(second.code, first.code);
    }

    #[test]
    fn expiry_counts_down_to_bucket_end() {
        let mut timecodes = TimecodeGenerator::new(&config("t", 4, 10), SystemClock).unwrap();
        let tc = timecodes.at(12_345);
        assert_eq!(tc.position, 10_000);
        assert_eq!(tc.expiry_ms, 7_655);
        assert_eq!(timecodes.at(19_999).expiry_ms, 1);
        assert_eq!(timecodes.at(20_000).expiry_ms, 10_000);
    }

    #[test]
    fn code_is_deterministic_across_generators() {
        let mut a = TimecodeGenerator::new(&config("shared", 6, 30), SystemClock).unwrap();
        let mut b = TimecodeGenerator::new(&config("shared", 6, 30), SystemClock).unwrap();
        for now in [0, 29_999, 30_000, 1_234_567_890] {
            assert_eq!(a.at(now), b.at(now));
        }
    }

    #[test]
    fn code_uses_alphabet_and_size() {
        let mut timecodes = TimecodeGenerator::new(&config("alpha", 12, 30), SystemClock).unwrap();
        let tc = timecodes.at(999_999);
        assert_eq!(tc.code.len(), 12);
        assert!(tc.code.bytes().all(|c| ALPHABET.contains(&c)), "{}", tc.code);
    }

    #[test]
    fn memo_is_bounded_and_evicts_oldest() {
        let mut cfg = config("memo", 6, 1);
        cfg.memo_capacity = 3;
        let mut timecodes = TimecodeGenerator::new(&cfg, SystemClock).unwrap();
        let first = timecodes.at(0);
        for second in 1..10 {
            timecodes.at(second * 1_000);
        }
        assert_eq!(timecodes.memoized(), 3);
        // Regenerated after eviction, still identical.
        assert_eq!(timecodes.at(0).code, first.code);
    }

    #[test]
    fn zero_capacity_disables_memo() {
        let mut cfg = config("memo", 6, 1);
        cfg.memo_capacity = 0;
        let mut timecodes = TimecodeGenerator::new(&cfg, SystemClock).unwrap();
        let a = timecodes.at(5_000);
        let b = timecodes.at(5_500);
        assert_eq!(a.code, b.code);
        assert_eq!(timecodes.memoized(), 0);
    }

    #[test]
    fn zero_size_gives_empty_code() {
        let mut timecodes = TimecodeGenerator::new(&config("empty", 0, 30), SystemClock).unwrap();
        assert_eq!(timecodes.at(0).code, "");
    }

    #[test]
    fn zero_seconds_is_rejected() {
        let err = TimecodeGenerator::new(&config("bad", 6, 0), SystemClock).err().unwrap();
        assert!(matches!(err, TesseraError::InvalidBucketWidth { seconds: 0 }));
    }

    #[test]
    fn overflowing_width_is_rejected() {
        let result = TimecodeGenerator::new(&config("bad", 6, u64::MAX), SystemClock);
        assert!(result.is_err());
    }

    #[test]
    fn encode_maps_extremes() {
        assert_eq!(encode(&[0.0, 0.999_999, 0.5]), "0ZG");
    }
}
