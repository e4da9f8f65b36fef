// Tessera engine: reproducible random batches and rotating timecodes.
//
// Builds on `tessera_prng` (string-seeded sfc32) to provide the consumer-
// facing pieces of the project. No I/O beyond reading a config file.
//
// Architecture:
// - engine.rs: `GenerationEngine`: per-generation reseeded batches with a
//   bounded FIFO history, random access via `to()` / `batch_at()`
// - timecode.rs: `TimecodeGenerator`: time bucket → engine generation →
//   Crockford base32 code, with a bounded per-bucket memo
// - selftest.rs: replay checksum used by the `tessera selftest` command and
//   the integration tests to prove determinism
// - config.rs: `TesseraConfig` loaded from JSON
// - error.rs: `TesseraError` and the `Result` alias
// - main.rs: `tessera` CLI (timecode / batches / selftest)
//
// Everything here is deterministic given a seed; wall-clock time enters only
// through the `Clock` passed to a `TimecodeGenerator`.

pub mod config;
pub mod engine;
pub mod error;
pub mod selftest;
pub mod timecode;

pub use config::{EngineConfig, TesseraConfig, TimecodeConfig};
pub use engine::GenerationEngine;
pub use error::{Result, TesseraError};
pub use timecode::{Clock, SystemClock, Timecode, TimecodeGenerator};
