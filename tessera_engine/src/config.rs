// Data-driven engine configuration.
//
// `TesseraConfig` groups the parameters of the two consumers of the PRNG: the
// batch engine (`EngineConfig`) and the rotating timecode (`TimecodeConfig`).
// It is loaded from JSON, and every field has a default so partial files only
// override what they name.
//
// See also: `engine.rs` (`GenerationEngine::from_config`) and `timecode.rs`
// (`TimecodeGenerator::new`), which consume these structs.
//
// **Critical constraint: determinism.** Seeds and sizes feed directly into the
// generated output. Two processes with equal configs produce equal batches
// and equal codes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Parameters for a `GenerationEngine`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base seed. Generation `g` draws from the stream seeded `"{seed}-{g}"`.
    pub seed: String,
    /// Values produced per generation.
    pub size: usize,
    /// Maximum number of batches retained in history. 0 retains nothing.
    pub memory: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: "tessera".to_string(),
            size: 16,
            memory: 8,
        }
    }
}

/// Parameters for a `TimecodeGenerator`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimecodeConfig {
    pub seed: String,
    /// Characters per code.
    pub size: usize,
    /// Bucket width in seconds. Must be positive.
    pub seconds: u64,
    /// Maximum number of memoized buckets before the oldest is evicted.
    pub memo_capacity: usize,
}

impl Default for TimecodeConfig {
    fn default() -> Self {
        Self {
            seed: "tessera".to_string(),
            size: 6,
            seconds: 30,
            memo_capacity: 64,
        }
    }
}

/// Top-level configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseraConfig {
    pub engine: EngineConfig,
    pub timecode: TimecodeConfig,
}

impl TesseraConfig {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
