// Error type for the engine crate.
//
// The engine itself is pure arithmetic and cannot fail once constructed. The
// only fallible paths are construction with a degenerate timecode bucket and
// loading configuration from disk or JSON.

/// Result alias that carries [`TesseraError`].
pub type Result<T> = std::result::Result<T, TesseraError>;

#[derive(Debug, thiserror::Error)]
pub enum TesseraError {
    /// A timecode bucket must be at least one second wide and its width in
    /// milliseconds must fit in a `u64`.
    #[error("invalid timecode bucket width: {seconds} s")]
    InvalidBucketWidth { seconds: u64 },
    /// Malformed configuration JSON.
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}
