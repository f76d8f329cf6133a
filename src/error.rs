//! Error types for the engine boundary.
//!
//! The hot paths (move execution, generation, search) report through `bool`/`Option`;
//! these errors appear where text, batches of moves, or the search thread are involved.

/// Errors that can occur at the engine boundary
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// FEN text could not be parsed into a position
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    /// Coordinate move text is malformed ("e2e4", "e7e8q")
    #[error("invalid move text '{0}'")]
    InvalidMoveText(String),

    /// Move text is well formed but matches no legal move in the position
    #[error("illegal move '{0}'")]
    IllegalMove(String),

    /// Incrementally maintained hash disagrees with a full recomputation
    #[error("hash mismatch: incremental {incremental:#018x}, recomputed {recomputed:#018x}")]
    HashMismatch { incremental: u64, recomputed: u64 },

    /// Search thread could not be started
    #[error("failed to start search thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    /// Search thread is gone
    #[error("search thread disconnected")]
    WorkerDisconnected,

    /// Search thread panicked
    #[error("search thread panicked")]
    SearchPanicked,
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
