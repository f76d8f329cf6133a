use crate::board::ChessMove;

pub type Score = i32;

/// Half the representable range: negation and mate-distance arithmetic cannot overflow.
pub const SCORE_INFINITY: Score = i32::MAX / 2;
pub const SCORE_MATE: Score = 1_000_000;
pub const SCORE_DRAW: Score = 0;
pub const MAX_PLY: usize = 64;
/// Any score at least this far from zero is a forced mate.
pub const MATE_BOUND: Score = SCORE_MATE - MAX_PLY as Score;
/// Deepest nominal iteration; the rest of `MAX_PLY` is headroom for extensions and quiescence.
pub const MAX_DEPTH: u8 = (MAX_PLY / 2) as u8;
pub const DEFAULT_DEPTH: u8 = 6;
pub const DEFAULT_HASH_MB: usize = 64;
pub const HISTORY_MAX: Score = 16_384;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub hash_mb: usize,
    /// depth used when `go` names neither depth nor time
    pub default_depth: u8,
    /// carry the history table from one search to the next within a game
    pub keep_history: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_mb: DEFAULT_HASH_MB,
            default_depth: DEFAULT_DEPTH,
            keep_history: false,
        }
    }
}

/// Budget for one search. With neither field set the configured default depth applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: Option<u8>,
    /// wall-clock budget; no new depth starts once half of it is spent
    pub time_ms: Option<u64>,
    pub infinite: bool,
}

impl SearchLimits {
    pub fn depth(depth: u8) -> Self {
        Self { depth: Some(depth), ..Self::default() }
    }

    pub fn movetime(ms: u64) -> Self {
        Self { time_ms: Some(ms), ..Self::default() }
    }

    pub fn infinite() -> Self {
        Self { infinite: true, ..Self::default() }
    }
}

/// Emitted after each completed iterative-deepening depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IterationReport {
    pub depth: u8,
    pub score: Score,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub pv: Vec<ChessMove>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// head of `pv`; `None` when the root has no legal move or the search was aborted
    pub best_move: Option<ChessMove>,
    pub score: Score,
    pub depth: u8,
    pub nodes: u64,
    pub pv: Vec<ChessMove>,
}

impl SearchResult {
    /// Moves to mate, positive when the side to move mates, negative when it is mated.
    pub fn mate_in(&self) -> Option<i32> {
        mate_distance(self.score)
    }
}

/// Full moves to mate encoded in `score`, if it is a mate score.
pub fn mate_distance(score: Score) -> Option<i32> {
    if score.abs() < MATE_BOUND {
        return None;
    }
    let plies = SCORE_MATE - score.abs();
    let moves = (plies + 1) / 2;
    Some(if score > 0 { moves } else { -moves })
}
