use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::board::{ChessMove, Figure, MoveList, MoveScope, Position, generate_moves};

use crate::evaluation::evaluate_relative;
use crate::ordering::{HistoryTable, OrderingContext, order_moves, reward_history, store_killer};
use crate::tt::{Bound, TranspositionTable};
use crate::types::{
    EngineConfig, IterationReport, MATE_BOUND, MAX_DEPTH, MAX_PLY, SCORE_DRAW, SCORE_INFINITY, SCORE_MATE, Score,
    SearchLimits, SearchResult,
};

/// Triangular principal-variation table: row `ply` holds the best line from that ply on.
struct PvTable {
    moves: [[ChessMove; MAX_PLY]; MAX_PLY],
    len: [usize; MAX_PLY],
}

impl PvTable {
    fn new() -> Box<Self> {
        Box::new(Self {
            moves: [[ChessMove::NULL; MAX_PLY]; MAX_PLY],
            len: [0; MAX_PLY],
        })
    }

    /// Empty line at `ply`, before any child is searched.
    #[inline]
    fn start(&mut self, ply: usize) {
        self.len[ply] = ply;
    }

    /// `mv` followed by the child's line becomes the line at `ply`.
    fn update(&mut self, ply: usize, mv: ChessMove) {
        self.moves[ply][ply] = mv;
        let child_len = self.len[ply + 1].max(ply + 1);
        for i in ply + 1..child_len {
            self.moves[ply][i] = self.moves[ply + 1][i];
        }
        self.len[ply] = child_len;
    }

    fn root_line(&self) -> Vec<ChessMove> {
        self.moves[0][..self.len[0]].to_vec()
    }
}

/// How the caller observes and steers a running search.
pub trait SearchControl {
    /// Called after every completed depth. `Break` ends the search with that depth's result.
    fn iteration(&mut self, report: &IterationReport) -> ControlFlow<()>;

    /// Polled every few thousand nodes from the second depth on. `true` abandons the depth in
    /// progress; the result of the last completed depth stands.
    fn should_abort(&mut self) -> bool {
        false
    }
}

impl<F> SearchControl for F
where
    F: FnMut(&IterationReport) -> ControlFlow<()>,
{
    fn iteration(&mut self, report: &IterationReport) -> ControlFlow<()> {
        self(report)
    }
}

const POLL_INTERVAL: u64 = 2048;

/// Search state carried across the recursion and, for the table and optionally the history,
/// across searches of one game.
pub struct Searcher {
    config: EngineConfig,
    tt: TranspositionTable,
    killers: [[ChessMove; 2]; MAX_PLY],
    history: HistoryTable,
    pv: Box<PvTable>,
    nodes: u64,
    /// game history followed by the hashes of the current search path
    path: Vec<u64>,
    deadline: Option<Instant>,
    next_poll: u64,
    abortable: bool,
    aborted: bool,
}

impl Searcher {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            tt: TranspositionTable::new(config.hash_mb),
            killers: [[ChessMove::NULL; 2]; MAX_PLY],
            history: [[0; 64]; Figure::COUNT],
            pv: PvTable::new(),
            nodes: 0,
            path: Vec::with_capacity(256),
            deadline: None,
            next_poll: POLL_INTERVAL,
            abortable: false,
            aborted: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply a new configuration; the table is rebuilt only when its size changes.
    pub fn configure(&mut self, config: EngineConfig) {
        if config.hash_mb != self.config.hash_mb {
            self.tt = TranspositionTable::new(config.hash_mb);
        }
        self.config = config;
    }

    /// Forget everything learned in the previous game.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.history = [[0; 64]; Figure::COUNT];
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    fn prepare(&mut self, game_history: &[u64], deadline: Option<Instant>) {
        self.nodes = 0;
        self.next_poll = POLL_INTERVAL;
        self.deadline = deadline;
        self.abortable = false;
        self.aborted = false;
        self.killers = [[ChessMove::NULL; 2]; MAX_PLY];
        if !self.config.keep_history {
            self.history = [[0; 64]; Figure::COUNT];
        }
        self.tt.new_search();
        self.path.clear();
        self.path.extend_from_slice(game_history);
    }

    /// Iterative deepening from depth 1 up to the limit.
    ///
    /// `game_history` holds the hashes of the positions played before `pos`, for repetition
    /// detection. Depth 1 always completes, so a position with a legal move always yields one.
    pub fn search<C: SearchControl>(
        &mut self,
        pos: &Position,
        game_history: &[u64],
        limits: SearchLimits,
        mut control: C,
    ) -> SearchResult {
        let start = Instant::now();
        let deadline = limits.time_ms.map(|ms| start + Duration::from_millis(ms));
        self.prepare(game_history, deadline);

        let max_depth = if limits.infinite || (limits.depth.is_none() && limits.time_ms.is_some()) {
            MAX_DEPTH
        } else {
            limits.depth.unwrap_or(self.config.default_depth).clamp(1, MAX_DEPTH)
        };

        let mut result = SearchResult::default();
        for depth in 1..=max_depth {
            self.abortable = depth > 1;
            let score = self.negamax(&mut control, pos, -SCORE_INFINITY, SCORE_INFINITY, depth as i32, 0);
            if self.aborted {
                debug!(depth, nodes = self.nodes, "depth abandoned");
                break;
            }

            let pv = self.pv.root_line();
            let elapsed_ms = start.elapsed().as_millis() as u64;
            result = SearchResult {
                best_move: pv.first().copied(),
                score,
                depth,
                nodes: self.nodes,
                pv,
            };
            debug!(depth, score, nodes = self.nodes, elapsed_ms, "depth complete");

            let report = IterationReport {
                depth,
                score,
                nodes: self.nodes,
                elapsed_ms,
                pv: result.pv.clone(),
            };
            if control.iteration(&report).is_break() {
                break;
            }

            // nothing to play, or nothing left to find
            if result.best_move.is_none() || (score.abs() >= MATE_BOUND && !limits.infinite) {
                break;
            }
            // don't start a depth that is unlikely to finish
            if limits.time_ms.is_some_and(|budget| elapsed_ms.saturating_mul(2) > budget) {
                break;
            }
        }
        result.nodes = self.nodes;
        result
    }

    fn poll<C: SearchControl>(&mut self, control: &mut C) -> bool {
        if self.aborted {
            return true;
        }
        if !self.abortable || self.nodes < self.next_poll {
            return false;
        }
        self.next_poll = self.nodes + POLL_INTERVAL;
        self.aborted = self.deadline.is_some_and(|d| Instant::now() >= d) || control.should_abort();
        self.aborted
    }

    fn is_draw(&self, pos: &Position) -> bool {
        pos.halfmove_clock() >= 100 || self.path.contains(&pos.hash())
    }

    /// Fail-hard negamax with alpha-beta pruning.
    fn negamax<C: SearchControl>(
        &mut self,
        control: &mut C,
        pos: &Position,
        mut alpha: Score,
        beta: Score,
        mut depth: i32,
        ply: usize,
    ) -> Score {
        self.pv.start(ply);
        if self.poll(control) {
            return 0;
        }

        if ply > 0 && self.is_draw(pos) {
            return SCORE_DRAW;
        }
        if ply >= MAX_PLY - 1 {
            return evaluate_relative(pos);
        }

        let in_check = pos.in_check();
        if in_check {
            depth += 1;
        }
        if depth <= 0 {
            return self.quiescence(control, pos, alpha, beta, ply);
        }

        let hash = pos.hash();
        let mut hash_move = ChessMove::NULL;
        if let Some(entry) = self.tt.probe(hash) {
            hash_move = entry.best_move.unwrap_or(ChessMove::NULL);
            if ply > 0 && i32::from(entry.depth) >= depth {
                if let Some(score) = entry.usable_score(ply, alpha, beta) {
                    return score;
                }
            }
        }

        let mut moves = MoveList::new();
        generate_moves(pos, &mut moves);
        let ordered = {
            let ctx = OrderingContext { hash_move, killers: &self.killers[ply], history: &self.history };
            order_moves(pos, &moves, &ctx)
        };

        let tt_depth = depth.clamp(0, u8::MAX as i32) as u8;
        let mut best_move = ChessMove::NULL;
        let mut legal = 0;

        self.path.push(hash);
        for scored in &ordered {
            let mv = scored.mv;
            let mut child = *pos;
            if !child.execute(mv, MoveScope::AllMoves) {
                continue;
            }
            legal += 1;
            self.nodes += 1;

            let score = -self.negamax(control, &child, -beta, -alpha, depth - 1, ply + 1);
            if self.aborted {
                self.path.pop();
                return 0;
            }

            if score > alpha {
                alpha = score;
                best_move = mv;
                self.pv.update(ply, mv);

                if alpha >= beta {
                    if !mv.is_capture() {
                        store_killer(&mut self.killers[ply], mv);
                        reward_history(&mut self.history, mv, depth);
                    }
                    self.path.pop();
                    self.tt.store(hash, tt_depth, beta, Bound::Lower, Some(mv), ply);
                    return beta;
                }
            }
        }
        self.path.pop();

        if legal == 0 {
            return if in_check { -SCORE_MATE + ply as Score } else { SCORE_DRAW };
        }

        let (bound, stored_move) = if best_move.is_null() {
            (Bound::Upper, hash_move)
        } else {
            (Bound::Exact, best_move)
        };
        self.tt.store(hash, tt_depth, alpha, bound, (!stored_move.is_null()).then_some(stored_move), ply);
        alpha
    }

    /// Captures only, on top of a stand-pat bound, until the position is quiet.
    fn quiescence<C: SearchControl>(
        &mut self,
        control: &mut C,
        pos: &Position,
        mut alpha: Score,
        beta: Score,
        ply: usize,
    ) -> Score {
        self.pv.start(ply);
        if self.poll(control) {
            return 0;
        }

        let stand_pat = evaluate_relative(pos);
        if ply >= MAX_PLY - 1 {
            return stand_pat;
        }
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut moves = MoveList::new();
        generate_moves(pos, &mut moves);
        let ordered = {
            let ctx = OrderingContext {
                hash_move: ChessMove::NULL,
                killers: &self.killers[ply],
                history: &self.history,
            };
            order_moves(pos, &moves, &ctx)
        };

        for scored in &ordered {
            let mut child = *pos;
            if !child.execute(scored.mv, MoveScope::CapturesOnly) {
                continue;
            }
            self.nodes += 1;

            let score = -self.quiescence(control, &child, -beta, -alpha, ply + 1);
            if self.aborted {
                return 0;
            }
            if score > alpha {
                alpha = score;
                if alpha >= beta {
                    return beta;
                }
            }
        }
        trace!(ply, alpha, "quiescence done");
        alpha
    }
}


// Iterative deepening: search depth 1 -> 2 -> 3 ... Each iteration benefits from the ordering
// state (TT moves, killers, history) left by the previous one, and the last completed iteration is
// always a valid answer.

// Negamax: minimax from the side to move's point of view; a child's score is negated.

// Alpha-beta, fail-hard: scores are clamped to [alpha, beta]. A cutoff returns beta.

// Check extension: a node in check searches one ply deeper, so the horizon never falls on a
// position where standing pat would be illegal.

// Quiescence: at the horizon, keep searching captures so an exchange is never cut in half.
