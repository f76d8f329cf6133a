use arrayvec::ArrayVec;

use crate::board::{ChessMove, Figure, MoveList, Piece, Position};
use crate::pst::MVV_VALUE;
use crate::types::{HISTORY_MAX, Score};

pub const HASH_MOVE_SCORE: Score = 1_000_000;
/// Added to every capture so that any capture outranks any quiet move.
pub const CAPTURE_OFFSET: Score = 100_000;
pub const QUEEN_PROMOTION_SCORE: Score = 95_000;
pub const KILLER_SCORES: [Score; 2] = [90_000, 80_000];

pub type HistoryTable = [[Score; 64]; Figure::COUNT];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: ChessMove,
    pub score: Score,
}

/// Ordering inputs gathered by the search for one node.
pub struct OrderingContext<'a> {
    pub hash_move: ChessMove,
    pub killers: &'a [ChessMove; 2],
    pub history: &'a HistoryTable,
}

/// Ordering key for `mv` in `pos`. Larger is searched first.
pub fn score_move(pos: &Position, mv: ChessMove, ctx: &OrderingContext<'_>) -> Score {
    if !ctx.hash_move.is_null() && mv == ctx.hash_move {
        return HASH_MOVE_SCORE;
    }
    if mv.is_capture() {
        // en passant lands on an empty square; the victim is a pawn
        let victim = pos.figure_on(mv.get_dest()).map_or(Piece::Pawn, |f| f.piece);
        return CAPTURE_OFFSET + MVV_VALUE[victim.to_index()] * 10 - mv.get_piece().to_index() as Score;
    }
    if mv.get_promotion() == Some(Piece::Queen) {
        return QUEEN_PROMOTION_SCORE;
    }
    if let Some(slot) = ctx.killers.iter().position(|&k| k == mv) {
        return KILLER_SCORES[slot];
    }
    ctx.history[mv.get_figure().to_index()][mv.get_dest().to_index()]
}

/// Score and sort `moves`, best first. The sort is stable: equal scores keep generation order.
pub fn order_moves(pos: &Position, moves: &MoveList, ctx: &OrderingContext<'_>) -> ArrayVec<ScoredMove, 256> {
    let mut scored: ArrayVec<ScoredMove, 256> =
        moves.iter().map(|&mv| ScoredMove { mv, score: score_move(pos, mv, ctx) }).collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Reward a quiet move that caused a cutoff at `depth`.
pub fn reward_history(history: &mut HistoryTable, mv: ChessMove, depth: i32) {
    let slot = &mut history[mv.get_figure().to_index()][mv.get_dest().to_index()];
    *slot = (*slot + depth * depth).min(HISTORY_MAX);
}

/// Make `mv` the first killer at this ply, shifting the old first into the second slot.
pub fn store_killer(killers: &mut [ChessMove; 2], mv: ChessMove) {
    if killers[0] != mv {
        killers[1] = killers[0];
        killers[0] = mv;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CandidateMove, generate_moves};

    const NO_KILLERS: [ChessMove; 2] = [ChessMove::NULL; 2];
    const NO_HISTORY: HistoryTable = [[0; 64]; Figure::COUNT];

    fn resolve(pos: &Position, text: &str) -> ChessMove {
        text.parse::<CandidateMove>().unwrap().resolve(pos)
    }

    fn ordered(pos: &Position, ctx: &OrderingContext<'_>) -> ArrayVec<ScoredMove, 256> {
        let mut moves = MoveList::new();
        generate_moves(pos, &mut moves);
        order_moves(pos, &moves, ctx)
    }

    #[test]
    fn test_mvv_lva() {
        // the e4 pawn and the d1 queen can both take on d5 (queen) or f5 (knight)
        let pos: Position = "4k3/8/8/3q1n2/4P3/8/8/3QK3 w - - 0 1".parse().unwrap();
        let ctx = OrderingContext { hash_move: ChessMove::NULL, killers: &NO_KILLERS, history: &NO_HISTORY };
        let pxq = score_move(&pos, resolve(&pos, "e4d5"), &ctx);
        let qxq = score_move(&pos, resolve(&pos, "d1d5"), &ctx);
        let pxn = score_move(&pos, resolve(&pos, "e4f5"), &ctx);
        assert!(pxq > qxq, "least valuable attacker first");
        assert!(qxq > pxn, "most valuable victim first");
        assert!(pxn > QUEEN_PROMOTION_SCORE);
    }

    #[test]
    fn test_captures_outrank_quiets() {
        let pos: Position = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1".parse().unwrap();
        let mut history = NO_HISTORY;
        for row in history.iter_mut() {
            row.fill(HISTORY_MAX);
        }
        let ctx = OrderingContext { hash_move: ChessMove::NULL, killers: &NO_KILLERS, history: &history };
        let list = ordered(&pos, &ctx);
        let first_quiet = list.iter().position(|s| !s.mv.is_capture()).unwrap();
        assert!(list[..first_quiet].iter().all(|s| s.mv.is_capture()));
        assert!(list[first_quiet..].iter().all(|s| !s.mv.is_capture()));
    }

    #[test]
    fn test_sorted_non_increasing_and_stable() {
        let pos = Position::default();
        let ctx = OrderingContext { hash_move: ChessMove::NULL, killers: &NO_KILLERS, history: &NO_HISTORY };
        let mut moves = MoveList::new();
        generate_moves(&pos, &mut moves);
        let list = order_moves(&pos, &moves, &ctx);

        assert!(list.windows(2).all(|w| w[0].score >= w[1].score));
        // all scores tie at zero: generation order survives
        let sorted: Vec<ChessMove> = list.iter().map(|s| s.mv).collect();
        assert_eq!(sorted, moves.to_vec());
    }

    #[test]
    fn test_hash_move_then_killers_then_history() {
        let pos = Position::default();
        let hash_move = resolve(&pos, "d2d4");
        let killers = [resolve(&pos, "g1f3"), resolve(&pos, "b1c3")];
        let mut history = NO_HISTORY;
        let e4 = resolve(&pos, "e2e4");
        reward_history(&mut history, e4, 3);

        let ctx = OrderingContext { hash_move, killers: &killers, history: &history };
        let list = ordered(&pos, &ctx);
        let head: Vec<String> = list.iter().take(4).map(|s| s.mv.to_string()).collect();
        assert_eq!(head, ["d2d4", "g1f3", "b1c3", "e2e4"]);
        assert_eq!(list[3].score, 9);
    }

    #[test]
    fn test_history_is_capped() {
        let pos = Position::default();
        let mv = resolve(&pos, "e2e4");
        let mut history = NO_HISTORY;
        for _ in 0..1000 {
            reward_history(&mut history, mv, 20);
        }
        assert_eq!(history[mv.get_figure().to_index()][mv.get_dest().to_index()], HISTORY_MAX);
        assert!(HISTORY_MAX < KILLER_SCORES[1]);
    }

    #[test]
    fn test_store_killer_shifts() {
        let pos = Position::default();
        let a = resolve(&pos, "a2a3");
        let b = resolve(&pos, "b2b3");
        let mut killers = NO_KILLERS;
        store_killer(&mut killers, a);
        store_killer(&mut killers, a);
        assert_eq!(killers, [a, ChessMove::NULL]);
        store_killer(&mut killers, b);
        assert_eq!(killers, [b, a]);
    }
}

// Priority order:
// 1. Hash move from the transposition table
// 2. Captures by MVV-LVA: most valuable victim first, least valuable attacker breaks ties
// 3. Quiet queen promotions
// 4. Killer moves: quiet moves that caused a beta cutoff at the same ply
// 5. History heuristic: quiet moves that often cause cutoffs (capped below the killers)
