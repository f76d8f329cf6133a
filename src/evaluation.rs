use crate::board::{Color, Figure, Position, Square};

use crate::pst::{EG_PIECE_VALUE, EG_TABLE, MG_PIECE_VALUE, MG_TABLE, PHASE_WEIGHT, TOTAL_PHASE};
use crate::types::Score;

/// Tables are laid out a8 first. White reads them with the rank flipped; Black reads the raw
/// index, which is the same table mirrored onto its own side of the board.
#[inline]
fn table_index(color: Color, sq: Square) -> usize {
    match color {
        Color::White => sq.flip_rank().to_index(),
        Color::Black => sq.to_index(),
    }
}

/// Tapered material + piece-square evaluation, always from White's point of view.
/// The search negates it for Black.
pub fn evaluate(pos: &Position) -> Score {
    let mut mg_score: [Score; 2] = [0, 0]; // [white, black]
    let mut eg_score: [Score; 2] = [0, 0];
    let mut phase: i32 = 0;

    for i in 0..Figure::COUNT {
        let Some(figure) = Figure::from_index(i) else { continue };
        let idx = figure.piece.to_index();
        let side = figure.color.to_index();

        for sq in pos.figure_bb(figure).iter() {
            let t = table_index(figure.color, sq);
            mg_score[side] += MG_PIECE_VALUE[idx] + MG_TABLE[idx][t];
            eg_score[side] += EG_PIECE_VALUE[idx] + EG_TABLE[idx][t];
            phase += PHASE_WEIGHT[idx];
        }
    }

    // promoted material can push past the opening total
    let phase = phase.min(TOTAL_PHASE);

    let mg = mg_score[0] - mg_score[1];
    let eg = eg_score[0] - eg_score[1];
    (mg * phase + eg * (TOTAL_PHASE - phase)) / TOTAL_PHASE
}

/// `evaluate` seen from the side to move.
#[inline]
pub fn evaluate_relative(pos: &Position) -> Score {
    match pos.side_to_move() {
        Color::White => evaluate(pos),
        Color::Black => -evaluate(pos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(fen: &str) -> Score {
        evaluate(&fen.parse().unwrap())
    }

    #[test]
    fn test_startpos_is_balanced() {
        assert_eq!(evaluate(&Position::default()), 0);
    }

    #[test]
    fn test_white_up_queen() {
        let score = eval("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert!(score > 800, "White up a queen should score high, got {}", score);
    }

    #[test]
    fn test_score_is_white_relative() {
        // same material deficit for White, whoever is to move
        let white_to_move = eval("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1");
        let black_to_move = eval("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR b KQkq - 0 1");
        assert!(white_to_move < -800);
        assert_eq!(white_to_move, black_to_move);

        let pos: Position = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR b KQkq - 0 1".parse().unwrap();
        assert!(evaluate_relative(&pos) > 800);
    }

    #[test]
    fn test_color_mirror_negates() {
        // a position and its color-flipped mirror score as opposites
        let a = eval("4k3/8/8/8/3N4/8/4P3/4K3 w - - 0 1");
        let b = eval("4k3/4p3/8/3n4/8/8/8/4K3 b - - 0 1");
        assert_eq!(a, -b);
        assert!(a > 0);
    }

    #[test]
    fn test_endgame_king_centralised() {
        // bare kings: the endgame table rewards the centre
        let central = eval("4k3/8/8/8/3K4/8/8/8 w - - 0 1");
        let corner = eval("4k3/8/8/8/8/8/8/K7 w - - 0 1");
        assert!(central > corner);
    }
}

// Tapered evaluation: compute separate midgame and endgame scores and blend them by how much
// material is left ("game phase").

// With all pieces on board `phase = 24` (full midgame). Phase shrinks toward 0 as pieces are
// traded. Score = (mg * phase + eg * (24 - phase)) / 24: king stays home in the midgame and walks
// to the centre in the endgame.
