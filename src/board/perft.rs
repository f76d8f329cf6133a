use super::chessmove::ChessMove;
use super::movegen::{MoveList, generate_moves};
use super::position::{MoveScope, Position};

/// Count leaf nodes of the legal move tree to `depth`.
pub fn perft(pos: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut moves = MoveList::new();
    generate_moves(pos, &mut moves);

    let mut nodes = 0;
    for mv in moves {
        let mut child = *pos;
        if !child.execute(mv, MoveScope::AllMoves) {
            continue;
        }
        nodes += if depth == 1 { 1 } else { perft(&child, depth - 1) };
    }
    nodes
}

/// Per-root-move breakdown of `perft`, in generation order.
pub fn divide(pos: &Position, depth: u32) -> Vec<(ChessMove, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    let mut moves = MoveList::new();
    generate_moves(pos, &mut moves);

    moves
        .into_iter()
        .filter_map(|mv| {
            let mut child = *pos;
            child.execute(mv, MoveScope::AllMoves).then(|| (mv, perft(&child, depth - 1)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(fen: &str, depth: u32) -> u64 {
        perft(&fen.parse().unwrap(), depth)
    }

    #[test]
    fn test_perft_startpos() {
        let pos = Position::default();
        assert_eq!(perft(&pos, 0), 1);
        assert_eq!(perft(&pos, 1), 20);
        assert_eq!(perft(&pos, 2), 400);
        assert_eq!(perft(&pos, 3), 8_902);
    }

    #[test]
    fn test_divide_sums_to_perft() {
        let pos: Position = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1".parse().unwrap();
        let split = divide(&pos, 2);
        assert_eq!(split.len(), 48);
        assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), 2_039);
    }

    #[test]
    fn test_perft_position_3() {
        assert_eq!(count("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 3), 2_812);
    }

    #[test]
    fn test_perft_promotions() {
        // "position 4": promotions, castling through check, pins
        assert_eq!(count("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1", 1), 6);
        assert_eq!(count("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1", 2), 264);
        assert_eq!(count("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1", 3), 9_467);
    }
}
