use std::sync::LazyLock;

use super::piece::{Color, Figure};
use super::position::Position;
use super::rng::XorShift64;
use super::square::Square;

struct ZobristKeys {
    /// [figure][square], figure index as in `Figure::to_index`
    piece: [[u64; 64]; Figure::COUNT],
    /// XORed in when black is to move
    side: u64,
    /// one key per castling-rights value (4 bits -> 16 values)
    castling: [u64; 16],
    /// per en-passant target square. Only active while a target is set
    ep: [u64; 64],
}

static KEYS: LazyLock<ZobristKeys> = LazyLock::new(|| {
    let mut rng = XorShift64::new(0x3243F6A8885A308D); // fixed seed

    let mut piece = [[0u64; 64]; Figure::COUNT];
    for figure_keys in &mut piece {
        for key in figure_keys {
            *key = rng.next();
        }
    }

    let side = rng.next();

    let mut castling = [0u64; 16];
    for key in &mut castling {
        *key = rng.next();
    }

    let mut ep = [0u64; 64];
    for key in &mut ep {
        *key = rng.next();
    }

    ZobristKeys { piece, side, castling, ep }
});

/// Force-init all Zobrist keys. Keys are also lazily initialized on first access.
pub fn init_zobrist() {
    LazyLock::force(&KEYS);
}

#[inline]
pub fn piece_key(figure: Figure, sq: Square) -> u64 {
    KEYS.piece[figure.to_index()][sq.to_index()]
}

#[inline]
pub fn side_key() -> u64 {
    KEYS.side
}

#[inline]
pub fn castling_key(rights: u8) -> u64 {
    KEYS.castling[rights as usize & 0xF]
}

#[inline]
pub fn ep_key(sq: Square) -> u64 {
    KEYS.ep[sq.to_index()]
}

/// Hash of `position` computed from scratch. Must always equal the incrementally
/// maintained `Position::hash`.
pub fn hash(position: &Position) -> u64 {
    let mut h = 0u64;
    for i in 0..Figure::COUNT {
        let Some(figure) = Figure::from_index(i) else { continue };
        for sq in position.figure_bb(figure).iter() {
            h ^= piece_key(figure, sq);
        }
    }
    if let Some(ep) = position.en_passant() {
        h ^= ep_key(ep);
    }
    h ^= castling_key(position.castling_rights().bits());
    if position.side_to_move() == Color::Black {
        h ^= side_key();
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::piece::Piece;

    #[test]
    fn test_keys_nonzero() {
        init_zobrist();
        assert_ne!(piece_key(Figure::new(Color::White, Piece::Pawn), Square::A1), 0);
        assert_ne!(side_key(), 0);
        assert_ne!(castling_key(0b1111), 0);
        assert_ne!(ep_key(Square::new(20)), 0);
    }

    #[test]
    fn test_keys_unique() {
        let wp = Figure::new(Color::White, Piece::Pawn);
        let k1 = piece_key(wp, Square::A1);
        let k2 = piece_key(wp, Square::new(1));
        let k3 = piece_key(Figure::new(Color::White, Piece::Knight), Square::A1);
        let k4 = piece_key(Figure::new(Color::Black, Piece::Pawn), Square::A1);
        assert_ne!(k1, k2);
        assert_ne!(k1, k3);
        assert_ne!(k1, k4);
    }

    #[test]
    fn test_keys_fixed_across_runs() {
        // first draw of the fixed-seed generator pins the whole key schedule
        assert_eq!(
            piece_key(Figure::new(Color::White, Piece::Pawn), Square::A1),
            0xD8D6_D9C2_868F_07AC
        );
    }

    #[test]
    fn test_keys_drawn_from_shared_generator() {
        let mut rng = XorShift64::new(0x3243F6A8885A308D);
        assert_eq!(piece_key(Figure::new(Color::White, Piece::Pawn), Square::A1), rng.next());
    }

    #[test]
    fn test_startpos_hash_matches_recompute() {
        let pos = Position::default();
        assert_eq!(pos.hash(), hash(&pos));
    }

    #[test]
    fn test_xor_cancellation() {
        let mut h = 0u64;
        let key = piece_key(Figure::new(Color::White, Piece::Rook), Square::new(28));
        h ^= key;
        h ^= key;
        assert_eq!(h, 0);
    }
}

// Each position gets a near-unique 64-bit hash used for the transposition table, repetition
// detection, and as a make-move consistency check.
// 1. pregenerate a random 64-bit key for every (figure, square), side to move, castling value,
//    and en passant target
// 2. position hash = XOR of all applicable keys
// 3. when making a move, XOR out removed features and XOR in added ones
// XOR is its own inverse, so updates are O(1) per move instead of O(# of pieces).

// Fixed seed: every run and every platform sees the same keys, which tests rely on.
