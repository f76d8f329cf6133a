use super::bitboard::BitBoard;
use super::piece::Color;
use super::square::Square;

/// Castling rights stored as a 4-bit mask
/// Bit 0: White kingside, Bit 1: White queenside
/// Bit 2: Black kingside, Bit 3: Black queenside
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const WHITE_KING_SIDE: u8 = 1;
    pub const WHITE_QUEEN_SIDE: u8 = 2;
    pub const BLACK_KING_SIDE: u8 = 4;
    pub const BLACK_QUEEN_SIDE: u8 = 8;

    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        CastlingRights(bits & 0b1111)
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn contains(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Rights only ever shrink during a game.
    #[inline]
    pub fn remove(&mut self, flags: u8) {
        self.0 &= !flags;
    }

    #[inline]
    pub(crate) fn insert(&mut self, flags: u8) {
        self.0 |= flags & 0b1111;
    }

    /// Drop every right invalidated by a move touching `from` and `to`.
    #[inline]
    pub fn update_for_move(&mut self, from: Square, to: Square) {
        self.0 &= CASTLING_MASK[from.to_index()] & CASTLING_MASK[to.to_index()];
    }
}

// When a piece moves from or to square X, AND the rights with CASTLING_MASK[X].
// Covers king moves, rook moves, and rooks captured on their home square.
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0xFFu8; 64];
    mask[0] = 0xFF ^ CastlingRights::WHITE_QUEEN_SIDE; // a1
    mask[7] = 0xFF ^ CastlingRights::WHITE_KING_SIDE; // h1
    mask[4] = 0xFF ^ (CastlingRights::WHITE_KING_SIDE | CastlingRights::WHITE_QUEEN_SIDE); // e1
    mask[56] = 0xFF ^ CastlingRights::BLACK_QUEEN_SIDE; // a8
    mask[63] = 0xFF ^ CastlingRights::BLACK_KING_SIDE; // h8
    mask[60] = 0xFF ^ (CastlingRights::BLACK_KING_SIDE | CastlingRights::BLACK_QUEEN_SIDE); // e8
    mask
};

/// Geometry of one castling move.
#[derive(Clone, Copy, Debug)]
pub struct CastlePath {
    pub right: u8,
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
    /// squares between king and rook, all must be empty
    pub between: BitBoard,
    /// the square the king passes over; it and `king_from` must not be attacked
    pub passed: Square,
}

const fn bits(squares: &[u8]) -> BitBoard {
    let mut b = 0u64;
    let mut i = 0;
    while i < squares.len() {
        b |= 1u64 << squares[i];
        i += 1;
    }
    BitBoard(b)
}

/// [kingside, queenside] per color
pub const CASTLE_PATHS: [[CastlePath; 2]; 2] = [
    [
        CastlePath {
            right: CastlingRights::WHITE_KING_SIDE,
            king_from: Square::E1,
            king_to: Square::G1,
            rook_from: Square::H1,
            rook_to: Square::F1,
            between: bits(&[5, 6]),
            passed: Square::F1,
        },
        CastlePath {
            right: CastlingRights::WHITE_QUEEN_SIDE,
            king_from: Square::E1,
            king_to: Square::C1,
            rook_from: Square::A1,
            rook_to: Square::D1,
            between: bits(&[1, 2, 3]),
            passed: Square::D1,
        },
    ],
    [
        CastlePath {
            right: CastlingRights::BLACK_KING_SIDE,
            king_from: Square::E8,
            king_to: Square::G8,
            rook_from: Square::H8,
            rook_to: Square::F8,
            between: bits(&[61, 62]),
            passed: Square::F8,
        },
        CastlePath {
            right: CastlingRights::BLACK_QUEEN_SIDE,
            king_from: Square::E8,
            king_to: Square::C8,
            rook_from: Square::A8,
            rook_to: Square::D8,
            between: bits(&[57, 58, 59]),
            passed: Square::D8,
        },
    ],
];

#[inline]
pub fn castle_paths(color: Color) -> &'static [CastlePath; 2] {
    &CASTLE_PATHS[color.to_index()]
}

/// The path whose king destination is `king_to`, for a castling move by `color`.
pub fn castle_path_to(color: Color, king_to: Square) -> Option<&'static CastlePath> {
    castle_paths(color).iter().find(|p| p.king_to == king_to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_king_move_clears_both() {
        let mut rights = CastlingRights::ALL;
        rights.update_for_move(Square::E1, Square::new(12));
        assert!(!rights.contains(CastlingRights::WHITE_KING_SIDE));
        assert!(!rights.contains(CastlingRights::WHITE_QUEEN_SIDE));
        assert!(rights.contains(CastlingRights::BLACK_KING_SIDE | CastlingRights::BLACK_QUEEN_SIDE));
    }

    #[test]
    fn test_rook_capture_on_home_square_clears_right() {
        let mut rights = CastlingRights::ALL;
        // some piece lands on h8
        rights.update_for_move(Square::new(40), Square::H8);
        assert_eq!(rights.bits(), 0b1111 & !CastlingRights::BLACK_KING_SIDE);
    }

    #[test]
    fn test_unrelated_move_keeps_rights() {
        let mut rights = CastlingRights::ALL;
        rights.update_for_move(Square::new(12), Square::new(28));
        assert_eq!(rights, CastlingRights::ALL);
    }

    #[test]
    fn test_paths_are_consistent() {
        for color in Color::BOTH {
            for path in castle_paths(color) {
                assert!(path.between.contains(path.passed));
                assert!(path.between.contains(path.rook_to));
                assert_eq!(path.king_from.rank(), path.rook_from.rank());
            }
        }
        assert_eq!(castle_path_to(Color::Black, Square::C8).map(|p| p.rook_from), Some(Square::A8));
        assert!(castle_path_to(Color::White, Square::E1).is_none());
    }
}

// CASTLING_MASK -> instead of "did king or rook move" conditionals, a 64-entry lookup. Most entries
// are 0xFF (no change); king and rook home squares clear their bits. Applying it to both the
// origin and destination also handles a rook being captured at home.
