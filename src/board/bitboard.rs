use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use super::square::{File, Rank, Square};

/// Bitboard is set of squares represented as 64-bit integer.
/// Each bit corresponds to square (bit 0 = A1, bit 63 = H8).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct BitBoard(pub u64);

/// empty bitboard.
pub const EMPTY: BitBoard = BitBoard(0);

pub const FILE_A: BitBoard = BitBoard(0x0101_0101_0101_0101);
pub const FILE_H: BitBoard = BitBoard(0x8080_8080_8080_8080);
pub const RANK_1: BitBoard = BitBoard(0x0000_0000_0000_00FF);
pub const RANK_3: BitBoard = BitBoard(0x0000_0000_00FF_0000);
pub const RANK_6: BitBoard = BitBoard(0x0000_FF00_0000_0000);
pub const RANK_8: BitBoard = BitBoard(0xFF00_0000_0000_0000);
pub const EDGES: BitBoard = BitBoard(FILE_A.0 | FILE_H.0 | RANK_1.0 | RANK_8.0);

const MAIN_DIAGONAL: u64 = 0x8040_2010_0804_0201; // a1-h8
const MAIN_ANTI_DIAGONAL: u64 = 0x0102_0408_1020_4080; // h1-a8

impl BitBoard {
    /// create a bitboard with a single square set.
    #[inline]
    pub fn from_square(sq: Square) -> Self {
        BitBoard(1u64 << sq.to_index())
    }

    /// population count (number of set bits).
    #[inline]
    pub fn popcnt(self) -> u32 {
        self.0.count_ones()
    }

    /// returns true if no bits are set.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn contains(self, sq: Square) -> bool {
        self.0 & (1u64 << sq.to_index()) != 0
    }

    /// lowest set square, if any.
    #[inline]
    pub fn first(self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Some(Square::new(self.0.trailing_zeros() as u8))
        }
    }

    /// iterate over set squares (yields each Square whose bit is 1).
    #[inline]
    pub fn iter(self) -> BitBoardIter {
        BitBoardIter(self.0)
    }

    // --- compass shifts; east/west variants mask off the wrapped file ---

    #[inline]
    pub fn north(self) -> Self {
        BitBoard(self.0 << 8)
    }

    #[inline]
    pub fn south(self) -> Self {
        BitBoard(self.0 >> 8)
    }

    #[inline]
    pub fn east(self) -> Self {
        BitBoard((self.0 & !FILE_H.0) << 1)
    }

    #[inline]
    pub fn west(self) -> Self {
        BitBoard((self.0 & !FILE_A.0) >> 1)
    }

    #[inline]
    pub fn north_east(self) -> Self {
        BitBoard((self.0 & !FILE_H.0) << 9)
    }

    #[inline]
    pub fn north_west(self) -> Self {
        BitBoard((self.0 & !FILE_A.0) << 7)
    }

    #[inline]
    pub fn south_east(self) -> Self {
        BitBoard((self.0 & !FILE_H.0) >> 7)
    }

    #[inline]
    pub fn south_west(self) -> Self {
        BitBoard((self.0 & !FILE_A.0) >> 9)
    }

    // --- symmetries ---

    /// rank 1 <-> rank 8.
    #[inline]
    pub fn flip_vertical(self) -> Self {
        BitBoard(self.0.swap_bytes())
    }

    /// file a <-> file h.
    #[inline]
    pub fn mirror_horizontal(self) -> Self {
        let mut x = self.0;
        x = ((x >> 1) & 0x5555_5555_5555_5555) | ((x & 0x5555_5555_5555_5555) << 1);
        x = ((x >> 2) & 0x3333_3333_3333_3333) | ((x & 0x3333_3333_3333_3333) << 2);
        x = ((x >> 4) & 0x0F0F_0F0F_0F0F_0F0F) | ((x & 0x0F0F_0F0F_0F0F_0F0F) << 4);
        BitBoard(x)
    }

    /// a1 <-> h8.
    #[inline]
    pub fn rotate_180(self) -> Self {
        BitBoard(self.0.reverse_bits())
    }
}

// --- line masks ---

#[inline]
pub fn file_mask(file: File) -> BitBoard {
    BitBoard(FILE_A.0 << file.to_index())
}

#[inline]
pub fn rank_mask(rank: Rank) -> BitBoard {
    BitBoard(RANK_1.0 << (8 * rank.to_index()))
}

/// a1-h8 direction diagonal through `sq`.
pub fn diagonal_mask(sq: Square) -> BitBoard {
    let diff = 8 * sq.file().to_index() as i32 - 8 * sq.rank().to_index() as i32;
    if diff >= 0 {
        BitBoard(MAIN_DIAGONAL >> diff)
    } else {
        BitBoard(MAIN_DIAGONAL << -diff)
    }
}

/// h1-a8 direction diagonal through `sq`.
pub fn anti_diagonal_mask(sq: Square) -> BitBoard {
    let diff = 56 - 8 * sq.file().to_index() as i32 - 8 * sq.rank().to_index() as i32;
    if diff >= 0 {
        BitBoard(MAIN_ANTI_DIAGONAL >> diff)
    } else {
        BitBoard(MAIN_ANTI_DIAGONAL << -diff)
    }
}

/// iterator over the set bits of a BitBoard.
pub struct BitBoardIter(u64);

impl Iterator for BitBoardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            let idx = self.0.trailing_zeros() as u8;
            self.0 &= self.0 - 1; // clear lowest set bit
            Some(Square::new(idx))
        }
    }
}

// --- operator impls ---
impl BitAnd for BitBoard {
    type Output = BitBoard;
    #[inline]
    fn bitand(self, rhs: BitBoard) -> BitBoard {
        BitBoard(self.0 & rhs.0)
    }
}

impl BitAndAssign for BitBoard {
    #[inline]
    fn bitand_assign(&mut self, rhs: BitBoard) {
        self.0 &= rhs.0;
    }
}

impl BitOr for BitBoard {
    type Output = BitBoard;
    #[inline]
    fn bitor(self, rhs: BitBoard) -> BitBoard {
        BitBoard(self.0 | rhs.0)
    }
}

impl BitOrAssign for BitBoard {
    #[inline]
    fn bitor_assign(&mut self, rhs: BitBoard) {
        self.0 |= rhs.0;
    }
}

impl BitXor for BitBoard {
    type Output = BitBoard;
    #[inline]
    fn bitxor(self, rhs: BitBoard) -> BitBoard {
        BitBoard(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for BitBoard {
    #[inline]
    fn bitxor_assign(&mut self, rhs: BitBoard) {
        self.0 ^= rhs.0;
    }
}

impl Not for BitBoard {
    type Output = BitBoard;
    #[inline]
    fn not(self) -> BitBoard {
        BitBoard(!self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn bb(names: &[&str]) -> BitBoard {
        names.iter().fold(EMPTY, |acc, n| acc | BitBoard::from_square(sq(n)))
    }

    #[test]
    fn test_from_square() {
        assert_eq!(BitBoard::from_square(Square::A1).0, 1);
        assert_eq!(BitBoard::from_square(Square::H8).0, 1u64 << 63);
    }

    #[test]
    fn test_iter() {
        let squares: Vec<usize> = BitBoard(0b1010_0001).iter().map(|s| s.to_index()).collect();
        assert_eq!(squares, vec![0, 5, 7]);
        assert_eq!(EMPTY.iter().count(), 0);
        assert_eq!(EMPTY.first(), None);
    }

    #[test]
    fn test_bitwise_ops() {
        let a = BitBoard(0xFF00);
        let b = BitBoard(0x00FF);
        assert_eq!((a | b).0, 0xFFFF);
        assert_eq!((a & b).0, 0);
        assert_eq!((a ^ b).0, 0xFFFF);
        assert_eq!((!EMPTY).popcnt(), 64);
    }

    #[test]
    fn test_shifts_do_not_wrap() {
        assert_eq!(bb(&["h4"]).east(), EMPTY);
        assert_eq!(bb(&["a4"]).west(), EMPTY);
        assert_eq!(bb(&["h4"]).north_east(), EMPTY);
        assert_eq!(bb(&["a4"]).south_west(), EMPTY);
        assert_eq!(bb(&["e8"]).north(), EMPTY);
        assert_eq!(bb(&["e1"]).south(), EMPTY);
    }

    #[test]
    fn test_shifts_move_one_step() {
        let d4 = bb(&["d4"]);
        assert_eq!(d4.north(), bb(&["d5"]));
        assert_eq!(d4.south(), bb(&["d3"]));
        assert_eq!(d4.east(), bb(&["e4"]));
        assert_eq!(d4.west(), bb(&["c4"]));
        assert_eq!(d4.north_east(), bb(&["e5"]));
        assert_eq!(d4.north_west(), bb(&["c5"]));
        assert_eq!(d4.south_east(), bb(&["e3"]));
        assert_eq!(d4.south_west(), bb(&["c3"]));
    }

    #[test]
    fn test_symmetries() {
        assert_eq!(bb(&["b2"]).flip_vertical(), bb(&["b7"]));
        assert_eq!(bb(&["b2"]).mirror_horizontal(), bb(&["g2"]));
        assert_eq!(bb(&["b2"]).rotate_180(), bb(&["g7"]));
        assert_eq!(RANK_3.flip_vertical(), RANK_6);
        assert_eq!(FILE_A.mirror_horizontal(), FILE_H);
    }

    #[test]
    fn test_line_masks() {
        assert_eq!(file_mask(sq("c1").file()).popcnt(), 8);
        assert!(file_mask(sq("c1").file()).contains(sq("c8")));
        assert_eq!(rank_mask(sq("a8").rank()), RANK_8);
        assert_eq!(diagonal_mask(sq("a1")).0, MAIN_DIAGONAL);
        assert_eq!(diagonal_mask(sq("b1")), bb(&["b1", "c2", "d3", "e4", "f5", "g6", "h7"]));
        assert_eq!(diagonal_mask(sq("a2")), bb(&["a2", "b3", "c4", "d5", "e6", "f7", "g8"]));
        assert_eq!(anti_diagonal_mask(sq("h1")).0, MAIN_ANTI_DIAGONAL);
        assert_eq!(anti_diagonal_mask(sq("a1")), bb(&["a1"]));
        assert_eq!(anti_diagonal_mask(sq("d4")), bb(&["a7", "b6", "c5", "d4", "e3", "f2", "g1"]));
    }
}

// BitBoard data structure to represent sets of squares. Setting bit 0 means "A1 is in this set",
// 63 means "H8 is in this set".

// "Where can the knight move?" -> `knight_attacks(sq) & !own_pieces`
// ^^ single AND + NOT on 64 bit integers
