use std::fmt;
use std::str::FromStr;

/// a square on the chess board, 0..63 (A1=0, H8=63).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Square(u8);

impl Square {
    pub const A1: Square = Square(0);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const A8: Square = Square(56);
    pub const C8: Square = Square(58);
    pub const D8: Square = Square(59);
    pub const E8: Square = Square(60);
    pub const F8: Square = Square(61);
    pub const G8: Square = Square(62);
    pub const H8: Square = Square(63);

    #[inline]
    pub const fn new(index: u8) -> Self {
        debug_assert!(index < 64);
        Square(index)
    }

    /// `None` for anything outside 0..63.
    #[inline]
    pub fn try_new(index: usize) -> Option<Self> {
        (index < 64).then_some(Square(index as u8))
    }

    #[inline]
    pub fn make_square(rank: Rank, file: File) -> Self {
        Square(rank.0 * 8 + file.0)
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn rank(self) -> Rank {
        Rank(self.0 >> 3)
    }

    #[inline]
    pub fn file(self) -> File {
        File(self.0 & 7)
    }

    /// Same file, mirrored rank (a1 <-> a8). Used to read white-oriented tables for black.
    #[inline]
    pub fn flip_rank(self) -> Self {
        Square(self.0 ^ 56)
    }

    /// The square one rank forward from `color`'s point of view, if on the board.
    #[inline]
    pub fn forward(self, white: bool) -> Option<Self> {
        if white {
            Square::try_new(self.to_index() + 8)
        } else {
            self.to_index().checked_sub(8).map(|i| Square(i as u8))
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file_char = (b'a' + self.file().0) as char;
        let rank_char = (b'1' + self.rank().0) as char;
        write!(f, "{}{}", file_char, rank_char)
    }
}

impl FromStr for Square {
    type Err = ();

    /// Coordinate text such as "e4".
    fn from_str(s: &str) -> Result<Self, ()> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(());
        }
        let f = bytes[0].wrapping_sub(b'a');
        let r = bytes[1].wrapping_sub(b'1');
        if f < 8 && r < 8 {
            Ok(Square(r * 8 + f))
        } else {
            Err(())
        }
    }
}

/// a rank (row) on the chess board, 0..7 (Rank 1 = 0, Rank 8 = 7).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Rank(pub(crate) u8);

impl Rank {
    #[inline]
    pub fn from_index(i: usize) -> Self {
        debug_assert!(i < 8);
        Rank(i as u8)
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.0 as usize
    }
}

/// a file (column) on the chess board, 0..7 (A=0, H=7).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct File(pub(crate) u8);

impl File {
    #[inline]
    pub fn from_index(i: usize) -> Self {
        debug_assert!(i < 8);
        File(i as u8)
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.0 as usize
    }
}

/// all 64 squares in order A1, B1, ..., H8.
pub const ALL_SQUARES: [Square; 64] = {
    let mut arr = [Square(0); 64];
    let mut i = 0u8;
    while i < 64 {
        arr[i as usize] = Square(i);
        i += 1;
    }
    arr
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a1_is_zero() {
        let sq = Square::make_square(Rank::from_index(0), File::from_index(0));
        assert_eq!(sq, Square::A1);
    }

    #[test]
    fn test_h8_is_63() {
        let sq = Square::make_square(Rank::from_index(7), File::from_index(7));
        assert_eq!(sq.to_index(), 63);
    }

    #[test]
    fn test_rank_file_roundtrip() {
        for i in 0..64u8 {
            let sq = Square::new(i);
            let reconstructed = Square::make_square(sq.rank(), sq.file());
            assert_eq!(sq, reconstructed);
        }
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(Square::new(0).to_string(), "a1");
        assert_eq!(Square::new(63).to_string(), "h8");
        assert_eq!("e1".parse::<Square>(), Ok(Square::E1));
        assert!("i9".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
    }

    #[test]
    fn test_out_of_range_is_undefined() {
        assert_eq!(Square::try_new(64), None);
        assert_eq!(Square::try_new(63), Some(Square::H8));
    }

    #[test]
    fn test_flip_rank() {
        assert_eq!(Square::A1.flip_rank(), Square::A8);
        assert_eq!(Square::E8.flip_rank(), Square::E1);
    }

    #[test]
    fn test_forward_edges() {
        assert_eq!(Square::E1.forward(true).map(|s| s.to_string()), Some("e2".into()));
        assert_eq!(Square::E8.forward(true), None);
        assert_eq!(Square::E1.forward(false), None);
    }
}

// `Square` is a single board position, stored as a u8 from 0 to 63 in LERF order
// (little-endian rank-file): `index = rank * 8 + file`. "Undefined" squares are
// expressed as `Option<Square>` rather than a magic out-of-range value.
