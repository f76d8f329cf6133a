use std::ops::Not;

// chess piece type (pawn, knight, bishop, rook, queen, king)
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    #[inline]
    pub fn to_index(self) -> usize {
        self as usize
    }

    // all 6 piece types in order
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// pieces a pawn may promote to, strongest first
    pub const PROMOTIONS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

    #[inline]
    pub fn from_index(i: usize) -> Option<Piece> {
        Piece::ALL.get(i).copied()
    }

    pub fn to_char(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }

    pub fn from_char(ch: char) -> Option<Piece> {
        match ch.to_ascii_lowercase() {
            'p' => Some(Piece::Pawn),
            'n' => Some(Piece::Knight),
            'b' => Some(Piece::Bishop),
            'r' => Some(Piece::Rook),
            'q' => Some(Piece::Queen),
            'k' => Some(Piece::King),
            _ => None,
        }
    }
}

// color: white or black
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    pub fn to_index(self) -> usize {
        self as usize
    }

    pub const BOTH: [Color; 2] = [Color::White, Color::Black];
}

impl Not for Color {
    type Output = Color;

    #[inline]
    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

/// A colored piece kind. 12 of them, white first: index = color * 6 + piece.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Figure {
    pub color: Color,
    pub piece: Piece,
}

impl Figure {
    pub const COUNT: usize = 12;

    #[inline]
    pub const fn new(color: Color, piece: Piece) -> Self {
        Figure { color, piece }
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.color.to_index() * 6 + self.piece.to_index()
    }

    #[inline]
    pub fn from_index(i: usize) -> Option<Figure> {
        let color = match i / 6 {
            0 => Color::White,
            1 => Color::Black,
            _ => return None,
        };
        Some(Figure::new(color, Piece::from_index(i % 6)?))
    }

    /// FEN letter: uppercase for white.
    pub fn to_char(self) -> char {
        let ch = self.piece.to_char();
        if self.color == Color::White { ch.to_ascii_uppercase() } else { ch }
    }

    pub fn from_char(ch: char) -> Option<Figure> {
        let color = if ch.is_ascii_uppercase() { Color::White } else { Color::Black };
        Some(Figure::new(color, Piece::from_char(ch)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_indices() {
        assert_eq!(Piece::Pawn.to_index(), 0);
        assert_eq!(Piece::King.to_index(), 5);
    }

    #[test]
    fn test_color_flip() {
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(!Color::Black, Color::White);
    }

    #[test]
    fn test_figure_index_roundtrip() {
        for i in 0..Figure::COUNT {
            let fig = Figure::from_index(i).unwrap();
            assert_eq!(fig.to_index(), i);
        }
        assert!(Figure::from_index(12).is_none());
        assert_eq!(Figure::new(Color::Black, Piece::Pawn).to_index(), 6);
    }

    #[test]
    fn test_figure_chars() {
        assert_eq!(Figure::from_char('Q'), Some(Figure::new(Color::White, Piece::Queen)));
        assert_eq!(Figure::from_char('n'), Some(Figure::new(Color::Black, Piece::Knight)));
        assert_eq!(Figure::from_char('x'), None);
        assert_eq!(Figure::new(Color::White, Piece::King).to_char(), 'K');
    }
}

// `Piece`, `Color` and `Figure` are all `Copy`: a byte or two, so passing by value is free.
