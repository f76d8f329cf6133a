use std::fmt;
use std::str::FromStr;

use super::movegen::{MoveList, generate_moves};
use super::piece::{Color, Figure, Piece};
use super::position::{MoveScope, Position};
use super::square::Square;

/// Special-move flags carried by a `ChessMove`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MoveFlags {
    pub capture: bool,
    pub double_push: bool,
    pub en_passant: bool,
    pub castle: bool,
}

impl MoveFlags {
    pub const QUIET: MoveFlags = MoveFlags { capture: false, double_push: false, en_passant: false, castle: false };
    pub const CAPTURE: MoveFlags = MoveFlags { capture: true, ..MoveFlags::QUIET };
    pub const DOUBLE_PUSH: MoveFlags = MoveFlags { double_push: true, ..MoveFlags::QUIET };
    pub const EN_PASSANT: MoveFlags = MoveFlags { capture: true, en_passant: true, ..MoveFlags::QUIET };
    pub const CASTLE: MoveFlags = MoveFlags { castle: true, ..MoveFlags::QUIET };
}

const FROM_MASK: u32 = 0x3F;
const TO_SHIFT: u32 = 6;
const FIGURE_SHIFT: u32 = 12;
const PROMO_SHIFT: u32 = 16;
const CAPTURE_BIT: u32 = 1 << 19;
const DOUBLE_BIT: u32 = 1 << 20;
const EP_BIT: u32 = 1 << 21;
const CASTLE_BIT: u32 = 1 << 22;

/// One ply, packed into a u32.
///
/// Layout:
///   - bits 0..5:   source square
///   - bits 6..11:  destination square
///   - bits 12..15: moved figure (`Figure::to_index`, 0..11)
///   - bits 16..18: promotion piece index (0 = none; pawns never promote to a pawn)
///   - bit 19: capture, bit 20: double pawn push, bit 21: en passant, bit 22: castle
///
/// The packing is injective, so the derived bitwise equality is equality on the fields.
/// `NULL` (all zero, source == destination == a1) means "no move".
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChessMove(u32);

impl ChessMove {
    pub const NULL: ChessMove = ChessMove(0);

    #[inline]
    pub fn new(src: Square, dst: Square, figure: Figure, promotion: Option<Piece>, flags: MoveFlags) -> Self {
        let mut bits = (src.to_index() as u32)
            | ((dst.to_index() as u32) << TO_SHIFT)
            | ((figure.to_index() as u32) << FIGURE_SHIFT);
        if let Some(p) = promotion {
            debug_assert!(!matches!(p, Piece::Pawn | Piece::King));
            bits |= (p.to_index() as u32) << PROMO_SHIFT;
        }
        if flags.capture {
            bits |= CAPTURE_BIT;
        }
        if flags.double_push {
            bits |= DOUBLE_BIT;
        }
        if flags.en_passant {
            bits |= EP_BIT;
        }
        if flags.castle {
            bits |= CASTLE_BIT;
        }
        ChessMove(bits)
    }

    #[inline]
    pub fn get_source(self) -> Square {
        Square::new((self.0 & FROM_MASK) as u8)
    }

    #[inline]
    pub fn get_dest(self) -> Square {
        Square::new(((self.0 >> TO_SHIFT) & FROM_MASK) as u8)
    }

    #[inline]
    pub fn get_figure(self) -> Figure {
        let idx = ((self.0 >> FIGURE_SHIFT) & 0xF) as usize;
        Figure::from_index(idx).unwrap_or(Figure::new(Color::White, Piece::Pawn))
    }

    #[inline]
    pub fn get_piece(self) -> Piece {
        self.get_figure().piece
    }

    #[inline]
    pub fn get_promotion(self) -> Option<Piece> {
        match (self.0 >> PROMO_SHIFT) & 0x7 {
            0 => None,
            i => Piece::from_index(i as usize),
        }
    }

    #[inline]
    pub fn is_capture(self) -> bool {
        self.0 & CAPTURE_BIT != 0
    }

    #[inline]
    pub fn is_double_push(self) -> bool {
        self.0 & DOUBLE_BIT != 0
    }

    #[inline]
    pub fn is_en_passant(self) -> bool {
        self.0 & EP_BIT != 0
    }

    #[inline]
    pub fn is_castle(self) -> bool {
        self.0 & CASTLE_BIT != 0
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self.get_source() == self.get_dest()
    }

    pub fn flags(self) -> MoveFlags {
        MoveFlags {
            capture: self.is_capture(),
            double_push: self.is_double_push(),
            en_passant: self.is_en_passant(),
            castle: self.is_castle(),
        }
    }
}

impl Default for ChessMove {
    fn default() -> Self {
        ChessMove::NULL
    }
}

impl fmt::Display for ChessMove {
    /// Coordinate notation ("e2e4", "a7a8q"); the null move prints as "0000".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "0000");
        }
        write!(f, "{}{}", self.get_source(), self.get_dest())?;
        if let Some(promo) = self.get_promotion() {
            write!(f, "{}", promo.to_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChessMove({})", self)
    }
}

/// A move as described from outside: squares plus optional promotion piece. It becomes a
/// `ChessMove` only by matching against the generated moves of a concrete position.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct CandidateMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl CandidateMove {
    pub fn new(from: Square, to: Square, promotion: Option<Piece>) -> Self {
        CandidateMove { from, to, promotion }
    }

    /// The fully-typed legal move this describes in `position`, or `ChessMove::NULL`.
    pub fn resolve(&self, position: &Position) -> ChessMove {
        let mut moves = MoveList::new();
        generate_moves(position, &mut moves);
        moves
            .into_iter()
            .filter(|mv| {
                mv.get_source() == self.from
                    && mv.get_dest() == self.to
                    && mv.get_promotion() == self.promotion
            })
            .find(|&mv| {
                let mut trial = *position;
                trial.execute(mv, MoveScope::AllMoves)
            })
            .unwrap_or(ChessMove::NULL)
    }
}

impl fmt::Display for CandidateMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "{}", promo.to_char())?;
        }
        Ok(())
    }
}

impl FromStr for CandidateMove {
    type Err = crate::error::EngineError;

    /// Coordinate text: "e2e4", "e7e8q".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || crate::error::EngineError::InvalidMoveText(s.to_string());
        if !(4..=5).contains(&s.len()) || !s.is_ascii() {
            return Err(bad());
        }
        let from: Square = s[0..2].parse().map_err(|_| bad())?;
        let to: Square = s[2..4].parse().map_err(|_| bad())?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(ch) => match Piece::from_char(ch) {
                Some(p @ (Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen)) => Some(p),
                _ => return Err(bad()),
            },
        };
        Ok(CandidateMove { from, to, promotion })
    }
}


// move is packed into a 32-bit int. Move lists fit in cache lines and comparisons are single
// integer comparisons, while accessors keep the packing an internal detail.
