use tracing::error;

use super::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use super::bitboard::{BitBoard, EMPTY};
use super::castling::CastlingRights;
use super::chessmove::{CandidateMove, ChessMove};
use super::movegen::{MoveList, generate_moves};
use super::piece::{Color, Figure, Piece};
use super::square::Square;
use super::zobrist;
use crate::error::{EngineError, EngineResult};

pub use super::execute::MoveScope;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoardStatus {
    Ongoing,
    Checkmate,
    Stalemate,
}

const BOTH: usize = 2;

/// The game state. `Copy`: search backtracks by keeping the parent value, never by aliasing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub(super) figures: [BitBoard; Figure::COUNT], // per colored piece kind
    pub(super) occupancy: [BitBoard; 3],           // White, Black, Both
    pub(super) side_to_move: Color,
    pub(super) castling: CastlingRights,
    pub(super) ep_square: Option<Square>,
    pub(super) halfmove_clock: u16,
    pub(super) fullmove_number: u16,
    pub(super) hash: u64,
}

impl Position {
    /// No pieces, white to move, no rights. Starting point for builders.
    pub fn empty() -> Self {
        let mut pos = Position {
            figures: [EMPTY; Figure::COUNT],
            occupancy: [EMPTY; 3],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            ep_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        };
        pos.refresh_hash();
        pos
    }

    /// The standard initial position.
    pub fn start() -> Self {
        const BACK_RANK: [Piece; 8] = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        let mut pos = Position::empty();
        for (file, &piece) in BACK_RANK.iter().enumerate() {
            let f = file as u8;
            pos.toggle(Figure::new(Color::White, piece), Square::new(f));
            pos.toggle(Figure::new(Color::White, Piece::Pawn), Square::new(8 + f));
            pos.toggle(Figure::new(Color::Black, Piece::Pawn), Square::new(48 + f));
            pos.toggle(Figure::new(Color::Black, piece), Square::new(56 + f));
        }
        pos.castling = CastlingRights::ALL;
        pos.refresh_hash();
        pos
    }

    // --- accessors ---

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.ep_square
    }

    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// Incrementally maintained Zobrist hash.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn figure_bb(&self, figure: Figure) -> BitBoard {
        self.figures[figure.to_index()]
    }

    #[inline]
    pub fn pieces(&self, color: Color, piece: Piece) -> BitBoard {
        self.figure_bb(Figure::new(color, piece))
    }

    #[inline]
    pub fn color_combined(&self, color: Color) -> BitBoard {
        self.occupancy[color.to_index()]
    }

    #[inline]
    pub fn combined(&self) -> BitBoard {
        self.occupancy[BOTH]
    }

    pub fn figure_on(&self, sq: Square) -> Option<Figure> {
        if !self.combined().contains(sq) {
            return None;
        }
        let color = if self.color_combined(Color::White).contains(sq) { Color::White } else { Color::Black };
        Piece::ALL
            .into_iter()
            .map(|p| Figure::new(color, p))
            .find(|&fig| self.figure_bb(fig).contains(sq))
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color, Piece::King).first()
    }

    // --- attack queries ---

    /// Is `sq` attacked by any piece of color `by`?
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        let occupied = self.combined();
        let queens = self.pieces(by, Piece::Queen);

        // a `by` pawn attacks sq iff a pawn of the other color on sq would attack it back
        !(pawn_attacks(!by, sq) & self.pieces(by, Piece::Pawn)).is_empty()
            || !(knight_attacks(sq) & self.pieces(by, Piece::Knight)).is_empty()
            || !(king_attacks(sq) & self.pieces(by, Piece::King)).is_empty()
            || !(bishop_attacks(sq, occupied) & (self.pieces(by, Piece::Bishop) | queens)).is_empty()
            || !(rook_attacks(sq, occupied) & (self.pieces(by, Piece::Rook) | queens)).is_empty()
    }

    /// Is the side to move in check?
    pub fn in_check(&self) -> bool {
        let us = self.side_to_move;
        self.king_square(us).is_some_and(|k| self.is_square_attacked(k, !us))
    }

    /// Compute board status by checking if any legal move exists
    pub fn status(&self) -> BoardStatus {
        if self.has_legal_move() {
            BoardStatus::Ongoing
        } else if self.in_check() {
            BoardStatus::Checkmate
        } else {
            BoardStatus::Stalemate
        }
    }

    fn has_legal_move(&self) -> bool {
        let mut moves = MoveList::new();
        generate_moves(self, &mut moves);
        moves.into_iter().any(|mv| {
            let mut trial = *self;
            trial.execute(mv, MoveScope::AllMoves)
        })
    }

    /// All legal moves, in generation order.
    pub fn legal_moves(&self) -> Vec<ChessMove> {
        let mut moves = MoveList::new();
        generate_moves(self, &mut moves);
        moves
            .into_iter()
            .filter(|&mv| {
                let mut trial = *self;
                trial.execute(mv, MoveScope::AllMoves)
            })
            .collect()
    }

    // --- externally described moves ---

    /// Resolve and play one externally described move. On any error the position is unchanged.
    pub fn apply_move(&mut self, candidate: CandidateMove) -> EngineResult<ChessMove> {
        let mv = candidate.resolve(self);
        let mut next = *self;
        if mv.is_null() || !next.execute(mv, MoveScope::AllMoves) {
            return Err(EngineError::IllegalMove(candidate.to_string()));
        }
        next.validate_hash()?;
        *self = next;
        Ok(mv)
    }

    /// Play a batch in order. Stops at the first illegal move: the position keeps every move
    /// before it and the error names the offender.
    pub fn apply_moves(&mut self, candidates: &[CandidateMove]) -> EngineResult<()> {
        for &candidate in candidates {
            self.apply_move(candidate)?;
        }
        Ok(())
    }

    // --- invariants ---

    /// Compare the incremental hash against a full recomputation.
    pub fn validate_hash(&self) -> EngineResult<()> {
        let recomputed = zobrist::hash(self);
        if recomputed == self.hash {
            Ok(())
        } else {
            error!(incremental = self.hash, recomputed, fen = %self, "zobrist hash diverged");
            Err(EngineError::HashMismatch { incremental: self.hash, recomputed })
        }
    }

    /// Per-figure boards are disjoint and the composites are their unions.
    pub fn is_consistent(&self) -> bool {
        let mut seen = EMPTY;
        let mut by_color = [EMPTY; 2];
        for (i, &bb) in self.figures.iter().enumerate() {
            if !(seen & bb).is_empty() {
                return false;
            }
            seen |= bb;
            by_color[i / 6] |= bb;
        }
        by_color[0] == self.occupancy[0]
            && by_color[1] == self.occupancy[1]
            && seen == self.occupancy[BOTH]
    }

    // --- low-level mutation ---

    /// Flip `figure` on `sq` in the figure board, both composites, and the hash.
    #[inline]
    pub(super) fn toggle(&mut self, figure: Figure, sq: Square) {
        let bb = BitBoard::from_square(sq);
        self.figures[figure.to_index()] ^= bb;
        self.occupancy[figure.color.to_index()] ^= bb;
        self.occupancy[BOTH] ^= bb;
        self.hash ^= zobrist::piece_key(figure, sq);
    }

    pub(super) fn refresh_hash(&mut self) {
        self.hash = zobrist::hash(self);
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn test_start_position() {
        let pos = Position::start();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.castling_rights(), CastlingRights::ALL);
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.combined().popcnt(), 32);
        assert_eq!(pos.figure_on(sq("e1")), Some(Figure::new(Color::White, Piece::King)));
        assert_eq!(pos.figure_on(sq("d8")), Some(Figure::new(Color::Black, Piece::Queen)));
        assert_eq!(pos.figure_on(sq("e4")), None);
        assert!(pos.is_consistent());
        assert!(pos.validate_hash().is_ok());
    }

    #[test]
    fn test_start_matches_fen() {
        let parsed: Position = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".parse().unwrap();
        assert_eq!(parsed, Position::start());
    }

    #[test]
    fn test_attack_queries() {
        let pos = Position::start();
        assert!(pos.is_square_attacked(sq("f3"), Color::White));
        assert!(pos.is_square_attacked(sq("f6"), Color::Black));
        assert!(!pos.is_square_attacked(sq("e4"), Color::White));
        assert!(!pos.in_check());
    }

    #[test]
    fn test_in_check() {
        let pos: Position = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3".parse().unwrap();
        assert!(pos.in_check());
        assert_eq!(pos.status(), BoardStatus::Checkmate);
    }

    #[test]
    fn test_stalemate_status() {
        let pos: Position = "8/8/8/8/8/3k4/3p4/3K4 w - - 0 1".parse().unwrap();
        assert!(!pos.in_check());
        assert_eq!(pos.status(), BoardStatus::Stalemate);
        assert!(pos.legal_moves().is_empty());
    }

    #[test]
    fn test_apply_moves_alternates_side() {
        let mut pos = Position::start();
        let moves: Vec<CandidateMove> = ["a2a3", "a7a6"].iter().map(|m| m.parse().unwrap()).collect();
        pos.apply_moves(&moves).unwrap();

        let white_pawn = Figure::new(Color::White, Piece::Pawn);
        let black_pawn = Figure::new(Color::Black, Piece::Pawn);
        assert_eq!(pos.figure_on(sq("a2")), None);
        assert_eq!(pos.figure_on(sq("a7")), None);
        assert_eq!(pos.figure_on(sq("a3")), Some(white_pawn));
        assert_eq!(pos.figure_on(sq("a6")), Some(black_pawn));
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.fullmove_number(), 2);
    }

    #[test]
    fn test_apply_moves_stops_at_illegal() {
        let mut pos = Position::start();
        let moves: Vec<CandidateMove> = ["e2e4", "e7e4", "d7d5"].iter().map(|m| m.parse().unwrap()).collect();
        let err = pos.apply_moves(&moves).unwrap_err();
        assert!(matches!(err, EngineError::IllegalMove(ref m) if m == "e7e4"));
        // e2e4 stuck, d7d5 never played
        assert_eq!(pos.side_to_move(), Color::Black);
        assert!(pos.figure_on(sq("e4")).is_some());
        assert!(pos.figure_on(sq("d5")).is_none());
    }

    #[test]
    fn test_corrupted_hash_is_reported() {
        let mut pos = Position::start();
        pos.hash ^= 1;
        assert!(matches!(pos.validate_hash(), Err(EngineError::HashMismatch { .. })));
    }

    #[test]
    fn test_hash_mismatch_leaves_position_unchanged() {
        let mut pos = Position::start();
        pos.hash ^= 1;
        let before = pos;

        let err = pos.apply_move("e2e4".parse().unwrap()).unwrap_err();
        assert!(matches!(err, EngineError::HashMismatch { .. }));
        assert_eq!(pos, before);
        assert_eq!(pos.side_to_move(), Color::White);
        assert!(pos.figure_on(sq("e2")).is_some());
    }
}

// Position is a `Copy` type. Instead of a 64-element array of pieces, it keeps 12 per-figure
// bitboards plus white/black/both composites. To find what is on a square, check which boards
// have that bit set: slightly slower for single-square queries, much faster for pattern matching.
