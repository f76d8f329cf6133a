use super::castling::castle_path_to;
use super::chessmove::ChessMove;
use super::piece::{Color, Figure, Piece};
use super::position::Position;
use super::square::Square;
use super::zobrist;

/// Which moves `Position::execute` is willing to play.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveScope {
    AllMoves,
    /// Non-captures are refused without touching the position (quiescence).
    CapturesOnly,
}

impl Position {
    /// Play a pseudo-legal move. Returns false, leaving `self` untouched, when the move is
    /// out of `scope` or would leave the mover's king attacked.
    pub fn execute(&mut self, mv: ChessMove, scope: MoveScope) -> bool {
        if scope == MoveScope::CapturesOnly && !mv.is_capture() {
            return false;
        }

        let us = self.side_to_move;
        let them = !us;
        let from = mv.get_source();
        let to = mv.get_dest();
        let figure = mv.get_figure();
        if figure.color != us || !self.figure_bb(figure).contains(from) {
            return false;
        }

        // work on a copy, commit only if legal
        let mut next = *self;
        next.hash ^= zobrist::castling_key(next.castling.bits());
        if let Some(ep) = next.ep_square {
            next.hash ^= zobrist::ep_key(ep);
        }

        if mv.is_capture() {
            let victim_sq = if mv.is_en_passant() { en_passant_victim(to, us) } else { to };
            match next.figure_on(victim_sq) {
                Some(victim) if victim.color == them && victim.piece != Piece::King => {
                    next.toggle(victim, victim_sq)
                }
                _ => return false,
            }
        }

        next.toggle(figure, from);
        let landed = mv.get_promotion().map_or(figure, |p| Figure::new(us, p));
        next.toggle(landed, to);

        if mv.is_castle() {
            let Some(path) = castle_path_to(us, to) else { return false };
            let rook = Figure::new(us, Piece::Rook);
            next.toggle(rook, path.rook_from);
            next.toggle(rook, path.rook_to);
        }

        if next.king_square(us).is_some_and(|king| next.is_square_attacked(king, them)) {
            return false;
        }

        next.ep_square = if mv.is_double_push() {
            Some(Square::new(((from.to_index() + to.to_index()) / 2) as u8))
        } else {
            None
        };
        next.castling.update_for_move(from, to);

        if figure.piece == Piece::Pawn || mv.is_capture() {
            next.halfmove_clock = 0;
        } else {
            next.halfmove_clock = next.halfmove_clock.saturating_add(1);
        }
        if us == Color::Black {
            next.fullmove_number = next.fullmove_number.saturating_add(1);
        }
        next.side_to_move = them;

        next.hash ^= zobrist::side_key();
        next.hash ^= zobrist::castling_key(next.castling.bits());
        if let Some(ep) = next.ep_square {
            next.hash ^= zobrist::ep_key(ep);
        }

        debug_assert!(next.is_consistent());

        *self = next;
        true
    }
}

/// Square of the pawn removed by an en-passant capture landing on `to`.
#[inline]
fn en_passant_victim(to: Square, mover: Color) -> Square {
    match mover {
        Color::White => Square::new(to.to_index() as u8 - 8),
        Color::Black => Square::new(to.to_index() as u8 + 8),
    }
}
