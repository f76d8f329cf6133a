use arrayvec::ArrayVec;

use super::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks};
use super::bitboard::{BitBoard, RANK_1, RANK_3, RANK_6, RANK_8};
use super::castling::castle_paths;
use super::chessmove::{ChessMove, MoveFlags};
use super::piece::{Color, Figure, Piece};
use super::position::Position;
use super::square::Square;

/// Fixed-capacity move buffer; no position produces more than 218 legal moves.
pub type MoveList = ArrayVec<ChessMove, 256>;

/// Append every pseudo-legal move for the side to move.
///
/// Moves obey piece movement, never capture an own piece, and castling is fully checked
/// (rights, empty path, king not in check, transit square not attacked). Whether the mover's
/// king is left in check is decided by `Position::execute`.
pub fn generate_moves(pos: &Position, moves: &mut MoveList) {
    let us = pos.side_to_move();
    let own = pos.color_combined(us);
    let enemy = pos.color_combined(!us);
    let occupied = pos.combined();

    generate_pawn_moves(pos, us, enemy, occupied, moves);

    let leapers_and_sliders: [(Piece, fn(Square, BitBoard) -> BitBoard); 5] = [
        (Piece::Knight, |sq: Square, _: BitBoard| knight_attacks(sq)),
        (Piece::Bishop, bishop_attacks),
        (Piece::Rook, rook_attacks),
        (Piece::Queen, queen_attacks),
        (Piece::King, |sq: Square, _: BitBoard| king_attacks(sq)),
    ];
    for (piece, attacks) in leapers_and_sliders {
        let figure = Figure::new(us, piece);
        for from in pos.figure_bb(figure).iter() {
            push_targets(from, attacks(from, occupied) & !own, enemy, figure, moves);
        }
    }

    generate_castling(pos, us, occupied, moves);
}

#[inline]
fn push_targets(from: Square, targets: BitBoard, enemy: BitBoard, figure: Figure, moves: &mut MoveList) {
    for to in targets.iter() {
        let flags = if enemy.contains(to) { MoveFlags::CAPTURE } else { MoveFlags::QUIET };
        moves.push(ChessMove::new(from, to, figure, None, flags));
    }
}

fn generate_pawn_moves(pos: &Position, us: Color, enemy: BitBoard, occupied: BitBoard, moves: &mut MoveList) {
    let pawn = Figure::new(us, Piece::Pawn);
    let pawns = pos.figure_bb(pawn);
    let empty = !occupied;

    // set-wise pushes: shift the whole pawn set one rank forward
    let (single, double, promo_rank, step): (BitBoard, BitBoard, BitBoard, i8) = match us {
        Color::White => {
            let single = pawns.north() & empty;
            (single, (single & RANK_3).north() & empty, RANK_8, 8)
        }
        Color::Black => {
            let single = pawns.south() & empty;
            (single, (single & RANK_6).south() & empty, RANK_1, -8)
        }
    };
    let origin = |to: Square, steps: i8| Square::new((to.to_index() as i8 - step * steps) as u8);

    for to in (single & !promo_rank).iter() {
        moves.push(ChessMove::new(origin(to, 1), to, pawn, None, MoveFlags::QUIET));
    }
    for to in (single & promo_rank).iter() {
        push_promotions(origin(to, 1), to, pawn, MoveFlags::QUIET, moves);
    }
    for to in double.iter() {
        moves.push(ChessMove::new(origin(to, 2), to, pawn, None, MoveFlags::DOUBLE_PUSH));
    }

    for from in pawns.iter() {
        let attacks = pawn_attacks(us, from);
        for to in (attacks & enemy).iter() {
            if promo_rank.contains(to) {
                push_promotions(from, to, pawn, MoveFlags::CAPTURE, moves);
            } else {
                moves.push(ChessMove::new(from, to, pawn, None, MoveFlags::CAPTURE));
            }
        }
        if let Some(ep) = pos.en_passant().filter(|&ep| attacks.contains(ep)) {
            moves.push(ChessMove::new(from, ep, pawn, None, MoveFlags::EN_PASSANT));
        }
    }
}

#[inline]
fn push_promotions(from: Square, to: Square, pawn: Figure, flags: MoveFlags, moves: &mut MoveList) {
    for promo in Piece::PROMOTIONS {
        moves.push(ChessMove::new(from, to, pawn, Some(promo), flags));
    }
}

fn generate_castling(pos: &Position, us: Color, occupied: BitBoard, moves: &mut MoveList) {
    let rights = pos.castling_rights();
    if rights.is_empty() {
        return;
    }
    let them = !us;
    let king = Figure::new(us, Piece::King);
    let rook = Figure::new(us, Piece::Rook);

    for path in castle_paths(us) {
        let available = rights.contains(path.right)
            && pos.figure_bb(king).contains(path.king_from)
            && pos.figure_bb(rook).contains(path.rook_from)
            && (path.between & occupied).is_empty()
            && !pos.is_square_attacked(path.king_from, them)
            && !pos.is_square_attacked(path.passed, them);
        if available {
            // landing square safety is left to the legality gate
            moves.push(ChessMove::new(path.king_from, path.king_to, king, None, MoveFlags::CASTLE));
        }
    }
}


// Pushes are computed for all pawns at once: shift the pawn set forward, AND with empty squares,
// then recover each origin from its destination. Captures go per pawn through the attack table.
