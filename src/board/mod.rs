mod attacks;
mod bitboard;
mod castling;
mod chessmove;
mod execute;
mod fen;
mod magic;
mod movegen;
mod perft;
mod piece;
mod position;
mod rng;
mod square;
mod zobrist;

pub use attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks};
pub use bitboard::{BitBoard, EMPTY};
pub use castling::CastlingRights;
pub use chessmove::{CandidateMove, ChessMove, MoveFlags};
pub use fen::START_FEN;
pub use movegen::{MoveList, generate_moves};
pub use perft::{divide, perft};
pub use piece::{Color, Figure, Piece};
pub use position::{BoardStatus, MoveScope, Position};
pub use square::{ALL_SQUARES, File, Rank, Square};

/// Build the attack tables and Zobrist keys. Idempotent; parsing a FEN calls it as well, so
/// this only moves the one-time cost to startup.
pub fn init() {
    attacks::init_attacks();
    zobrist::init_zobrist();
}
