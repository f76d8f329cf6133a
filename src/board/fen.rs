use std::fmt::{self, Write as _};
use std::str::FromStr;

use super::castling::CastlingRights;
use super::piece::{Color, Figure, Piece};
use super::position::Position;
use super::square::{File, Rank, Square};
use crate::error::EngineError;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl FromStr for Position {
    type Err = EngineError;

    /// Forsyth-Edwards Notation. The halfmove and fullmove fields are optional.
    fn from_str(fen: &str) -> Result<Self, EngineError> {
        super::init();
        let invalid = |reason: String| EngineError::InvalidFen { fen: fen.to_string(), reason };

        let parts: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&parts.len()) {
            return Err(invalid(format!("expected 4 to 6 fields, got {}", parts.len())));
        }

        let mut pos = Position::empty();

        // placement, rank 8 first
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(invalid(format!("expected 8 ranks, got {}", ranks.len())));
        }
        for (row, text) in ranks.iter().enumerate() {
            let rank = Rank::from_index(7 - row);
            let mut file = 0usize;
            for ch in text.chars() {
                if let Some(skip) = ch.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += skip as usize;
                    continue;
                }
                let figure = Figure::from_char(ch).ok_or_else(|| invalid(format!("bad piece letter '{ch}'")))?;
                if file >= 8 {
                    return Err(invalid(format!("rank {} overflows", 8 - row)));
                }
                pos.toggle(figure, Square::make_square(rank, File::from_index(file)));
                file += 1;
            }
            if file != 8 {
                return Err(invalid(format!("rank {} has {file} files", 8 - row)));
            }
        }
        for color in Color::BOTH {
            if pos.pieces(color, Piece::King).popcnt() > 1 {
                return Err(invalid(format!("more than one {color:?} king")));
            }
        }

        pos.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(invalid(format!("bad side to move '{other}'"))),
        };

        let mut rights = CastlingRights::NONE;
        if parts[2] != "-" {
            for ch in parts[2].chars() {
                let flag = match ch {
                    'K' => CastlingRights::WHITE_KING_SIDE,
                    'Q' => CastlingRights::WHITE_QUEEN_SIDE,
                    'k' => CastlingRights::BLACK_KING_SIDE,
                    'q' => CastlingRights::BLACK_QUEEN_SIDE,
                    _ => return Err(invalid(format!("bad castling letter '{ch}'"))),
                };
                rights.insert(flag);
            }
        }
        pos.castling = rights;

        pos.ep_square = match parts[3] {
            "-" => None,
            text => Some(text.parse::<Square>().map_err(|_| invalid(format!("bad en passant square '{text}'")))?),
        };

        pos.halfmove_clock = match parts.get(4) {
            Some(text) => text.parse().map_err(|_| invalid(format!("bad halfmove clock '{text}'")))?,
            None => 0,
        };
        pos.fullmove_number = match parts.get(5) {
            Some(text) => text.parse().map_err(|_| invalid(format!("bad fullmove number '{text}'")))?,
            None => 1,
        };

        pos.refresh_hash();
        Ok(pos)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            let mut empty_run = 0;
            for file in 0..8 {
                let sq = Square::make_square(Rank::from_index(rank), File::from_index(file));
                match self.figure_on(sq) {
                    Some(figure) => {
                        if empty_run > 0 {
                            write!(f, "{empty_run}")?;
                            empty_run = 0;
                        }
                        f.write_char(figure.to_char())?;
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                write!(f, "{empty_run}")?;
            }
            if rank > 0 {
                f.write_char('/')?;
            }
        }

        f.write_str(if self.side_to_move == Color::White { " w " } else { " b " })?;

        if self.castling.is_empty() {
            f.write_char('-')?;
        } else {
            for (flag, ch) in [
                (CastlingRights::WHITE_KING_SIDE, 'K'),
                (CastlingRights::WHITE_QUEEN_SIDE, 'Q'),
                (CastlingRights::BLACK_KING_SIDE, 'k'),
                (CastlingRights::BLACK_QUEEN_SIDE, 'q'),
            ] {
                if self.castling.contains(flag) {
                    f.write_char(ch)?;
                }
            }
        }

        match self.ep_square {
            Some(ep) => write!(f, " {ep}")?,
            None => f.write_str(" -")?,
        }
        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)
    }
}

impl Position {
    /// Eight-line board diagram, white at the bottom, for the `d` command.
    pub fn diagram(&self) -> String {
        let mut out = String::new();
        for rank in (0..8).rev() {
            let _ = write!(out, "{} ", rank + 1);
            for file in 0..8 {
                let sq = Square::make_square(Rank::from_index(rank), File::from_index(file));
                let ch = self.figure_on(sq).map_or('.', Figure::to_char);
                let _ = write!(out, " {ch}");
            }
            out.push('\n');
        }
        out.push_str("   a b c d e f g h\n");
        out
    }
}
