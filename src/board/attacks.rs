use std::sync::LazyLock;

use super::bitboard::{BitBoard, EDGES, FILE_A, FILE_H, RANK_1, RANK_8};
use super::bitboard::{anti_diagonal_mask, diagonal_mask, file_mask, rank_mask};
use super::magic::{MagicEntry, find_magic, subsets};
use super::piece::Color;
use super::rng::XorShift64;
use super::square::{ALL_SQUARES, Square};

/// Precomputed attack sets. Built once per process, read-only afterwards, so any number of
/// threads can share it without locking.
pub struct AttackTables {
    knight: [BitBoard; 64],
    king: [BitBoard; 64],
    pawn: [[BitBoard; 64]; 2],
    bishop: SliderTable,
    rook: SliderTable,
}

/// magic-indexed attack sets for one slider kind
struct SliderTable {
    entries: [MagicEntry; 64],
    attacks: Vec<BitBoard>,
}

impl SliderTable {
    fn build(
        rng: &mut XorShift64,
        relevant_mask: impl Fn(Square) -> BitBoard,
        slow_attacks: impl Fn(Square, BitBoard) -> BitBoard,
    ) -> Self {
        let mut entries = [MagicEntry::default(); 64];
        let mut attacks = Vec::new();

        for sq in ALL_SQUARES {
            let mask = relevant_mask(sq);
            let bits = mask.popcnt();
            let magic = find_magic(mask, |occ| slow_attacks(sq, occ), rng);
            let entry = MagicEntry {
                mask,
                magic,
                shift: (64 - bits) as u8,
                offset: attacks.len() as u32,
            };

            attacks.resize(attacks.len() + (1usize << bits), BitBoard(0));
            for occ in subsets(mask) {
                attacks[entry.index(occ)] = slow_attacks(sq, occ);
            }
            entries[sq.to_index()] = entry;
        }

        SliderTable { entries, attacks }
    }

    #[inline]
    fn lookup(&self, sq: Square, occupied: BitBoard) -> BitBoard {
        self.attacks[self.entries[sq.to_index()].index(occupied)]
    }
}

impl AttackTables {
    fn build() -> Self {
        let mut knight = [BitBoard(0); 64];
        let mut king = [BitBoard(0); 64];
        let mut pawn = [[BitBoard(0); 64]; 2];

        for sq in ALL_SQUARES {
            let b = BitBoard::from_square(sq);
            let i = sq.to_index();

            king[i] = b.north() | b.south() | b.east() | b.west()
                | b.north_east() | b.north_west() | b.south_east() | b.south_west();

            knight[i] = b.north().north_east() | b.north().north_west()
                | b.south().south_east() | b.south().south_west()
                | b.east().north_east() | b.east().south_east()
                | b.west().north_west() | b.west().south_west();

            pawn[Color::White.to_index()][i] = b.north_east() | b.north_west();
            pawn[Color::Black.to_index()][i] = b.south_east() | b.south_west();
        }

        let mut rng = XorShift64::new(0x1234_5678_9ABC_DEF0); // fixed seed for deterministic init
        let bishop = SliderTable::build(&mut rng, bishop_mask, bishop_attacks_slow);
        let rook = SliderTable::build(&mut rng, rook_mask, rook_attacks_slow);

        AttackTables { knight, king, pawn, bishop, rook }
    }
}

static TABLES: LazyLock<AttackTables> = LazyLock::new(AttackTables::build);

/// Force table construction. Call at startup, before spawning the search thread, so the magic
/// search cost is not paid inside the first `go`.
pub fn init_attacks() {
    LazyLock::force(&TABLES);
}

// --- Leaper lookup functions ---

#[inline]
pub fn knight_attacks(sq: Square) -> BitBoard {
    TABLES.knight[sq.to_index()]
}

#[inline]
pub fn king_attacks(sq: Square) -> BitBoard {
    TABLES.king[sq.to_index()]
}

/// squares a `color` pawn standing on `sq` attacks
#[inline]
pub fn pawn_attacks(color: Color, sq: Square) -> BitBoard {
    TABLES.pawn[color.to_index()][sq.to_index()]
}

// --- Slider lookup functions ---

#[inline]
pub fn bishop_attacks(sq: Square, occupied: BitBoard) -> BitBoard {
    TABLES.bishop.lookup(sq, occupied)
}

#[inline]
pub fn rook_attacks(sq: Square, occupied: BitBoard) -> BitBoard {
    TABLES.rook.lookup(sq, occupied)
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: BitBoard) -> BitBoard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

// --- Reference (slow) ray-trace generators used during init only ---

/// Bishop relevant occupancy: both diagonals, minus the square itself and the board rim
fn bishop_mask(sq: Square) -> BitBoard {
    (diagonal_mask(sq) | anti_diagonal_mask(sq)) & !EDGES & !BitBoard::from_square(sq)
}

/// Rook relevant occupancy: file without ranks 1/8, rank without files a/h, minus the square
fn rook_mask(sq: Square) -> BitBoard {
    let file = file_mask(sq.file()) & !(RANK_1 | RANK_8);
    let rank = rank_mask(sq.rank()) & !(FILE_A | FILE_H);
    (file | rank) & !BitBoard::from_square(sq)
}

/// cast one ray with `step` until it leaves the board or hits a blocker (blocker included)
fn ray(sq: Square, occupied: BitBoard, step: fn(BitBoard) -> BitBoard) -> BitBoard {
    let mut attacks = BitBoard(0);
    let mut cursor = step(BitBoard::from_square(sq));
    while !cursor.is_empty() {
        attacks |= cursor;
        if !(cursor & occupied).is_empty() {
            break;
        }
        cursor = step(cursor);
    }
    attacks
}

fn bishop_attacks_slow(sq: Square, occupied: BitBoard) -> BitBoard {
    ray(sq, occupied, BitBoard::north_east)
        | ray(sq, occupied, BitBoard::north_west)
        | ray(sq, occupied, BitBoard::south_east)
        | ray(sq, occupied, BitBoard::south_west)
}

fn rook_attacks_slow(sq: Square, occupied: BitBoard) -> BitBoard {
    ray(sq, occupied, BitBoard::north)
        | ray(sq, occupied, BitBoard::south)
        | ray(sq, occupied, BitBoard::east)
        | ray(sq, occupied, BitBoard::west)
}


// Leapers (knight, king, pawn) are plain per-square lookups built from the compass shifts, which
// already refuse to wrap across the a/h files. Sliders use magic bitboards over a
// relevant-occupancy mask that leaves out the board rim: a piece on the rim ends the ray there
// regardless, so it never changes the attack set and only makes the table larger.
