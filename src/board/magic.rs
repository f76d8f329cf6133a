use super::bitboard::BitBoard;
use super::rng::XorShift64;

/// magic bitboard entry for one square
#[derive(Clone, Copy, Debug, Default)]
pub struct MagicEntry {
    pub mask: BitBoard,
    pub magic: u64,
    pub shift: u8,
    pub offset: u32,
}

impl MagicEntry {
    /// Index into the flat attack table for a given board occupancy.
    #[inline]
    pub fn index(&self, occupied: BitBoard) -> usize {
        let blockers = occupied & self.mask;
        let hash = blockers.0.wrapping_mul(self.magic);
        self.offset as usize + (hash >> self.shift) as usize
    }
}

/// Every subset of `mask`, empty set first (Carry-Rippler enumeration).
pub fn subsets(mask: BitBoard) -> impl Iterator<Item = BitBoard> {
    let mut next = Some(0u64);
    std::iter::from_fn(move || {
        let occ = next?;
        let succ = occ.wrapping_sub(mask.0) & mask.0;
        next = if succ == 0 { None } else { Some(succ) };
        Some(BitBoard(occ))
    })
}

/// find a magic number for `mask` so that `(occ * magic) >> (64 - bits)` never maps two
/// occupancies with different attack sets to the same slot
pub(crate) fn find_magic(mask: BitBoard, slow_attacks: impl Fn(BitBoard) -> BitBoard, rng: &mut XorShift64) -> u64 {
    let bits = mask.popcnt();
    let shift = 64 - bits;

    let occupancies: Vec<BitBoard> = subsets(mask).collect();
    let attacks: Vec<BitBoard> = occupancies.iter().map(|&occ| slow_attacks(occ)).collect();

    // slider attack sets are never empty, so an empty slot means "unused"
    let mut table = vec![BitBoard(0); 1usize << bits];
    loop {
        let magic = rng.sparse();

        // quick reject: magic must spread the mask into the top byte
        if (mask.0.wrapping_mul(magic) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }

        table.fill(BitBoard(0));

        let collision_free = occupancies.iter().zip(&attacks).all(|(occ, &att)| {
            let idx = (occ.0.wrapping_mul(magic) >> shift) as usize;
            if table[idx].is_empty() {
                table[idx] = att;
                true
            } else {
                table[idx] == att
            }
        });

        if collision_free {
            return magic;
        }
    }
}


// For a rook on D4, attack depends on which squares between D4 and board edges are occupied
// (blockers). The relevant-occupancy mask has ~10-12 bits, giving 2^12 = 4096 patterns. A magic
// constant, multiplied by the masked occupancy and right-shifted, maps each pattern to a slot in
// a compact table. Candidates come from a fixed-seed xorshift PRNG and are tested for collisions.

// Carry-Rippler trick: `occ = (occ - mask) & mask` enumerates all subsets of `mask`, each exactly
// once, wrapping back to 0 after the full set.
