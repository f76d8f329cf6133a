use crate::board::ChessMove;

use crate::types::{MATE_BOUND, Score};

/// How a stored score relates to the true value of the position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// the search failed high: true value >= score
    Lower,
    /// the search failed low: true value <= score
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableEntry {
    pub key: u64,
    pub best_move: Option<ChessMove>,
    /// mate scores are relative to this node, see `to_node_relative`
    pub score: Score,
    pub depth: u8,
    pub bound: Bound,
    generation: u8,
}

impl TableEntry {
    /// The stored score as a root-relative value usable at `ply`, if it settles the
    /// (`alpha`, `beta`) window on its own.
    pub fn usable_score(&self, ply: usize, alpha: Score, beta: Score) -> Option<Score> {
        let score = to_root_relative(self.score, ply);
        match self.bound {
            Bound::Exact => Some(score),
            Bound::Lower => (score >= beta).then_some(score),
            Bound::Upper => (score <= alpha).then_some(score),
        }
    }
}

/// A mate `ply` plies below the root becomes a mate that many plies fewer from this node.
fn to_node_relative(score: Score, ply: usize) -> Score {
    match score {
        s if s >= MATE_BOUND => s + ply as Score,
        s if s <= -MATE_BOUND => s - ply as Score,
        s => s,
    }
}

fn to_root_relative(score: Score, ply: usize) -> Score {
    match score {
        s if s >= MATE_BOUND => s - ply as Score,
        s if s <= -MATE_BOUND => s + ply as Score,
        s => s,
    }
}

/// Fixed-size hash table of search results, one entry per slot.
pub struct TranspositionTable {
    slots: Box<[Option<TableEntry>]>,
    generation: u8,
}

impl TranspositionTable {
    /// The largest power-of-two slot count that fits in `mb` megabytes (at least 1024 slots).
    pub fn new(mb: usize) -> Self {
        let slot_size = std::mem::size_of::<Option<TableEntry>>();
        let fits = (mb.max(1) * 1024 * 1024 / slot_size).max(1024);
        let slots = 1usize << (usize::BITS - 1 - fits.leading_zeros());

        Self {
            slots: vec![None; slots].into_boxed_slice(),
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    fn slot(&self, hash: u64) -> usize {
        hash as usize & (self.slots.len() - 1)
    }

    /// Start a new search: entries from earlier searches become replaceable.
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn probe(&self, hash: u64) -> Option<&TableEntry> {
        self.slots[self.slot(hash)].as_ref().filter(|e| e.key == hash)
    }

    /// Record a result for `hash` found at `ply` from the root.
    ///
    /// Depth-preferred with aging: an occupied slot is kept only against a shallower result
    /// for a different position within the same search.
    pub fn store(
        &mut self,
        hash: u64,
        depth: u8,
        score: Score,
        bound: Bound,
        best_move: Option<ChessMove>,
        ply: usize,
    ) {
        let idx = self.slot(hash);
        let keep_existing = self.slots[idx].is_some_and(|old| {
            old.key != hash && old.generation == self.generation && old.depth > depth
        });
        if keep_existing {
            return;
        }

        self.slots[idx] = Some(TableEntry {
            key: hash,
            best_move,
            score: to_node_relative(score, ply),
            depth,
            bound,
            generation: self.generation,
        });
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.generation = 0;
    }
}


// Slots are indexed by the low bits of the Zobrist hash; the full key in each entry rejects
// collisions. Search scores mates relative to the root, while the same position can be reached at
// different plies, so the table keeps them relative to the storing node.
