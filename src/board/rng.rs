/// Fixed-seed xorshift64 generator shared by the magic search and the Zobrist keys.
pub(crate) struct XorShift64(u64);

impl XorShift64 {
    /// `seed` must be non-zero; zero is a fixed point of the step.
    pub(crate) const fn new(seed: u64) -> Self {
        XorShift64(seed)
    }

    pub(crate) fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    /// Few bits set on average, which makes good magic candidates.
    pub(crate) fn sparse(&mut self) -> u64 {
        self.next() & self.next() & self.next()
    }
}
