//! The source of random bytes for the `Cxnn` instruction.
//!
//! The interpreter takes this as a type parameter so that tests can
//! substitute a deterministic sequence and assert exact masked results.

/// Something that can produce random bytes on demand.
pub trait RandomSource {
    fn random_byte(&mut self) -> u8;
}

/// The default source, backed by the thread-local generator from `rand`.
/// Seeded per run by the operating system, so runs are not reproducible
/// bit-for-bit, but each run is internally consistent.
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn random_byte(&mut self) -> u8 {
        rand::random::<u8>()
    }
}

/// A fixed sequence of bytes that repeats once exhausted.
pub struct FixedSequence {
    bytes: Vec<u8>,
    next: usize,
}

impl FixedSequence {
    /// Create a sequence from the given bytes. Must not be empty.
    pub fn new(bytes: Vec<u8>) -> FixedSequence {
        assert!(!bytes.is_empty(), "FixedSequence needs at least one byte");
        FixedSequence { bytes, next: 0 }
    }
}

impl RandomSource for FixedSequence {
    fn random_byte(&mut self) -> u8 {
        let byte = self.bytes[self.next % self.bytes.len()];
        self.next += 1;
        byte
    }
}
