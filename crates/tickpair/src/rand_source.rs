/// A source of uniform randomness for the pipeline.
///
/// This abstraction lets the producers and the combiner be generic over
/// where their randomness comes from: the thread-local RNG in production
/// ([`ThreadRandom`]) or a fixed-seed generator for reproducible runs and
/// tests ([`SeededRandom`]).
///
/// None of this needs to be cryptographically secure; it only needs to be
/// uniform over the requested ranges.
///
/// [`ThreadRandom`]: crate::ThreadRandom
/// [`SeededRandom`]: crate::SeededRandom
pub trait RandSource {
    /// Returns an integer uniformly distributed over `[0, bound)`.
    ///
    /// `bound` must be non-zero.
    fn uniform(&mut self, bound: u64) -> u64;

    /// Returns 32 raw uniformly-distributed bits.
    fn wide_bits(&mut self) -> u32;

    /// Returns a string of exactly `len` characters, each drawn
    /// independently and uniformly from the 62-character alphanumeric
    /// alphabet `[a-zA-Z0-9]`.
    fn alphanumeric(&mut self, len: usize) -> String;
}
