use crate::RandSource;
use rand::{Rng, distr::Alphanumeric, rng};

/// A [`RandSource`] backed by the thread-local RNG (`rand::rng()`).
///
/// Each OS thread has its own RNG instance, so calls from multiple threads
/// are contention-free and safe. This type does **not** store the RNG
/// itself; it simply accesses the thread-local generator on each call,
/// which is why it is a freely `Clone`-able zero-sized type.
#[derive(Default, Clone, Debug)]
pub struct ThreadRandom;

impl RandSource for ThreadRandom {
    fn uniform(&mut self, bound: u64) -> u64 {
        rng().random_range(0..bound)
    }

    fn wide_bits(&mut self) -> u32 {
        rng().random()
    }

    fn alphanumeric(&mut self, len: usize) -> String {
        rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }
}
