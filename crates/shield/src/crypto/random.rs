//! [`RandomSource`]: the single injectable source of randomness.
//!
//! Key material, IVs, display tokens and the authenticator's MAC key all draw
//! from a `RandomSource`. Production code uses [`RandomSource::os`]; tests use
//! a seeded source so that runs are reproducible. The seeded constructor is
//! not compiled into release builds.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::{rngs::OsRng, Rng, RngCore};

type BoxedRng = Box<dyn RngCore + Send>;

/// Shared handle to a random number generator.
///
/// Clones share the same underlying generator.
#[derive(Clone)]
pub struct RandomSource {
    inner: Arc<Mutex<BoxedRng>>,
}

impl RandomSource {
    /// Backed by the operating system CSPRNG.
    pub fn os() -> Self {
        Self::from_rng(OsRng)
    }

    /// Deterministic generator for tests.
    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        use rand::{rngs::StdRng, SeedableRng};
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng<R: RngCore + Send + 'static>(rng: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(rng))),
        }
    }

    /// Fill `dest` with random bytes.
    pub fn fill_bytes(&self, dest: &mut [u8]) {
        self.lock().fill_bytes(dest);
    }

    /// Uniformly random index in `0..bound`. `bound` must be non-zero.
    pub fn index_below(&self, bound: usize) -> usize {
        self.lock().gen_range(0..bound)
    }

    fn lock(&self) -> MutexGuard<'_, BoxedRng> {
        // The generator holds no invariants a panicking holder could break.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::os()
    }
}

impl std::fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RandomSource")
    }
}
