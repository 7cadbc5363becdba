//! Deterministic RNG hierarchy.
//!
//! A master seed generates one sub-seed per Monte Carlo run index. Sub-seeds
//! are derived via BLAKE3 hashing, independently of thread scheduling order, so
//! results are identical regardless of thread count.

use rand::rngs::StdRng;
use rand::SeedableRng;

const RUN_STREAM: &[u8] = b"tradesim/run";

/// Deterministic RNG hierarchy.
///
/// Because derivation is hash-based (not order-dependent), run 7 receives the
/// same stream whether it is generated first, last, or on another thread.
#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for a run index.
    pub fn sub_seed(&self, run_index: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(RUN_STREAM);
        hasher.update(&run_index.to_le_bytes());
        let hash = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }

    /// Create a seeded StdRng for a run index.
    pub fn rng_for_run(&self, run_index: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(run_index))
    }
}
