//! Per-call thread-local PRNG construction for the Monte-Carlo kernels.
//! Mirrors the seeding shape of `Profile::rng` (`mccfr/profile.rs`), which
//! seeds a `SmallRng` deterministically from `(epoch, bucket)`. Production
//! runs (no configured seed) instead seed from the wall clock and thread
//! id, since `SolverConfig` has no single epoch counter shared across
//! threads and each sampling call needs its own unshared PRNG rather than a
//! globally reproducible one, but `SolverConfig::seed` lets a caller opt
//! into the teacher's reproducible-from-a-tag scheme instead, which is what
//! the single-thread-fixed-seed determinism property (spec §8 scenario 5)
//! requires.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::{SystemTime, UNIX_EPOCH};

/// A fresh `SmallRng`, seeded from the current time and this thread's id.
/// Intended to be constructed once per sampling call and kept on the stack
/// for that call's duration, never shared or sent across threads.
pub(crate) fn thread_local_rng() -> SmallRng {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let tid = format!("{:?}", std::thread::current().id());
    let mut seed = [0u8; 32];
    seed[0..16].copy_from_slice(&nanos.to_le_bytes());
    for (i, b) in tid.bytes().enumerate().take(16) {
        seed[16 + i] = b;
    }
    SmallRng::from_seed(seed)
}

/// A `SmallRng` seeded deterministically from a caller-supplied `seed` and
/// this call's iteration tag, so that re-running the same sequence of
/// iteration tags against the same `seed` reproduces byte-identical streams
/// regardless of wall-clock time. Never shared across threads: each
/// iteration constructs its own from its own tag.
pub(crate) fn seeded_rng(seed: u64, tag: usize) -> SmallRng {
    let mixed = seed ^ (tag as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    SmallRng::seed_from_u64(mixed)
}
