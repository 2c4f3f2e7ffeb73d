//! Solver tuning as a plain constructor-argument struct. Mirrors the
//! scattered `CFR_*`/`REGRET_*` crate-root consts this kind of tuning
//! usually lives as, but made an explicit value type since a library with
//! no single binary entrypoint has nowhere to own global constants.

use crate::mccfr::Sampling;
use crate::variant::Variant;

/// Default pruning epsilon for Monte-Carlo and full-tree CFR: reach
/// probabilities below this are treated as zero when deciding whether a
/// subtree may be skipped.
pub const DEFAULT_PRUNE_EPS: f32 = 1e-6;

/// How a `Solver::run` call should walk the tree: every chance and player
/// branch exactly once per iteration, or one of the sampled schemes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Traversal {
    /// Full enumeration every iteration (the C4 kernel).
    Full,
    /// One of the three Monte-Carlo sampling schemes (the C5 kernel).
    Sampled(Sampling),
}

/// Tuning knobs for a solving run: which weighting policy, how many
/// iterations, which traversal, the pruning threshold below which a reach
/// probability is treated as zero, and (MCCFR only) an optional fixed seed
/// for reproducible single-thread runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub variant: Variant,
    pub traversal: Traversal,
    pub iterations: usize,
    pub prune_eps: f32,
    /// When set, every MCCFR iteration derives its PRNG from `(seed,
    /// iteration_tag)` instead of the wall clock, making a single-thread run
    /// with the same seed and iteration count reproducible. Ignored by the
    /// full-tree kernel, which needs no PRNG. `None` by default: production
    /// runs have no reproducibility requirement and the wall-clock seed
    /// avoids the cost of threading a shared counter across workers.
    pub seed: Option<u64>,
}

impl SolverConfig {
    /// Full-tree vanilla CFR, no pruning.
    pub fn vanilla(iterations: usize) -> Self {
        Self {
            variant: Variant::Vanilla,
            traversal: Traversal::Full,
            iterations,
            prune_eps: 0.0,
            seed: None,
        }
    }

    /// Full-tree CFR+.
    pub fn cfr_plus(iterations: usize) -> Self {
        Self {
            variant: Variant::CfrPlus,
            traversal: Traversal::Full,
            iterations,
            prune_eps: DEFAULT_PRUNE_EPS,
            seed: None,
        }
    }

    /// Full-tree Discounted CFR at the standard `alpha=1.5, beta=0, gamma=2`
    /// tuning.
    pub fn discounted(iterations: usize) -> Self {
        Self {
            variant: Variant::DCFR_DEFAULT,
            traversal: Traversal::Full,
            iterations,
            prune_eps: DEFAULT_PRUNE_EPS,
            seed: None,
        }
    }

    /// External-sampling Monte-Carlo CFR with a given weighting policy.
    pub fn external_sampling(variant: Variant, iterations: usize) -> Self {
        Self {
            variant,
            traversal: Traversal::Sampled(Sampling::External),
            iterations,
            prune_eps: DEFAULT_PRUNE_EPS,
            seed: None,
        }
    }

    pub fn with_prune_eps(mut self, eps: f32) -> Self {
        self.prune_eps = eps;
        self
    }

    /// Fix the PRNG seed for a sampled (MCCFR) run. Has no effect on
    /// `Traversal::Full`, which uses no PRNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanilla_preset_has_no_pruning() {
        let cfg = SolverConfig::vanilla(100);
        assert_eq!(cfg.prune_eps, 0.0);
        assert_eq!(cfg.variant, Variant::Vanilla);
        assert_eq!(cfg.traversal, Traversal::Full);
    }

    #[test]
    fn with_prune_eps_overrides_default() {
        let cfg = SolverConfig::cfr_plus(10).with_prune_eps(1e-3);
        assert_eq!(cfg.prune_eps, 1e-3);
    }
}
