//! The closed set of CFR weighting policies: a static choice made once per
//! `solve()` call rather than per-iteration dynamic dispatch. Mirrors the
//! `mccfr::discount::Discount` `policy`/`regret` powf-ratio shape and
//! `cfr::solver::Solution`'s plain running-average update for the
//! unweighted case, generalized into one enum.

/// Which family of per-iteration weights to apply when accumulating regret
/// and cumulative strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Variant {
    /// Every iteration and every regret sign weighted equally.
    Vanilla,
    /// Iteration `t`'s contribution scaled by `t` (both regret and
    /// strategy), so later iterations dominate the average faster.
    Linear,
    /// Like `Vanilla`, but regrets are floored at zero after every
    /// accumulation and the strategy weight grows linearly in `t`.
    CfrPlus,
    /// Discounted CFR: positive/negative regret and the cumulative strategy
    /// each get their own `(t / (t + c))^exponent`-shaped decay.
    Discounted { alpha: f32, beta: f32, gamma: f32 },
}

impl Variant {
    /// Standard DCFR tuning (Brown & Sandholm 2019): positive regret barely
    /// discounted, negative regret discounted to zero immediately, strategy
    /// discounted quadratically.
    pub const DCFR_DEFAULT: Variant = Variant::Discounted {
        alpha: 1.5,
        beta: 0.0,
        gamma: 2.0,
    };

    /// CFR+ requires the locked read path in C3 (see `table::Entry`) because
    /// its post-accumulation clamp means an unlocked reader could observe a
    /// pre-clamp negative regret.
    pub fn requires_locked_reads(self) -> bool {
        matches!(self, Variant::CfrPlus)
    }

    /// Regrets are clamped to `[0, inf)` after every accumulation.
    pub fn clamps_regret(self) -> bool {
        matches!(self, Variant::CfrPlus)
    }

    /// Whether a player node may be pruned when both players' reach
    /// probabilities fall below epsilon. CFR+ never prunes: a pruned
    /// subtree would silently skip the regret floor it depends on.
    pub fn may_prune(self) -> bool {
        !matches!(self, Variant::CfrPlus)
    }

    /// Weight applied to this iteration's regret contribution for an action
    /// whose raw (unweighted) regret is `raw_regret`.
    pub fn regret_weight(self, t: usize, raw_regret: f32) -> f32 {
        match self {
            Variant::Vanilla | Variant::CfrPlus => 1.0,
            Variant::Linear => t as f32,
            Variant::Discounted { alpha, beta, .. } => {
                let t = t as f32;
                if raw_regret > 0.0 {
                    let x = t.powf(alpha);
                    x / (x + 1.0)
                } else if raw_regret < 0.0 {
                    let x = t.powf(beta);
                    x / (x + 1.0)
                } else {
                    1.0
                }
            }
        }
    }

    /// Weight applied to this iteration's cumulative-strategy contribution.
    pub fn strategy_weight(self, t: usize) -> f32 {
        match self {
            Variant::Vanilla => 1.0,
            Variant::Linear | Variant::CfrPlus => t as f32,
            Variant::Discounted { gamma, .. } => {
                let t = t as f32;
                (t / (t + 1.0)).powf(gamma)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanilla_weights_are_always_one() {
        assert_eq!(Variant::Vanilla.regret_weight(1, 5.0), 1.0);
        assert_eq!(Variant::Vanilla.regret_weight(1000, -5.0), 1.0);
        assert_eq!(Variant::Vanilla.strategy_weight(1000), 1.0);
    }

    #[test]
    fn linear_scales_with_iteration() {
        assert_eq!(Variant::Linear.regret_weight(7, 1.0), 7.0);
        assert_eq!(Variant::Linear.strategy_weight(7), 7.0);
    }

    #[test]
    fn cfr_plus_clamps_and_ramps_strategy() {
        assert!(Variant::CfrPlus.clamps_regret());
        assert!(Variant::CfrPlus.requires_locked_reads());
        assert!(!Variant::CfrPlus.may_prune());
        assert_eq!(Variant::CfrPlus.strategy_weight(9), 9.0);
    }

    #[test]
    fn discounted_negative_regret_decays_faster_with_beta_zero() {
        let v = Variant::DCFR_DEFAULT;
        // beta = 0 => t^0 = 1 => weight = 1/2 regardless of t.
        assert!((v.regret_weight(100, -1.0) - 0.5).abs() < 1e-6);
        // alpha = 1.5 => weight grows toward 1 as t grows.
        assert!(v.regret_weight(1, 1.0) < v.regret_weight(1000, 1.0));
    }
}
