//! `cfr-core`: the Counterfactual Regret Minimization core for two-player,
//! zero-sum, imperfect-information extensive-form games with chance.
//!
//! A concrete game (Rock-Paper-Scissors, Kuhn poker, Leduc, ...) implements
//! [`game::Game`]; [`tree::Tree::build`] walks it once into a flat,
//! pointer-free representation; [`solver::Solver`] then drives vanilla CFR,
//! Linear CFR, CFR+, Discounted CFR, or one of three Monte-Carlo samplers
//! over it, accumulating regret and cumulative strategy into a
//! [`table::InfoTable`] shared lock-free-reads/striped-locked-writes across
//! however many threads `rayon` schedules. [`strategy::AverageStrategy`]
//! extracts the converged policy; [`response`] computes a best response
//! against it and the two-sided exploitability gap.
//!
//! Hand evaluation, abstraction, neural value heads, file formats, and any
//! user-facing CLI are explicitly out of scope: they are the concern of
//! whatever crate supplies a concrete `Game` and consumes this crate's
//! outputs.

pub mod cfr;
pub mod config;
pub mod game;
pub mod games;
pub mod ids;
pub mod mccfr;
pub mod player;
pub mod response;
pub mod rng;
pub mod solver;
pub mod strategy;
pub mod table;
pub mod tree;
pub mod variant;

/// dimensional analysis types, following the teacher's crate-root practice
/// of naming `f32` by what it measures rather than passing raw floats.
pub type Utility = f32;
pub type Probability = f32;

/// Default pruning epsilon, re-exported at crate root for callers assembling
/// a [`config::SolverConfig`] without reaching into the `config` module.
pub const DEFAULT_PRUNE_EPS: Probability = config::DEFAULT_PRUNE_EPS;

/// Trait for random generation of fixture values, used by property-style
/// tests rather than anywhere in the solving hot path.
pub trait Arbitrary {
    fn random() -> Self;
}
