//! The solver facade: a single concrete type owning a built `Tree` plus its
//! `InfoTable`, driving whichever kernel `SolverConfig` selects and handing
//! back the derived artifacts (`AverageStrategy`, `BestResponse`,
//! exploitability). Mirrors a `Blueprint::solve`/`Trainer` facade shape,
//! collapsed to one concrete type since this crate has exactly one kernel
//! family rather than per-game trait objects.

use crate::config::{SolverConfig, Traversal};
use crate::game::Game;
use crate::player::Player;
use crate::response::{self, BestResponse};
use crate::strategy::AverageStrategy;
use crate::table::InfoTable;
use crate::tree::Tree;
use log::info;
use std::marker::PhantomData;

/// Owns a game tree and its info-set table for one concrete `Game`, and
/// drives CFR/MCCFR solving runs over them.
pub struct Solver<G: Game> {
    tree: Tree,
    table: InfoTable,
    _game: PhantomData<G>,
}

impl<G: Game> Solver<G> {
    /// Build the tree and a fresh (all-zero) info-set table from `root`.
    pub fn new(root: G) -> Self {
        let tree = Tree::build(root);
        let table = InfoTable::build(&tree);
        info!(
            "solver built: {} nodes, {} info sets",
            tree.len(),
            table.num_info_sets()
        );
        Self {
            tree,
            table,
            _game: PhantomData,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn table(&self) -> &InfoTable {
        &self.table
    }

    /// Run `config.iterations` solving passes, dispatching to the full-tree
    /// kernel or one of the Monte-Carlo sampling kernels per
    /// `config.traversal`.
    pub fn run(&self, config: SolverConfig) {
        match config.traversal {
            Traversal::Full => {
                crate::cfr::solve(&self.tree, &self.table, config.variant, config.iterations, config.prune_eps);
            }
            Traversal::Sampled(sampling) => {
                crate::mccfr::solve(
                    &self.tree,
                    &self.table,
                    config.variant,
                    sampling,
                    config.iterations,
                    config.seed,
                );
            }
        }
    }

    /// Extract the normalized cumulative strategy accumulated so far.
    pub fn average_strategy(&self) -> AverageStrategy {
        AverageStrategy::extract(&self.tree, &self.table)
    }

    /// The best response `target` has against a fixed average strategy.
    pub fn best_response(&self, avg: &AverageStrategy, target: Player) -> BestResponse {
        response::best_response::<G>(&self.tree, avg, target)
    }

    /// Distance-to-Nash scalar for a fixed average strategy (see
    /// `response::exploitability`).
    pub fn exploitability(&self, avg: &AverageStrategy) -> f32 {
        response::exploitability::<G>(&self.tree, avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::kuhn::Kuhn;
    use crate::games::rps::Rps;

    #[test]
    fn vanilla_rps_run_converges_to_near_zero_exploitability() {
        let solver = Solver::<Rps>::new(Rps::default());
        solver.run(SolverConfig::vanilla(20_000));
        let avg = solver.average_strategy();
        let exploit = solver.exploitability(&avg);
        assert!(exploit.is_finite());
        assert!(exploit < 0.2, "exploitability {exploit} too high");
    }

    #[test]
    fn kuhn_discounted_run_approaches_known_game_value() {
        let solver = Solver::<Kuhn>::new(Kuhn::default());
        solver.run(SolverConfig::discounted(20_000));
        let avg = solver.average_strategy();
        let v = avg.root_value(solver.tree());
        assert!((v - (-1.0 / 18.0)).abs() < 0.05, "root value {v} far from -1/18");
    }

    #[test]
    fn external_sampling_run_does_not_panic() {
        let solver = Solver::<Kuhn>::new(Kuhn::default());
        solver.run(SolverConfig::external_sampling(crate::variant::Variant::Linear, 5_000));
        let avg = solver.average_strategy();
        let _ = solver.exploitability(&avg);
    }
}
