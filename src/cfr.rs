//! The full-traversal CFR iteration kernel: recurses the entire tree
//! every iteration, exactly enumerating every chance and player branch.
//! Mirrors the `cfr::solver::Solution` recursive value/regret/policy
//! relationship (`expected_value`/`cfactual_value`/`relative_value`),
//! re-expressed over the flat `Tree`/`InfoTable` and dispatched across
//! `rayon` workers instead of a single-thread `while` loop.

use crate::player::Player;
use crate::table::{InfoTable, MAX_PLAYER_ACTIONS};
use crate::tree::{NodeIndex, Tree, KIND_CHANCE, KIND_P1};
use crate::variant::Variant;
use log::trace;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One full-tree CFR recursion for iteration `t`, updating only the
/// `walker` player's regret/strategy accumulators.
struct Kernel<'a> {
    tree: &'a Tree,
    table: &'a InfoTable,
    variant: Variant,
    walker: Player,
    t: usize,
    eps: f32,
}

impl<'a> Kernel<'a> {
    fn run(&self, node: NodeIndex, pi1: f32, pi2: f32, pic: f32) -> f32 {
        if self.tree.is_terminal(node) {
            return self.tree.payoff(node) as f32;
        }

        if self.tree.kind(node) == KIND_CHANCE {
            let children = self.tree.children(node);
            let weights = self.tree.weights(node);
            let mut v = 0.0f32;
            for (&child, &w) in children.iter().zip(weights) {
                v += w * self.run(child, pi1, pi2, pic * w);
            }
            return v;
        }

        if self.variant.may_prune() && pi1.abs() < self.eps && pi2.abs() < self.eps {
            return 0.0;
        }

        let player = if self.tree.kind(node) == KIND_P1 {
            Player::P1
        } else {
            Player::P2
        };

        let slot = self.table.slot_of(node);
        let n = self.table.n_actions(slot);
        let mut sigma = [0.0f32; MAX_PLAYER_ACTIONS];
        if self.variant.requires_locked_reads() {
            self.table.entry(slot).current_strategy_locked(&mut sigma[..n]);
        } else {
            self.table.entry(slot).current_strategy_unlocked(&mut sigma[..n]);
        }

        let children = self.tree.children(node);
        let mut u = [0.0f32; MAX_PLAYER_ACTIONS];
        let mut v = 0.0f32;
        for a in 0..n {
            let (np1, np2) = match player {
                Player::P1 => (pi1 * sigma[a], pi2),
                Player::P2 => (pi1, pi2 * sigma[a]),
                Player::Chance => unreachable!(),
            };
            u[a] = self.run(children[a], np1, np2, pic);
            v += sigma[a] * u[a];
        }

        if player == self.walker {
            let pi_self = if player == Player::P1 { pi1 } else { pi2 };
            let pi_opp = if player == Player::P1 { pi2 } else { pi1 };

            let mut regret_delta = [0.0f32; MAX_PLAYER_ACTIONS];
            let mut strategy_delta = [0.0f32; MAX_PLAYER_ACTIONS];
            let ws = self.variant.strategy_weight(self.t) * pi_self;
            for a in 0..n {
                let raw = match player {
                    Player::P1 => u[a] - v,
                    Player::P2 => v - u[a],
                    Player::Chance => unreachable!(),
                };
                let wr = self.variant.regret_weight(self.t, raw);
                regret_delta[a] = wr * pi_opp * pic * raw;
                strategy_delta[a] = ws * sigma[a];
            }
            self.table.entry(slot).accumulate(
                &regret_delta[..n],
                &strategy_delta[..n],
                self.variant.clamps_regret(),
            );
        }

        v
    }
}

/// Run `iterations` full-tree CFR passes, alternating which player updates
/// on odd/even iteration numbers, fanned out across the `rayon` global pool.
/// Iteration tags come from an `AtomicUsize::fetch_add`, so completion order
/// need not match tag order: only the per-entry accumulation in C3 need be
/// serialized, per the concurrency model.
pub fn solve(tree: &Tree, table: &InfoTable, variant: Variant, iterations: usize, eps: f32) {
    let counter = AtomicUsize::new(1);
    (0..iterations).into_par_iter().for_each(|_| {
        let t = counter.fetch_add(1, Ordering::Relaxed);
        let walker = if t % 2 == 1 { Player::P1 } else { Player::P2 };
        trace!("cfr iteration t={t} walker={walker}");
        let kernel = Kernel {
            tree,
            table,
            variant,
            walker,
            t,
            eps,
        };
        kernel.run(Tree::root(), 1.0, 1.0, 1.0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::kuhn::Kuhn;
    use crate::games::rps::Rps;

    #[test]
    fn single_thread_cfr_is_deterministic() {
        let tree = Tree::build(Rps::default());
        let table_a = InfoTable::build(&tree);
        let table_b = InfoTable::build(&tree);
        // Sequential (non-parallel) application of the same iteration tags
        // must produce bit-identical accumulators.
        for t in 1..=200usize {
            let walker = if t % 2 == 1 { Player::P1 } else { Player::P2 };
            Kernel {
                tree: &tree,
                table: &table_a,
                variant: Variant::Vanilla,
                walker,
                t,
                eps: 1e-6,
            }
            .run(Tree::root(), 1.0, 1.0, 1.0);
            Kernel {
                tree: &tree,
                table: &table_b,
                variant: Variant::Vanilla,
                walker,
                t,
                eps: 1e-6,
            }
            .run(Tree::root(), 1.0, 1.0, 1.0);
        }
        for slot in 0..table_a.num_info_sets() as u32 {
            let n = table_a.n_actions(slot);
            let mut a = [0.0f32; MAX_PLAYER_ACTIONS];
            let mut b = [0.0f32; MAX_PLAYER_ACTIONS];
            table_a.entry(slot).average_strategy(&mut a[..n]);
            table_b.entry(slot).average_strategy(&mut b[..n]);
            assert_eq!(&a[..n], &b[..n]);
        }
    }

    #[test]
    fn kuhn_root_value_converges_toward_known_equilibrium() {
        let tree = Tree::build(Kuhn::default());
        let table = InfoTable::build(&tree);
        solve(&tree, &table, Variant::Linear, 4000, 1e-9);

        let avg = crate::strategy::AverageStrategy::extract(&tree, &table);
        let v = avg.root_value(&tree);
        // Known Kuhn poker game value for P1 is -1/18.
        assert!((v - (-1.0 / 18.0)).abs() < 0.05, "root value {v} far from -1/18");
    }
}
