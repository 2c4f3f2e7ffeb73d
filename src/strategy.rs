//! Average strategy: the normalized cumulative strategy, extracted
//! once into a pure, queryable policy with no further dependency on the
//! tree or the info-set table. Mirrors the normalize-with-uniform-fallback
//! shape of `Profile::policy`/`Strategy::policy` in `mccfr/types/strategy.rs`,
//! re-expressed as a single-threaded DFS over the flat `Tree`/`InfoTable`
//! pair instead of a `BTreeMap<Edge, Probability>` per info set.

use crate::ids::InfoSet;
use crate::table::{InfoTable, MAX_PLAYER_ACTIONS};
use crate::tree::{NodeIndex, Tree, KIND_CHANCE, KIND_P1};
use rand::Rng;
use std::collections::HashMap;

/// One info set's extracted policy: the action labels in canonical order
/// and their probabilities, summing to 1.
#[derive(Debug, Clone)]
struct Policy {
    actions: Vec<u16>,
    probs: Vec<f32>,
}

/// The averaged strategy for every player info set reachable in a tree,
/// detached from both the tree and the info table once built.
pub struct AverageStrategy {
    by_infoset: HashMap<InfoSet, Policy>,
    /// Parallel to `InfoTable`'s slot numbering, for callers that already
    /// have a slot (e.g. tests walking every slot in order).
    by_slot: Vec<Policy>,
}

impl AverageStrategy {
    /// Single-threaded DFS over `tree`, reading `table`'s cumulative
    /// strategy at each not-yet-seen player info set.
    pub fn extract(tree: &Tree, table: &InfoTable) -> Self {
        let mut by_infoset = HashMap::new();
        let mut by_slot: Vec<Option<Policy>> = (0..table.num_info_sets()).map(|_| None).collect();

        let mut stack = vec![Tree::root()];
        while let Some(node) = stack.pop() {
            if tree.is_terminal(node) {
                continue;
            }
            if tree.kind(node) != KIND_CHANCE {
                let info = tree.infoset(node);
                if !by_infoset.contains_key(&info) {
                    let slot = table.slot_of(node);
                    let n = table.n_actions(slot);
                    let mut probs = vec![0.0f32; MAX_PLAYER_ACTIONS];
                    table.entry(slot).average_strategy(&mut probs[..n]);
                    probs.truncate(n);
                    let actions = tree.edge_actions(node).to_vec();
                    let policy = Policy { actions, probs };
                    by_slot[slot as usize] = Some(policy.clone());
                    by_infoset.insert(info, policy);
                }
            }
            stack.extend(tree.children(node));
        }

        let by_slot = by_slot
            .into_iter()
            .enumerate()
            .map(|(slot, p)| p.unwrap_or_else(|| panic!("info-set slot {slot} never visited by the tree DFS")))
            .collect();

        Self { by_infoset, by_slot }
    }

    /// The policy vector for `info`, in the canonical action order recorded
    /// at tree-build time.
    pub fn get_strategy(&self, info: InfoSet) -> &[f32] {
        &self
            .by_infoset
            .get(&info)
            .expect("get_strategy: info set not reachable in this tree")
            .probs
    }

    /// Sample one action from `info`'s distribution.
    pub fn get_action(&self, info: InfoSet) -> u16 {
        let policy = self
            .by_infoset
            .get(&info)
            .expect("get_action: info set not reachable in this tree");
        let mut x: f32 = crate::rng::thread_local_rng().random();
        for (i, &p) in policy.probs.iter().enumerate() {
            if x < p {
                return policy.actions[i];
            }
            x -= p;
        }
        *policy.actions.last().expect("info set with zero actions")
    }

    pub(crate) fn policy_at_slot(&self, slot: u32) -> &[f32] {
        &self.by_slot[slot as usize].probs
    }

    /// Probability this strategy assigns to `action` at `info`. Used by best
    /// response to weight a state's reach by the opponent's actual play at
    /// each of their info sets along the path to it.
    pub(crate) fn prob(&self, info: InfoSet, action: u16) -> f32 {
        let policy = self
            .by_infoset
            .get(&info)
            .expect("prob: info set not reachable in this tree");
        policy
            .actions
            .iter()
            .position(|&a| a == action)
            .map(|i| policy.probs[i])
            .unwrap_or(0.0)
    }

    /// The value of this strategy played against itself from the root,
    /// from P1's perspective. Used by tests to check convergence toward a
    /// known equilibrium value and by exploitability as the game value `v`.
    pub fn root_value(&self, tree: &Tree) -> f32 {
        self.value_vs(tree, Tree::root())
    }

    fn value_vs(&self, tree: &Tree, node: NodeIndex) -> f32 {
        if tree.is_terminal(node) {
            return tree.payoff(node) as f32;
        }
        if tree.kind(node) == KIND_CHANCE {
            let mut v = 0.0;
            for (&child, &w) in tree.children(node).iter().zip(tree.weights(node)) {
                v += w * self.value_vs(tree, child);
            }
            return v;
        }
        let info = tree.infoset(node);
        let policy = self
            .by_infoset
            .get(&info)
            .expect("value_vs: info set not reachable in this tree");
        let children = tree.children(node);
        let mut v = 0.0;
        for (i, &child) in children.iter().enumerate() {
            v += policy.probs[i] * self.value_vs(tree, child);
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::rps::Rps;
    use crate::variant::Variant;

    #[test]
    fn every_policy_sums_to_one() {
        let tree = Tree::build(Rps::default());
        let table = InfoTable::build(&tree);
        crate::cfr::solve(&tree, &table, Variant::Vanilla, 500, 1e-9);
        let avg = AverageStrategy::extract(&tree, &table);
        for slot in 0..table.num_info_sets() as u32 {
            let sum: f32 = avg.policy_at_slot(slot).iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "policy sum {sum} for slot {slot}");
        }
    }

    #[test]
    fn fresh_table_yields_uniform_average_strategy() {
        let tree = Tree::build(Rps::default());
        let table = InfoTable::build(&tree);
        let avg = AverageStrategy::extract(&tree, &table);
        for slot in 0..table.num_info_sets() as u32 {
            for &p in avg.policy_at_slot(slot) {
                assert!((p - 1.0 / 3.0).abs() < 1e-6);
            }
        }
    }
}
