//! Best response & exploitability. Nothing in `mccfr::profile` computes an
//! adversarial best response; this adapts its reach-probability/value idiom
//! (`expected_value`/`cfactual_value`/`relative_value`) to a deterministic
//! maximizing policy instead.
//!
//! The subtlety worth calling out directly: because information sets
//! conflate multiple tree nodes, the best-responding player cannot choose
//! a different action at each node sharing an info set: the whole info
//! set must resolve to one action, picked by aggregating each member
//! node's reach-weighted child values. The aggregation is triggered lazily,
//! the first time recursion reaches any member of a not-yet-decided info
//! set, and the decision is then reused (and every member's value filled
//! in at once) for the rest of the walk.

use crate::game::Game;
use crate::ids::InfoSet;
use crate::player::Player;
use crate::strategy::AverageStrategy;
use crate::tree::{NodeIndex, Tree, KIND_CHANCE, KIND_P1};
use std::collections::HashMap;

/// A deterministic policy maximizing `target`'s expected payoff against a
/// fixed opponent strategy, plus its value at the root.
pub struct BestResponse {
    target: Player,
    decided: HashMap<InfoSet, usize>,
    root_value: f32,
}

impl BestResponse {
    /// The action index (not label) the best response plays at `info`,
    /// if that info set was ever visited during the walk.
    pub fn action_index(&self, info: InfoSet) -> Option<usize> {
        self.decided.get(&info).copied()
    }

    pub fn target(&self) -> Player {
        self.target
    }

    /// Expected payoff (P1's perspective) of this best response played
    /// against the fixed opponent strategy it was computed against.
    pub fn value(&self) -> f32 {
        self.root_value
    }
}

struct Walker<'a, G: Game> {
    tree: &'a Tree,
    avg: &'a AverageStrategy,
    target: Player,
    nodes_by_infoset: HashMap<InfoSet, Vec<NodeIndex>>,
    decided: HashMap<InfoSet, usize>,
    memo: Vec<Option<f32>>,
    _game: std::marker::PhantomData<G>,
}

impl<'a, G: Game> Walker<'a, G> {
    fn kind_of(tree: &Tree, node: NodeIndex) -> Player {
        if tree.kind(node) == KIND_P1 {
            Player::P1
        } else {
            Player::P2
        }
    }

    /// Product of chance's and the opponent's reach probability to `state`:
    /// `chance_reach_proba` handles chance, and
    /// `info_sets_and_actions(state, opponent)` replays only the
    /// opponent's own decisions along the path, weighted by `avg`.
    fn reach(&self, node: NodeIndex, opponent: Player) -> f64 {
        let state = self.tree.state(node);
        let mut reach = G::chance_reach_proba(state);
        for (info, action) in G::info_sets_and_actions(state, opponent) {
            let action: u16 = action.into();
            reach *= self.avg.prob(info, action) as f64;
        }
        reach
    }

    fn value(&mut self, node: NodeIndex) -> f32 {
        if let Some(v) = self.memo[node as usize] {
            return v;
        }
        let v = if self.tree.is_terminal(node) {
            self.tree.payoff(node) as f32
        } else if self.tree.kind(node) == KIND_CHANCE {
            let mut acc = 0.0f32;
            for (&child, &w) in self.tree.children(node).iter().zip(self.tree.weights(node)) {
                acc += w * self.value(child);
            }
            acc
        } else {
            let acting = Self::kind_of(self.tree, node);
            if acting != self.target {
                let info = self.tree.infoset(node);
                let sigma = self.avg.get_strategy(info);
                let mut acc = 0.0f32;
                for (i, &child) in self.tree.children(node).iter().enumerate() {
                    acc += sigma[i] * self.value(child);
                }
                acc
            } else {
                self.resolve_infoset(node);
                self.memo[node as usize].expect("infoset resolution must fill in this node's value")
            }
        };
        self.memo[node as usize] = Some(v);
        v
    }

    /// Aggregates every member node of `node`'s info set, picks the
    /// best-responding action, and fills in each member's value.
    fn resolve_infoset(&mut self, node: NodeIndex) {
        let info = self.tree.infoset(node);
        if self.decided.contains_key(&info) {
            return;
        }
        let opponent = self.target.opponent();
        let members = self.nodes_by_infoset[&info].clone();
        let n = self.tree.fan_out(members[0]) as usize;

        let mut aggregate = vec![0.0f64; n];
        let mut per_member: Vec<Vec<f32>> = Vec::with_capacity(members.len());
        for &m in &members {
            let reach = self.reach(m, opponent);
            let children = self.tree.children(m);
            let mut row = Vec::with_capacity(n);
            for &child in children {
                row.push(self.value(child));
            }
            for a in 0..n {
                aggregate[a] += reach * row[a] as f64;
            }
            per_member.push(row);
        }

        let mut best = 0usize;
        for a in 1..n {
            if aggregate[a] > aggregate[best] {
                best = a;
            }
        }
        self.decided.insert(info, best);
        for (&m, row) in members.iter().zip(per_member.iter()) {
            self.memo[m as usize] = Some(row[best]);
        }
    }
}

fn nodes_by_infoset_of(tree: &Tree, target: Player) -> HashMap<InfoSet, Vec<NodeIndex>> {
    let target_kind = match target {
        Player::P1 => crate::tree::KIND_P1,
        Player::P2 => crate::tree::KIND_P2,
        Player::Chance => unreachable!("best response target must be P1 or P2"),
    };
    let mut map: HashMap<InfoSet, Vec<NodeIndex>> = HashMap::new();
    for node in 0..tree.len() as NodeIndex {
        if tree.kind(node) == target_kind && !tree.is_terminal(node) {
            map.entry(tree.infoset(node)).or_default().push(node);
        }
    }
    map
}

/// Compute the best response `target` has against `avg`, the fixed
/// opposing average strategy.
pub fn best_response<G: Game>(tree: &Tree, avg: &AverageStrategy, target: Player) -> BestResponse {
    let nodes_by_infoset = nodes_by_infoset_of(tree, target);
    let mut walker: Walker<G> = Walker {
        tree,
        avg,
        target,
        nodes_by_infoset,
        decided: HashMap::new(),
        memo: vec![None; tree.len()],
        _game: std::marker::PhantomData,
    };
    let root_value = walker.value(Tree::root());
    BestResponse {
        target,
        decided: walker.decided,
        root_value,
    }
}

/// Distance-to-Nash scalar: the average one-sided gain from unilateral
/// deviation, normalized by the game value's magnitude. When `|v| < eps`
/// the unnormalized numerator is returned directly rather than dividing by
/// a near-zero value.
pub fn exploitability<G: Game>(tree: &Tree, avg: &AverageStrategy) -> f32 {
    const EPS: f32 = 1e-9;
    let v = avg.root_value(tree);
    let br1 = best_response::<G>(tree, avg, Player::P1);
    let br2 = best_response::<G>(tree, avg, Player::P2);
    let numerator = ((br1.value() - v).abs() + (br2.value() - v).abs()) / 2.0;
    if v.abs() < EPS {
        numerator
    } else {
        numerator / v.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::kuhn::Kuhn;
    use crate::games::rps::Rps;
    use crate::table::InfoTable;
    use crate::variant::Variant;

    #[test]
    fn best_response_dominates_self_play_value() {
        let tree = Tree::build(Rps::default());
        let table = InfoTable::build(&tree);
        crate::cfr::solve(&tree, &table, Variant::Linear, 20_000, 1e-9);
        let avg = AverageStrategy::extract(&tree, &table);
        let v = avg.root_value(&tree);

        let br1 = best_response::<Rps>(&tree, &avg, Player::P1);
        let br2 = best_response::<Rps>(&tree, &avg, Player::P2);
        assert!(br1.value() >= v - 1e-3, "BR_P1 {} should be >= self-play {v}", br1.value());
        assert!(br2.value() <= v + 1e-3, "BR_P2 {} should be <= self-play {v}", br2.value());
    }

    #[test]
    fn exploitability_of_near_equilibrium_rps_is_small() {
        let tree = Tree::build(Rps::default());
        let table = InfoTable::build(&tree);
        crate::cfr::solve(&tree, &table, Variant::Linear, 50_000, 1e-9);
        let avg = AverageStrategy::extract(&tree, &table);
        let exploit = exploitability::<Rps>(&tree, &avg);
        assert!(exploit.is_finite());
        assert!(exploit < 0.2, "exploitability {exploit} too high for near-equilibrium RPS");
    }

    #[test]
    fn kuhn_best_response_value_matches_known_equilibrium_bound() {
        let tree = Tree::build(Kuhn::default());
        let table = InfoTable::build(&tree);
        crate::cfr::solve(&tree, &table, Variant::Linear, 30_000, 1e-9);
        let avg = AverageStrategy::extract(&tree, &table);
        let v = avg.root_value(&tree);
        let br1 = best_response::<Kuhn>(&tree, &avg, Player::P1);
        assert!(br1.value() >= v - 0.05);
    }
}
