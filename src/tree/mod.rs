//! The game tree: a flat, index-based, immutable representation built
//! once from a `Game` and then read concurrently by every solver worker.
//!
//! Pointers are deliberately absent. A node is an index into parallel
//! `Vec`s; its header packs `(kind, fan_out)` into one `u32`; its outgoing
//! edges live in contiguous slices of the tree-wide `children`/`actions`/
//! `weights` arrays, located by a per-node start offset. This replaces a
//! `petgraph::DiGraph`-backed tree, which cannot be read from many threads
//! without either cloning or wrapping every access in locks.

mod builder;

use crate::ids::{InfoSet, Payoff, State};
use std::collections::HashMap;

pub const KIND_P1: u32 = 0;
pub const KIND_P2: u32 = 1;
pub const KIND_CHANCE: u32 = 2;

/// Index of a node within a `Tree`. Always `< tree.len()`.
pub type NodeIndex = u32;

#[derive(Debug)]
pub struct Tree {
    /// `kind: u2 | fan_out: u30`, per node. `fan_out == 0` marks terminal.
    headers: Vec<u32>,
    /// Start offset into `children`/`actions`/`weights` for each node's own
    /// outgoing edges.
    starts: Vec<u32>,
    /// Child node index per edge, flattened across all nodes.
    children: Vec<NodeIndex>,
    /// Action label per edge, parallel to `children`.
    actions: Vec<u16>,
    /// Chance probability per edge, parallel to `children`. Meaningless for
    /// edges out of a player node.
    weights: Vec<f32>,
    /// Acting player's info set per node. Meaningless for chance/terminal.
    infosets: Vec<InfoSet>,
    /// Opaque game-state identifier per node.
    states: Vec<State>,
    /// Terminal payoff (P1's perspective) per node. Meaningless unless the
    /// node is terminal.
    payoffs: Vec<Payoff>,
    /// Every distinct `State` observed at a node sharing a given `InfoSet`,
    /// populated during the same build pass. Used only by C7.
    states_by_infoset: HashMap<InfoSet, Vec<State>>,
}

impl Tree {
    pub fn build<G: crate::game::Game>(root: G) -> Self {
        builder::build(root)
    }

    #[inline]
    pub fn root() -> NodeIndex {
        0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    #[inline]
    pub fn kind(&self, node: NodeIndex) -> u32 {
        self.headers[node as usize] & 0b11
    }

    #[inline]
    pub fn fan_out(&self, node: NodeIndex) -> u32 {
        self.headers[node as usize] >> 2
    }

    #[inline]
    pub fn is_terminal(&self, node: NodeIndex) -> bool {
        self.fan_out(node) == 0
    }

    #[inline]
    pub fn is_chance(&self, node: NodeIndex) -> bool {
        self.kind(node) == KIND_CHANCE
    }

    #[inline]
    pub fn children(&self, node: NodeIndex) -> &[NodeIndex] {
        let n = self.fan_out(node) as usize;
        let s = self.starts[node as usize] as usize;
        &self.children[s..s + n]
    }

    #[inline]
    pub fn edge_actions(&self, node: NodeIndex) -> &[u16] {
        let n = self.fan_out(node) as usize;
        let s = self.starts[node as usize] as usize;
        &self.actions[s..s + n]
    }

    #[inline]
    pub fn weights(&self, node: NodeIndex) -> &[f32] {
        let n = self.fan_out(node) as usize;
        let s = self.starts[node as usize] as usize;
        &self.weights[s..s + n]
    }

    #[inline]
    pub fn infoset(&self, node: NodeIndex) -> InfoSet {
        self.infosets[node as usize]
    }

    #[inline]
    pub fn state(&self, node: NodeIndex) -> State {
        self.states[node as usize]
    }

    #[inline]
    pub fn payoff(&self, node: NodeIndex) -> Payoff {
        debug_assert!(self.is_terminal(node), "payoff read at non-terminal node");
        self.payoffs[node as usize]
    }

    pub fn states_by_infoset(&self, info: InfoSet) -> &[State] {
        self.states_by_infoset
            .get(&info)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All distinct player info sets observed while building the tree.
    pub fn info_sets(&self) -> impl Iterator<Item = InfoSet> + '_ {
        self.states_by_infoset.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::rps::Rps;

    #[test]
    fn root_is_index_zero_and_tree_is_acyclic_by_construction() {
        let tree = Tree::build(Rps::default());
        assert_eq!(Tree::root(), 0);
        // Every child index must exceed its parent: enforced by the builder's
        // eager-allocation discipline, checked here for the whole tree.
        for node in 0..tree.len() as NodeIndex {
            for &child in tree.children(node) {
                assert!(child > node, "child {child} must be > parent {node}");
            }
        }
    }

    #[test]
    fn chance_weights_sum_to_exactly_one() {
        let tree = Tree::build(crate::games::kuhn::Kuhn::default());
        for node in 0..tree.len() as NodeIndex {
            if tree.is_chance(node) {
                let sum: f32 = tree.weights(node).iter().sum();
                assert!((sum - 1.0).abs() < 1e-9, "chance weights summed to {sum}");
            }
        }
    }

    #[test]
    fn terminal_nodes_have_zero_fan_out() {
        let tree = Tree::build(Rps::default());
        let mut saw_terminal = false;
        for node in 0..tree.len() as NodeIndex {
            if tree.is_terminal(node) {
                saw_terminal = true;
                assert!(tree.children(node).is_empty());
            }
        }
        assert!(saw_terminal);
    }
}
