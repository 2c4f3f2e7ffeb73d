//! DFS tree construction, following the explicit-stack DFS shape sketched
//! in `cfr/solver.rs::sample()` and the `todo: Vec` worklist in
//! `mccfr/traits/blueprint.rs::tree()`, but emitting into flat arrays
//! instead of a `petgraph::DiGraph`.
//!
//! Node indices are handed out in discovery order: a node's children are
//! always allocated (and pushed onto the worklist) before the node itself
//! is popped and finalized, so every child index is strictly greater than
//! its parent's, the ordering invariant the concurrent readers rely on.

use super::{NodeIndex, Tree, KIND_CHANCE, KIND_P1, KIND_P2};
use crate::game::Game;
use crate::ids::{InfoSet, Payoff, State};
use crate::player::Player;
use std::collections::HashMap;

struct Pending<G> {
    idx: NodeIndex,
    game: G,
}

struct Builder {
    headers: Vec<u32>,
    starts: Vec<u32>,
    infosets: Vec<InfoSet>,
    states: Vec<State>,
    payoffs: Vec<Payoff>,
    children: Vec<NodeIndex>,
    actions: Vec<u16>,
    weights: Vec<f32>,
    states_by_infoset: HashMap<InfoSet, Vec<State>>,
}

impl Builder {
    fn new() -> Self {
        Self {
            headers: Vec::new(),
            starts: Vec::new(),
            infosets: Vec::new(),
            states: Vec::new(),
            payoffs: Vec::new(),
            children: Vec::new(),
            actions: Vec::new(),
            weights: Vec::new(),
            states_by_infoset: HashMap::new(),
        }
    }

    /// Reserve placeholders for one node, returning its index.
    fn alloc(&mut self) -> NodeIndex {
        let idx = self.headers.len() as NodeIndex;
        self.headers.push(0);
        self.starts.push(0);
        self.infosets.push(InfoSet::default());
        self.states.push(State::default());
        self.payoffs.push(0);
        idx
    }
}

pub(super) fn build<G: Game>(root: G) -> Tree {
    let mut b = Builder::new();

    let root_idx = b.alloc();
    assert_eq!(root_idx, 0, "root must be allocated first");

    let mut todo: Vec<Pending<G>> = vec![Pending {
        idx: root_idx,
        game: root,
    }];

    while let Some(Pending { idx, game }) = todo.pop() {
        b.states[idx as usize] = game.get_state();

        if game.game_over() {
            b.headers[idx as usize] = 0; // fan_out 0 => terminal
            b.payoffs[idx as usize] = game.payoff(Player::P1);
            continue;
        }

        let player = game.current_player();
        let is_chance = matches!(player, Player::Chance);

        if !is_chance {
            let info = game.get_info_set(player);
            b.infosets[idx as usize] = info;
            b.states_by_infoset
                .entry(info)
                .or_default()
                .push(b.states[idx as usize]);
        }

        let cap = if is_chance {
            G::MAX_CHANCE_ACTIONS
        } else {
            G::MAX_PLAYER_ACTIONS
        };
        let mut acts: Vec<G::Action> = vec![G::Action::from(0); cap];
        let n = game.actions(&mut acts);
        assert!(n > 0, "non-terminal state must have at least one legal action");
        assert!(
            n <= cap,
            "Game::actions wrote {n} actions past its declared bound {cap}"
        );

        let start = b.children.len() as u32;
        b.starts[idx as usize] = start;

        if is_chance {
            let mut raw_weights = vec![0u32; G::MAX_CHANCE_ACTIONS];
            let wn = game.probas(&mut raw_weights[..n]);
            assert_eq!(wn, n, "probas must return one weight per action");
            let total: u64 = raw_weights[..n].iter().map(|&w| w as u64).sum();
            assert!(total > 0, "chance weights must not all be zero");

            let mut accounted = 0.0f32;
            for i in 0..n {
                let mut child_game = game.clone();
                child_game.play(acts[i]);
                let child_idx = b.alloc();
                b.children.push(child_idx);
                b.actions.push(acts[i].into());
                // Exact normalization: every weight but the last is a plain
                // ratio; the last absorbs rounding so the row sums to 1.0
                // bit-for-bit rather than merely within tolerance.
                let w = if i + 1 == n {
                    1.0 - accounted
                } else {
                    let w = raw_weights[i] as f64 / total as f64;
                    accounted += w as f32;
                    w as f32
                };
                b.weights.push(w);
                todo.push(Pending {
                    idx: child_idx,
                    game: child_game,
                });
            }
        } else {
            for i in 0..n {
                let mut child_game = game.clone();
                child_game.play(acts[i]);
                let child_idx = b.alloc();
                b.children.push(child_idx);
                b.actions.push(acts[i].into());
                b.weights.push(0.0);
                todo.push(Pending {
                    idx: child_idx,
                    game: child_game,
                });
            }
        }

        let kind = match player {
            Player::P1 => KIND_P1,
            Player::P2 => KIND_P2,
            Player::Chance => KIND_CHANCE,
        };
        b.headers[idx as usize] = kind | ((n as u32) << 2);
    }

    Tree {
        headers: b.headers,
        starts: b.starts,
        children: b.children,
        actions: b.actions,
        weights: b.weights,
        infosets: b.infosets,
        states: b.states,
        payoffs: b.payoffs,
        states_by_infoset: b.states_by_infoset,
    }
}
