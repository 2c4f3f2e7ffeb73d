//! In-crate reference `Game` implementations: Rock-Paper-Scissors,
//! three-card Kuhn poker, and a no-raise Leduc variant. They are test
//! fixtures in the same spirit as an `mccfr::rps` module (kept in-tree,
//! unconditionally compiled, never part of the public Game-rule surface a
//! real caller brings).

pub mod kuhn;
pub mod leduc;
pub mod rps;

use crate::game::Game;
use rand::Rng;

/// Play `g` from its initial state to a uniformly random reachable terminal
/// or depth-bounded state, choosing among legal actions with equal
/// probability at every node (player and chance alike). Shared by each
/// in-crate game's `Arbitrary` impl so fixture tests can exercise random
/// histories instead of only ever the initial state.
pub(crate) fn random_playout<G: Game + Default>(max_depth: usize) -> G {
    let mut g = G::default();
    let mut rng = crate::rng::thread_local_rng();
    let mut acts = vec![G::Action::from(0); G::MAX_CHANCE_ACTIONS.max(G::MAX_PLAYER_ACTIONS)];
    for _ in 0..max_depth {
        if g.game_over() {
            break;
        }
        let cap = if g.is_chance_player() {
            G::MAX_CHANCE_ACTIONS
        } else {
            G::MAX_PLAYER_ACTIONS
        };
        let n = g.actions(&mut acts[..cap]);
        let i = rng.random_range(0..n);
        g.play(acts[i]);
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{kuhn::Kuhn, leduc::Leduc, rps::Rps};
    use crate::Arbitrary;

    #[test]
    fn random_playouts_never_panic_across_all_fixture_games() {
        for _ in 0..200 {
            let _ = Rps::random();
            let _ = Kuhn::random();
            let _ = Leduc::random();
        }
    }

    #[test]
    fn random_playout_state_round_trips_through_set_state() {
        for _ in 0..50 {
            let g = Kuhn::random();
            let mut h = Kuhn::default();
            h.set_state(g.get_state());
            assert_eq!(h.get_state(), g.get_state());
        }
    }
}
