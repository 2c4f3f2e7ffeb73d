//! The Game contract: the boundary between a concrete game's rules and
//! the tree builder / best-response walker. Rules, hand evaluation,
//! abstraction and file I/O all live on the far side of this trait, and the
//! core never reaches back across it except through these methods.

use crate::ids::{GameAction, InfoSet, Payoff, State};
use crate::player::Player;

/// A two-player zero-sum extensive-form game with chance, observed through
/// a single mutable cursor (`reset`/`play`/`undo`) rather than an owned
/// tree. `Tree::build` drives this trait to materialize the flat
/// representation once; after that the `Game` impl is no longer consulted
/// except by best-response, which needs `info_sets_and_actions` and
/// `chance_reach_proba` to reconstruct reach probabilities for arbitrary
/// states.
pub trait Game: Clone + Send + Sync {
    /// Small, copyable action code. Shared by player and chance edges but
    /// never compared across node kinds.
    type Action: GameAction;

    /// Upper bound on actions at any player node. Used to size the fixed
    /// stack buffers passed to `actions`/`probas` and the info-set table's
    /// per-entry arrays.
    const MAX_PLAYER_ACTIONS: usize;
    /// Upper bound on actions at any chance node.
    const MAX_CHANCE_ACTIONS: usize;

    /// Return to the initial state.
    fn reset(&mut self);

    /// Opaque identifier of the current history. Two `State`s are equal iff
    /// the sequence of actions (including chance draws) that produced them
    /// is identical.
    fn get_state(&self) -> State;

    /// Jump the cursor to a previously observed state. Implementors must
    /// make this exact: `get_state()` immediately after must return
    /// `state` unchanged.
    fn set_state(&mut self, state: State);

    /// The information `player` has about the current history: private
    /// information plus public history, omitting everything `player` could
    /// not have observed. Calling this when `player` is not the node's
    /// acting player, or on a chance node, is a programming error.
    fn get_info_set(&self, player: Player) -> InfoSet;

    /// Who acts at the current state.
    fn current_player(&self) -> Player;

    fn is_chance_player(&self) -> bool {
        matches!(self.current_player(), Player::Chance)
    }

    /// Whether the current state is terminal (no legal actions, a payoff is
    /// defined).
    fn game_over(&self) -> bool;

    /// Fill `out` with the legal actions at the current state, in a stable
    /// canonical order, and return how many were written. `out` is sized to
    /// `MAX_PLAYER_ACTIONS`/`MAX_CHANCE_ACTIONS` by the caller; writing past
    /// the returned count is a programming error on the caller's part, not
    /// the implementor's.
    fn actions(&self, out: &mut [Self::Action]) -> usize;

    /// Chance nodes only: integer weights parallel to the actions written by
    /// the immediately preceding `actions` call. Weights need not sum to any
    /// particular value (the tree builder normalizes them). Calling this on
    /// a non-chance node is a programming error.
    fn probas(&self, out: &mut [u32]) -> usize;

    /// Apply `action`, advancing the cursor.
    fn play(&mut self, action: Self::Action);

    /// Reverse the most recent `play(action)`, restoring the prior state
    /// exactly.
    fn undo(&mut self, action: Self::Action);

    /// Terminal payoff for `player`, from a zero-sum pair (`payoff(P1) ==
    /// -payoff(P2)`). Calling this on a non-terminal state is a programming
    /// error.
    fn payoff(&self, player: Player) -> Payoff;

    /// Draw one chance action according to `probas`' weights. Used only by
    /// Monte-Carlo sampling kernels that sample chance directly from the
    /// game rather than enumerating it from the tree.
    fn sample_action(&self) -> Self::Action;

    /// Static, pure: replay `state`'s history and return the sequence of
    /// `(InfoSet, Action)` pairs `player` actually faced along the way.
    /// Used only by best response to reconstruct per-state reach.
    fn info_sets_and_actions(state: State, player: Player) -> Vec<(InfoSet, Self::Action)>;

    /// Static, pure: the probability chance alone assigns to reaching
    /// `state`, ignoring both players' strategies.
    fn chance_reach_proba(state: State) -> f64;
}
