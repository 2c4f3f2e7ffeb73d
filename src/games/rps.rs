//! Rock-Paper-Scissors modeled as a two-move extensive-form game: P1 moves
//! first, P2 moves second without observing P1's action. Mirrors the
//! `mccfr::rps` module's shape (`RpsGame`/`RpsTurn`/`RpsEdge`), which encodes
//! the same simultaneity trick by chaining P1 then P2 and denying P2 any
//! information about P1's move.
//!
//! State numbering follows that same scheme: 0 is the root, 1..=3 are P1's
//! three possible moves, 4..=12 are the nine terminal outcomes.

use crate::game::Game;
use crate::ids::{InfoSet, Payoff, State};
use crate::player::Player;

const ROCK: u16 = 0;
const PAPER: u16 = 1;
const SCISSORS: u16 = 2;

/// P2's info set is the same constant regardless of which of the three
/// branches P1 took: P2 genuinely lacks information about P1's prior move,
/// which is the entire point of this encoding: P2 must move without
/// observing P1's choice.
const P1_INFO: InfoSet = InfoSet(0);
const P2_INFO: InfoSet = InfoSet(1);

#[derive(Debug, Clone)]
pub struct Rps {
    state: u8,
    history: Vec<u8>,
}

impl Default for Rps {
    fn default() -> Self {
        Self {
            state: 0,
            history: Vec::new(),
        }
    }
}

impl Rps {
    fn decode(state: u8) -> (Option<u16>, Option<u16>) {
        match state {
            0 => (None, None),
            1..=3 => (Some((state - 1) as u16), None),
            4..=12 => {
                let idx = (state - 4) as u16;
                (Some(idx / 3), Some(idx % 3))
            }
            _ => unreachable!("invalid rps state {state}"),
        }
    }
}

impl Game for Rps {
    type Action = u16;

    const MAX_PLAYER_ACTIONS: usize = 3;
    const MAX_CHANCE_ACTIONS: usize = 1;

    fn reset(&mut self) {
        self.state = 0;
        self.history.clear();
    }

    fn get_state(&self) -> State {
        State(self.state as u64)
    }

    fn set_state(&mut self, state: State) {
        self.state = state.0 as u8;
        self.history.clear();
    }

    fn get_info_set(&self, player: Player) -> InfoSet {
        match player {
            Player::P1 => P1_INFO,
            Player::P2 => P2_INFO,
            Player::Chance => unreachable!("rps has no chance decisions"),
        }
    }

    fn current_player(&self) -> Player {
        match self.state {
            0 => Player::P1,
            1..=3 => Player::P2,
            _ => unreachable!("current_player queried on terminal state"),
        }
    }

    fn game_over(&self) -> bool {
        self.state >= 4
    }

    fn actions(&self, out: &mut [Self::Action]) -> usize {
        out[0] = ROCK;
        out[1] = PAPER;
        out[2] = SCISSORS;
        3
    }

    fn probas(&self, _out: &mut [u32]) -> usize {
        unreachable!("rps has no chance nodes")
    }

    fn play(&mut self, action: Self::Action) {
        self.history.push(self.state);
        self.state = match self.state {
            0 => 1 + action as u8,
            1..=3 => 4 + (self.state - 1) * 3 + action as u8,
            _ => unreachable!("play called on terminal state"),
        };
    }

    fn undo(&mut self, _action: Self::Action) {
        self.state = self
            .history
            .pop()
            .expect("undo called with empty history");
    }

    fn payoff(&self, player: Player) -> Payoff {
        let (a1, a2) = Self::decode(self.state);
        let (a1, a2) = (
            a1.expect("payoff queried before P1 acted"),
            a2.expect("payoff queried before P2 acted"),
        );
        // (a2 - a1) mod 3 == 1 means a2 beats a1 (R->P->S->R cycle).
        let diff = (a2 as i32 - a1 as i32).rem_euclid(3);
        let p1 = match diff {
            0 => 0,
            1 => -1,
            2 => 1,
            _ => unreachable!(),
        };
        match player {
            Player::P1 => p1,
            Player::P2 => -p1,
            Player::Chance => unreachable!("chance has no payoff"),
        }
    }

    fn sample_action(&self) -> Self::Action {
        unreachable!("rps has no chance nodes to sample")
    }

    fn info_sets_and_actions(state: State, player: Player) -> Vec<(InfoSet, Self::Action)> {
        let (a1, a2) = Self::decode(state.0 as u8);
        match player {
            Player::P1 => a1.map(|a| vec![(P1_INFO, a)]).unwrap_or_default(),
            Player::P2 => a2.map(|a| vec![(P2_INFO, a)]).unwrap_or_default(),
            Player::Chance => unreachable!(),
        }
    }

    fn chance_reach_proba(_state: State) -> f64 {
        1.0
    }
}

impl crate::Arbitrary for Rps {
    fn random() -> Self {
        super::random_playout(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_undo_round_trips() {
        let mut g = Rps::default();
        let before = g.get_state();
        g.play(ROCK);
        g.undo(ROCK);
        assert_eq!(g.get_state(), before);
    }

    #[test]
    fn zero_sum_across_all_outcomes() {
        for a1 in [ROCK, PAPER, SCISSORS] {
            for a2 in [ROCK, PAPER, SCISSORS] {
                let mut g = Rps::default();
                g.play(a1);
                g.play(a2);
                assert_eq!(g.payoff(Player::P1), -g.payoff(Player::P2));
            }
        }
    }

    #[test]
    fn rock_beats_scissors() {
        let mut g = Rps::default();
        g.play(ROCK);
        g.play(SCISSORS);
        assert_eq!(g.payoff(Player::P1), 1);
    }

    #[test]
    fn p2_info_set_is_constant_across_p1_branches() {
        for a1 in [ROCK, PAPER, SCISSORS] {
            let mut g = Rps::default();
            g.play(a1);
            assert_eq!(g.get_info_set(Player::P2), P2_INFO);
        }
    }
}
