//! Three-card Kuhn poker: deck `{J, Q, K}` (ranks `0, 1, 2`), one private
//! card dealt to each player, a single betting round of at most three
//! actions (`pass`/`bet`, reusing poker's check-or-fold / bet-or-call
//! overload exactly as real Kuhn poker does), ante 1, bet size 1.
//!
//! Built directly from the standard Kuhn poker extensive form used
//! throughout the CFR literature (Neller & Lanctot's tutorial pseudocode),
//! using its well-known equilibrium game value (`-1/18`) as the correctness
//! anchor.

use crate::game::Game;
use crate::ids::{InfoSet, Payoff, State};
use crate::player::Player;

pub const PASS: u16 = 0;
pub const BET: u16 = 1;

const UNDEALT: u8 = 3;

/// The six ordered `(p1_card, p2_card)` deals, equally likely (weight 1
/// each, normalized to `1/6`).
const DEALS: [(u8, u8); 6] = [
    (0, 1),
    (0, 2),
    (1, 0),
    (1, 2),
    (2, 0),
    (2, 1),
];

#[derive(Debug, Clone)]
pub struct Kuhn {
    c1: u8,
    c2: u8,
    history: Vec<u16>,
}

impl Default for Kuhn {
    fn default() -> Self {
        Self {
            c1: UNDEALT,
            c2: UNDEALT,
            history: Vec::new(),
        }
    }
}

impl Kuhn {
    fn dealt(&self) -> bool {
        self.c1 != UNDEALT
    }

    fn is_terminal_history(history: &[u16]) -> bool {
        matches!(
            history,
            [PASS, PASS] | [BET, PASS] | [BET, BET] | [PASS, BET, PASS] | [PASS, BET, BET]
        )
    }

    /// P1's net payoff in ante/bet units, given a completed hand.
    fn net_p1(&self) -> i32 {
        let showdown_wins_p1 = self.c1 > self.c2;
        match self.history.as_slice() {
            [PASS, PASS] => {
                if showdown_wins_p1 {
                    1
                } else {
                    -1
                }
            }
            [PASS, BET, PASS] => -1,
            [PASS, BET, BET] => {
                if showdown_wins_p1 {
                    2
                } else {
                    -2
                }
            }
            [BET, PASS] => 1,
            [BET, BET] => {
                if showdown_wins_p1 {
                    2
                } else {
                    -2
                }
            }
            other => unreachable!("incomplete or invalid kuhn history {other:?}"),
        }
    }

    fn encode_history(history: &[u16]) -> u64 {
        let mut bits = 0u64;
        for (i, &a) in history.iter().enumerate() {
            bits |= (a as u64) << (2 * i);
        }
        (history.len() as u64) | (bits << 3)
    }

    fn decode_history(bits: u64) -> Vec<u16> {
        let len = (bits & 0b111) as usize;
        let mut rest = bits >> 3;
        let mut history = Vec::with_capacity(len);
        for _ in 0..len {
            history.push((rest & 0b11) as u16);
            rest >>= 2;
        }
        history
    }
}

impl Game for Kuhn {
    type Action = u16;

    const MAX_PLAYER_ACTIONS: usize = 2;
    const MAX_CHANCE_ACTIONS: usize = 6;

    fn reset(&mut self) {
        self.c1 = UNDEALT;
        self.c2 = UNDEALT;
        self.history.clear();
    }

    fn get_state(&self) -> State {
        let hist = Self::encode_history(&self.history);
        State(self.c1 as u64 | ((self.c2 as u64) << 2) | (hist << 4))
    }

    fn set_state(&mut self, state: State) {
        self.c1 = (state.0 & 0b11) as u8;
        self.c2 = ((state.0 >> 2) & 0b11) as u8;
        self.history = Self::decode_history(state.0 >> 4);
    }

    fn get_info_set(&self, player: Player) -> InfoSet {
        let own = match player {
            Player::P1 => self.c1,
            Player::P2 => self.c2,
            Player::Chance => unreachable!("chance has no info set"),
        };
        let hist = Self::encode_history(&self.history);
        InfoSet(own as u64 | (hist << 2))
    }

    fn current_player(&self) -> Player {
        if !self.dealt() {
            Player::Chance
        } else if self.history.len() % 2 == 0 {
            Player::P1
        } else {
            Player::P2
        }
    }

    fn game_over(&self) -> bool {
        self.dealt() && Self::is_terminal_history(&self.history)
    }

    fn actions(&self, out: &mut [Self::Action]) -> usize {
        if !self.dealt() {
            for (i, _) in DEALS.iter().enumerate() {
                out[i] = i as u16;
            }
            DEALS.len()
        } else {
            out[0] = PASS;
            out[1] = BET;
            2
        }
    }

    fn probas(&self, out: &mut [u32]) -> usize {
        assert!(!self.dealt(), "probas called on a non-chance node");
        for w in out.iter_mut().take(DEALS.len()) {
            *w = 1;
        }
        DEALS.len()
    }

    fn play(&mut self, action: Self::Action) {
        if !self.dealt() {
            let (a, b) = DEALS[action as usize];
            self.c1 = a;
            self.c2 = b;
        } else {
            self.history.push(action);
        }
    }

    fn undo(&mut self, action: Self::Action) {
        if let Some(&last) = self.history.last() {
            assert_eq!(last, action, "undo: action/history mismatch");
            self.history.pop();
        } else {
            let idx = DEALS
                .iter()
                .position(|&(a, b)| a == self.c1 && b == self.c2)
                .expect("undo called on an undealt state");
            assert_eq!(idx as u16, action, "undo: deal action mismatch");
            self.c1 = UNDEALT;
            self.c2 = UNDEALT;
        }
    }

    fn payoff(&self, player: Player) -> Payoff {
        let p1 = self.net_p1();
        match player {
            Player::P1 => p1,
            Player::P2 => -p1,
            Player::Chance => unreachable!("chance has no payoff"),
        }
    }

    fn sample_action(&self) -> Self::Action {
        assert!(!self.dealt(), "sample_action called on a non-chance node");
        use rand::Rng;
        crate::rng::thread_local_rng().random_range(0..DEALS.len() as u16)
    }

    fn info_sets_and_actions(state: State, player: Player) -> Vec<(InfoSet, Self::Action)> {
        let c1 = (state.0 & 0b11) as u8;
        let c2 = ((state.0 >> 2) & 0b11) as u8;
        let history = Self::decode_history(state.0 >> 4);
        let own = if player == Player::P1 { c1 } else { c2 };
        let start = if player == Player::P1 { 0 } else { 1 };

        let mut out = Vec::new();
        let mut i = start;
        while i < history.len() {
            let prefix = &history[..i];
            let hist_bits = Self::encode_history(prefix);
            let info = InfoSet(own as u64 | (hist_bits << 2));
            out.push((info, history[i]));
            i += 2;
        }
        out
    }

    fn chance_reach_proba(_state: State) -> f64 {
        1.0 / DEALS.len() as f64
    }
}

impl crate::Arbitrary for Kuhn {
    fn random() -> Self {
        super::random_playout(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_undo_round_trips_through_deal_and_history() {
        let mut g = Kuhn::default();
        let s0 = g.get_state();
        g.play(0);
        let s1 = g.get_state();
        g.play(PASS);
        g.undo(PASS);
        assert_eq!(g.get_state(), s1);
        g.undo(0);
        assert_eq!(g.get_state(), s0);
    }

    #[test]
    fn zero_sum_every_terminal_history() {
        for &history in &[
            [PASS, PASS, u16::MAX],
            [BET, PASS, u16::MAX],
            [BET, BET, u16::MAX],
            [PASS, BET, PASS],
            [PASS, BET, BET],
        ] {
            let mut g = Kuhn::default();
            g.play(0);
            for &a in history.iter().filter(|&&a| a != u16::MAX) {
                g.play(a);
            }
            assert_eq!(g.payoff(Player::P1), -g.payoff(Player::P2));
        }
    }

    #[test]
    fn jack_never_wins_a_showdown_against_a_better_hand() {
        let mut g = Kuhn::default();
        // deal index 0 => (J, Q): P1 has the jack.
        g.play(0);
        g.play(PASS);
        g.play(PASS);
        assert_eq!(g.payoff(Player::P1), -1);
    }

    #[test]
    fn info_sets_and_actions_reconstructs_p1_path() {
        let mut g = Kuhn::default();
        g.play(0); // (J, Q)
        g.play(PASS);
        g.play(BET);
        g.play(PASS);
        let state = g.get_state();
        let path = Kuhn::info_sets_and_actions(state, Player::P1);
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].1, PASS);
    }
}
