//! No-raise Leduc hold'em: a 6-card deck (two copies each of ranks `J, Q,
//! K` = `0, 1, 2`), one private card per player, two betting rounds
//! separated by a single public board card, ante 1, bet size 2 preflop and
//! 4 postflop. "No-raise" means each betting round is a single
//! pass/bet-then-fold/call exchange (at most three actions, exactly
//! Kuhn's shape) with no further re-raising.
//!
//! Built directly from the standard Leduc extensive form (Southey et al.
//! 2005) restricted to a no-raise betting shape, reusing Kuhn's
//! pass/bet/fold/call accounting idiom for each street.

use crate::game::Game;
use crate::ids::{InfoSet, Payoff, State};
use crate::player::Player;

pub const PASS: u16 = 0;
pub const BET: u16 = 1;

const UNDEALT: u8 = 3;
const PREFLOP_BET: i32 = 2;
const POSTFLOP_BET: i32 = 4;

/// All nine ordered `(p1_rank, p2_rank)` combinations from a 2-copies-per-
/// rank, 6-card deck. Weight is the number of ways to draw two distinct
/// physical cards yielding that ordered rank pair: 4 when the ranks
/// differ (2 choices per rank), 2 when they match (2 remaining copies of
/// the same rank, ordered).
const DEALS: [(u8, u8); 9] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (1, 0),
    (1, 1),
    (1, 2),
    (2, 0),
    (2, 1),
    (2, 2),
];

fn deal_weight(c1: u8, c2: u8) -> u32 {
    if c1 == c2 {
        2
    } else {
        4
    }
}

/// Remaining copies of `rank` in the deck once `c1`/`c2` have been dealt.
fn remaining(rank: u8, c1: u8, c2: u8) -> u32 {
    2 - (c1 == rank) as u32 - (c2 == rank) as u32
}

/// The five two-or-three-action betting patterns shared by both streets,
/// enumerated so histories can be packed into a small integer. Index 0 is
/// the empty (not-yet-acted) prefix.
const PATTERNS: [&[u16]; 9] = [
    &[],
    &[PASS],
    &[BET],
    &[PASS, PASS],
    &[PASS, BET],
    &[BET, PASS],
    &[BET, BET],
    &[PASS, BET, PASS],
    &[PASS, BET, BET],
];

fn pattern_index(history: &[u16]) -> usize {
    PATTERNS
        .iter()
        .position(|p| *p == history)
        .unwrap_or_else(|| unreachable!("no pattern matches history {history:?}"))
}

fn round_is_closing(history: &[u16]) -> bool {
    matches!(
        history,
        [PASS, PASS] | [BET, PASS] | [BET, BET] | [PASS, BET, PASS] | [PASS, BET, BET]
    )
}

fn round_folded(history: &[u16]) -> bool {
    matches!(history, [BET, PASS] | [PASS, BET, PASS])
}

/// Contribution delta applied by a completed (non-fold) round of size
/// `bet`: `[pass, pass]` adds nothing; any completed bet/call line adds
/// `bet` to both players.
fn round_contribution(history: &[u16], bet: i32) -> (i32, i32) {
    match history {
        [PASS, PASS] => (0, 0),
        [BET, BET] | [PASS, BET, BET] => (bet, bet),
        _ => unreachable!("round_contribution called on a non-closing history"),
    }
}

#[derive(Debug, Clone)]
pub struct Leduc {
    c1: u8,
    c2: u8,
    board: u8,
    round1: Vec<u16>,
    round2: Vec<u16>,
}

impl Default for Leduc {
    fn default() -> Self {
        Self::new()
    }
}

impl Leduc {
    fn new() -> Self {
        Self {
            c1: UNDEALT,
            c2: UNDEALT,
            board: UNDEALT,
            round1: Vec::new(),
            round2: Vec::new(),
        }
    }

    fn dealt(&self) -> bool {
        self.c1 != UNDEALT
    }

    fn board_dealt(&self) -> bool {
        self.board != UNDEALT
    }

    fn round1_open(&self) -> bool {
        self.dealt() && !round_is_closing(&self.round1)
    }

    fn round2_open(&self) -> bool {
        self.board_dealt() && !round_is_closing(&self.round2)
    }

    /// P1's net payoff for a completed hand: ante/bet contributions plus
    /// either a fold award or a showdown comparison.
    fn settle(&self) -> i32 {
        let mut contributed = [1i32, 1i32]; // ante

        if round_folded(&self.round1) {
            let folder = if self.round1 == [BET, PASS] { 1 } else { 0 };
            let (p1, p2) = round_fold_contribution(&self.round1, PREFLOP_BET);
            contributed[0] += p1;
            contributed[1] += p2;
            return payoff_from_fold(folder, contributed);
        }
        let (d1, d2) = round_contribution(&self.round1, PREFLOP_BET);
        contributed[0] += d1;
        contributed[1] += d2;

        if round_folded(&self.round2) {
            let folder = if self.round2 == [BET, PASS] { 1 } else { 0 };
            let (p1, p2) = round_fold_contribution(&self.round2, POSTFLOP_BET);
            contributed[0] += p1;
            contributed[1] += p2;
            return payoff_from_fold(folder, contributed);
        }
        let (d1, d2) = round_contribution(&self.round2, POSTFLOP_BET);
        contributed[0] += d1;
        contributed[1] += d2;

        let p1_pairs = self.c1 == self.board;
        let p2_pairs = self.c2 == self.board;
        let winner = match (p1_pairs, p2_pairs) {
            (true, false) => 1,
            (false, true) => -1,
            _ => {
                if self.c1 > self.c2 {
                    1
                } else if self.c2 > self.c1 {
                    -1
                } else {
                    0
                }
            }
        };
        match winner {
            1 => contributed[1],
            -1 => -contributed[0],
            _ => 0,
        }
    }
}

/// Contribution added by the player who acted first in a fold-ending
/// round (`bet, pass` contributes `bet` to the bettor only; `pass, bet,
/// pass` contributes `bet` to the second actor only).
fn round_fold_contribution(history: &[u16], bet: i32) -> (i32, i32) {
    match history {
        [BET, PASS] => (bet, 0),
        [PASS, BET, PASS] => (0, bet),
        _ => unreachable!("round_fold_contribution called on a non-fold history"),
    }
}

fn payoff_from_fold(folder: usize, contributed: [i32; 2]) -> i32 {
    if folder == 0 {
        -contributed[0]
    } else {
        contributed[1]
    }
}

impl Game for Leduc {
    type Action = u16;

    const MAX_PLAYER_ACTIONS: usize = 2;
    const MAX_CHANCE_ACTIONS: usize = 9;

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn get_state(&self) -> State {
        let r1 = pattern_index(&self.round1) as u64;
        let r2 = pattern_index(&self.round2) as u64;
        State(self.c1 as u64 | ((self.c2 as u64) << 2) | ((self.board as u64) << 4) | (r1 << 6) | (r2 << 10))
    }

    fn set_state(&mut self, state: State) {
        self.c1 = (state.0 & 0b11) as u8;
        self.c2 = ((state.0 >> 2) & 0b11) as u8;
        self.board = ((state.0 >> 4) & 0b11) as u8;
        self.round1 = PATTERNS[((state.0 >> 6) & 0b1111) as usize].to_vec();
        self.round2 = PATTERNS[((state.0 >> 10) & 0b1111) as usize].to_vec();
    }

    fn get_info_set(&self, player: Player) -> InfoSet {
        let own = match player {
            Player::P1 => self.c1,
            Player::P2 => self.c2,
            Player::Chance => unreachable!("chance has no info set"),
        };
        let r1 = pattern_index(&self.round1) as u64;
        let r2 = pattern_index(&self.round2) as u64;
        InfoSet(own as u64 | ((self.board as u64) << 2) | (r1 << 4) | (r2 << 8))
    }

    fn current_player(&self) -> Player {
        if !self.dealt() {
            Player::Chance
        } else if self.round1_open() {
            if self.round1.len() % 2 == 0 {
                Player::P1
            } else {
                Player::P2
            }
        } else if !self.board_dealt() {
            Player::Chance
        } else if self.round2_open() {
            if self.round2.len() % 2 == 0 {
                Player::P1
            } else {
                Player::P2
            }
        } else {
            unreachable!("current_player queried on terminal state")
        }
    }

    fn game_over(&self) -> bool {
        if !self.dealt() {
            return false;
        }
        if round_folded(&self.round1) {
            return true;
        }
        if !self.round1_open() {
            if !self.board_dealt() {
                return false;
            }
            if round_folded(&self.round2) {
                return true;
            }
            return !self.round2_open();
        }
        false
    }

    fn actions(&self, out: &mut [Self::Action]) -> usize {
        if !self.dealt() {
            for i in 0..DEALS.len() {
                out[i] = i as u16;
            }
            DEALS.len()
        } else if self.round1_open() {
            out[0] = PASS;
            out[1] = BET;
            2
        } else if !self.board_dealt() {
            let mut n = 0;
            for rank in 0u16..3 {
                if remaining(rank as u8, self.c1, self.c2) > 0 {
                    out[n] = rank;
                    n += 1;
                }
            }
            n
        } else {
            out[0] = PASS;
            out[1] = BET;
            2
        }
    }

    fn probas(&self, out: &mut [u32]) -> usize {
        if !self.dealt() {
            for (i, &(a, b)) in DEALS.iter().enumerate() {
                out[i] = deal_weight(a, b);
            }
            DEALS.len()
        } else {
            assert!(
                !self.board_dealt() && !self.round1_open(),
                "probas called on a non-chance node"
            );
            let mut n = 0;
            for rank in 0u16..3 {
                let w = remaining(rank as u8, self.c1, self.c2);
                if w > 0 {
                    out[n] = w;
                    n += 1;
                }
            }
            n
        }
    }

    fn play(&mut self, action: Self::Action) {
        if !self.dealt() {
            let (a, b) = DEALS[action as usize];
            self.c1 = a;
            self.c2 = b;
        } else if self.round1_open() {
            self.round1.push(action);
        } else if !self.board_dealt() {
            self.board = action as u8;
        } else {
            self.round2.push(action);
        }
    }

    fn undo(&mut self, action: Self::Action) {
        if !self.round2.is_empty() {
            assert_eq!(self.round2.pop(), Some(action));
        } else if self.board_dealt() {
            assert_eq!(self.board as u16, action);
            self.board = UNDEALT;
        } else if !self.round1.is_empty() {
            assert_eq!(self.round1.pop(), Some(action));
        } else {
            let idx = DEALS
                .iter()
                .position(|&(a, b)| a == self.c1 && b == self.c2)
                .expect("undo called on an undealt state");
            assert_eq!(idx as u16, action);
            self.c1 = UNDEALT;
            self.c2 = UNDEALT;
        }
    }

    fn payoff(&self, player: Player) -> Payoff {
        let p1 = self.settle();
        match player {
            Player::P1 => p1,
            Player::P2 => -p1,
            Player::Chance => unreachable!("chance has no payoff"),
        }
    }

    fn sample_action(&self) -> Self::Action {
        use rand::Rng;
        let mut buf = [0u32; 9];
        let n = self.probas(&mut buf);
        let total: u32 = buf[..n].iter().sum();
        let mut x = crate::rng::thread_local_rng().random_range(0..total);
        for (i, &w) in buf[..n].iter().enumerate() {
            if x < w {
                return i as u16;
            }
            x -= w;
        }
        unreachable!("sample_action: weights did not cover the draw")
    }

    fn info_sets_and_actions(state: State, player: Player) -> Vec<(InfoSet, Self::Action)> {
        let c1 = (state.0 & 0b11) as u8;
        let c2 = ((state.0 >> 2) & 0b11) as u8;
        let board = ((state.0 >> 4) & 0b11) as u8;
        let round1 = PATTERNS[((state.0 >> 6) & 0b1111) as usize].to_vec();
        let round2 = PATTERNS[((state.0 >> 10) & 0b1111) as usize].to_vec();
        let own = if player == Player::P1 { c1 } else { c2 };
        let start = if player == Player::P1 { 0 } else { 1 };

        let mut out = Vec::new();
        let mut i = start;
        while i < round1.len() {
            let prefix = &round1[..i];
            let info = InfoSet(
                own as u64 | ((UNDEALT as u64) << 2) | ((pattern_index(prefix) as u64) << 4),
            );
            out.push((info, round1[i]));
            i += 2;
        }
        let mut j = start;
        while j < round2.len() {
            let prefix = &round2[..j];
            let info = InfoSet(
                own as u64
                    | ((board as u64) << 2)
                    | ((pattern_index(&round1) as u64) << 4)
                    | ((pattern_index(prefix) as u64) << 8),
            );
            out.push((info, round2[j]));
            j += 2;
        }
        out
    }

    fn chance_reach_proba(state: State) -> f64 {
        let c1 = (state.0 & 0b11) as u8;
        let c2 = ((state.0 >> 2) & 0b11) as u8;
        let board = ((state.0 >> 4) & 0b11) as u8;
        let deal_p = deal_weight(c1, c2) as f64 / 30.0;
        if board == UNDEALT {
            deal_p
        } else {
            deal_p * (remaining(board, c1, c2) as f64 / 4.0)
        }
    }
}

impl crate::Arbitrary for Leduc {
    fn random() -> Self {
        super::random_playout(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_undo_round_trips_across_both_streets() {
        let mut g = Leduc::default();
        let s0 = g.get_state();
        g.play(1); // deal index 1 => (J, K)
        let s1 = g.get_state();
        g.play(PASS);
        g.play(PASS);
        let s2 = g.get_state();
        let mut bufacts = [0u16; 9];
        let n = g.actions(&mut bufacts);
        assert!(n > 0);
        g.play(bufacts[0]);
        g.undo(bufacts[0]);
        assert_eq!(g.get_state(), s2);
        g.undo(PASS);
        g.undo(PASS);
        assert_eq!(g.get_state(), s1);
        g.undo(1);
        assert_eq!(g.get_state(), s0);
    }

    #[test]
    fn zero_sum_preflop_fold() {
        let mut g = Leduc::default();
        g.play(1);
        g.play(BET);
        g.play(PASS);
        assert!(g.game_over());
        assert_eq!(g.payoff(Player::P1), -g.payoff(Player::P2));
        // P1 bet, P2 folded: P1 wins only P2's forfeited ante.
        assert_eq!(g.payoff(Player::P1), 1);
    }

    #[test]
    fn showdown_board_pair_beats_higher_kicker() {
        // P1 has J, P2 has K, board pairs P1's jack: P1 wins despite the
        // lower private rank.
        let mut g = Leduc::default();
        g.c1 = 0;
        g.c2 = 2;
        g.round1 = vec![PASS, PASS];
        g.board = 0;
        g.round2 = vec![PASS, PASS];
        assert!(g.game_over());
        assert_eq!(g.payoff(Player::P1), 1);
    }

    #[test]
    fn chance_probabilities_sum_to_one_for_root_deal() {
        let g = Leduc::default();
        let mut w = [0u32; 9];
        let n = g.probas(&mut w);
        let total: u32 = w[..n].iter().sum();
        assert_eq!(total, 30);
    }
}
