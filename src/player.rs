//! The three node kinds in the extensive-form game tree.

/// A node belongs to exactly one of these. `Chance` nodes have no strategy
/// and accumulate no regret; they exist only to fan out by fixed weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Player {
    P1 = 0,
    P2 = 1,
    Chance = 2,
}

impl Player {
    /// The other seated player. Panics if called on `Chance`, which has no
    /// opponent; callers must never ask a chance node for one.
    pub fn opponent(self) -> Player {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
            Player::Chance => unreachable!("chance has no opponent"),
        }
    }

    pub(crate) fn from_tag(tag: u32) -> Player {
        match tag {
            0 => Player::P1,
            1 => Player::P2,
            2 => Player::Chance,
            other => unreachable!("invalid player tag {other}"),
        }
    }

    pub(crate) fn tag(self) -> u32 {
        self as u32
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::P1 => write!(f, "P1"),
            Player::P2 => write!(f, "P2"),
            Player::Chance => write!(f, "Chance"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_swaps_seats() {
        assert_eq!(Player::P1.opponent(), Player::P2);
        assert_eq!(Player::P2.opponent(), Player::P1);
    }

    #[test]
    #[should_panic]
    fn chance_has_no_opponent() {
        let _ = Player::Chance.opponent();
    }

    #[test]
    fn tag_round_trips() {
        for p in [Player::P1, Player::P2, Player::Chance] {
            assert_eq!(Player::from_tag(p.tag()), p);
        }
    }
}
