//! Opaque small identifiers shared across the Game contract and the core.
//!
//! `State` and `InfoSet` are bit-packed values produced by a concrete game;
//! the core never interprets their bits, only hashes/orders/copies them.
//! `Payoff` is the signed terminal payoff in the smallest stake unit.

/// Bit-packed identifier of a concrete game history (includes private
/// information of both players). Used only to key per-state data in C7.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct State(pub u64);

/// Bit-packed identifier of what the acting player knows: private
/// information plus public history. Distinct `State`s can share one
/// `InfoSet`, which is what makes the game imperfect-information.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InfoSet(pub u64);

/// Signed payoff in the smallest stake unit, from P1's perspective.
pub type Payoff = i32;

/// A small, copyable action code. Actions at chance nodes and player nodes
/// share this value space but are never compared across node kinds.
///
/// Implementors are expected to be thin newtypes (following the same
/// `Edge <-> u64` bit-packing idiom used elsewhere in this crate) so the
/// tree can store action labels as plain `u16`s without depending on any
/// particular game's action enum.
pub trait GameAction:
    Copy + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + From<u16> + Into<u16>
{
}

impl<T> GameAction for T where
    T: Copy + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + From<u16> + Into<u16>
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_and_infoset_are_distinguishable_wrappers() {
        let s = State(42);
        let i = InfoSet(42);
        assert_eq!(s.0, i.0);
        assert_ne!(std::mem::size_of_val(&s), 0);
    }
}
