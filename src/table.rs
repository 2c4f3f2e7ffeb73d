//! The info-set table: cache-aligned, concurrently-mutable storage for
//! regrets and cumulative strategy. Replaces a `BTreeMap<Bucket, Strategy>`
//! (the shape `mccfr/profile.rs` uses) with a flat-array layout (see the
//! `FlatCfr`/`DCFRTrainer` examples) so many solver threads can read and
//! update it without a global lock.
//!
//! Each distinct player `InfoSet` gets one cache-line-aligned `Entry`
//! holding `2 * MAX_PLAYER_ACTIONS` atomic `f32` slots: the first half is
//! regrets, the second half cumulative strategy. A single `AtomicBool`
//! busy-bit gives `accumulate` mutual exclusion; the regret/strategy slots
//! themselves are plain atomics so unlocked reads (vanilla/Linear/DCFR) can
//! never observe a torn `f32`, only, at worst, a stale one.

use crate::ids::InfoSet;
use crate::tree::{NodeIndex, Tree, KIND_CHANCE};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Upper bound on actions at any player node, and the fixed width of every
/// `Entry`'s regret/strategy halves.
pub const MAX_PLAYER_ACTIONS: usize = 7;

const _: () = assert!(MAX_PLAYER_ACTIONS > 0 && MAX_PLAYER_ACTIONS <= u8::MAX as usize);

/// One info set's regrets and cumulative strategy, cache-line aligned so
/// adjacent entries never share a cache line (no false sharing between
/// unrelated info sets under concurrent access).
#[repr(align(64))]
pub struct Entry {
    busy: AtomicBool,
    n: u8,
    // [0..n)          regrets
    // [MAX..MAX+n)    cumulative strategy
    data: [AtomicU32; 2 * MAX_PLAYER_ACTIONS],
}

impl Entry {
    fn new(n: usize) -> Self {
        assert!(n <= MAX_PLAYER_ACTIONS, "fan-out {n} exceeds MAX_PLAYER_ACTIONS");
        Self {
            busy: AtomicBool::new(false),
            n: n as u8,
            data: std::array::from_fn(|_| AtomicU32::new(0f32.to_bits())),
        }
    }

    #[inline]
    fn n(&self) -> usize {
        self.n as usize
    }

    #[inline]
    fn load(&self, i: usize) -> f32 {
        f32::from_bits(self.data[i].load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, i: usize, v: f32) {
        self.data[i].store(v.to_bits(), Ordering::Relaxed);
    }

    /// Test-and-test-and-set: spin on a plain relaxed load while the flag
    /// reads busy, and only attempt the (cache-line-exclusive) CAS once it
    /// reads free. Attempting the CAS on every spin would keep the line in
    /// exclusive state on every contending core, ping-ponging it around the
    /// cache; the relaxed load lets contenders spin on a shared, cached
    /// copy instead.
    fn lock(&self) {
        loop {
            if !self.busy.load(Ordering::Relaxed)
                && self
                    .busy
                    .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
            {
                return;
            }
            std::hint::spin_loop();
        }
    }

    fn unlock(&self) {
        self.busy.store(false, Ordering::Release);
    }

    /// Regret-matching: positive part of regrets, normalized; uniform
    /// fallback when every regret is non-positive.
    fn regret_matching(&self, out: &mut [f32]) {
        let n = self.n();
        let mut total = 0.0f32;
        for i in 0..n {
            let r = self.load(i).max(0.0);
            out[i] = r;
            total += r;
        }
        if total > 0.0 {
            for v in out[..n].iter_mut() {
                *v /= total;
            }
        } else {
            let uniform = 1.0 / n as f32;
            for v in out[..n].iter_mut() {
                *v = uniform;
            }
        }
    }

    /// Current strategy without acquiring the spinlock: tolerated by every
    /// variant except CFR+, whose post-accumulation clamp means an unlocked
    /// reader could otherwise observe a pre-clamp negative regret.
    pub fn current_strategy_unlocked(&self, out: &mut [f32]) {
        self.regret_matching(out);
    }

    pub fn current_strategy_locked(&self, out: &mut [f32]) {
        self.lock();
        self.regret_matching(out);
        self.unlock();
    }

    /// Add `regret_delta`/`strategy_delta` (length `n`) under the spinlock.
    /// When `clamp_regret` is set (CFR+), regrets are floored at 0 after the
    /// add.
    pub fn accumulate(&self, regret_delta: &[f32], strategy_delta: &[f32], clamp_regret: bool) {
        let n = self.n();
        debug_assert_eq!(regret_delta.len(), n);
        debug_assert_eq!(strategy_delta.len(), n);
        self.lock();
        for i in 0..n {
            let mut r = self.load(i) + regret_delta[i];
            if clamp_regret {
                r = r.max(0.0);
            }
            debug_assert!(r.is_finite(), "regret diverged to {r}");
            self.store(i, r);

            let s_idx = MAX_PLAYER_ACTIONS + i;
            let s = self.load(s_idx) + strategy_delta[i];
            debug_assert!(s.is_finite(), "cumulative strategy diverged to {s}");
            self.store(s_idx, s);
        }
        self.unlock();
    }

    /// Average strategy: normalize the cumulative-strategy half; uniform
    /// fallback when the sum is zero (never visited, or visited with zero
    /// reach throughout).
    pub fn average_strategy(&self, out: &mut [f32]) {
        let n = self.n();
        let mut total = 0.0f32;
        for i in 0..n {
            let s = self.load(MAX_PLAYER_ACTIONS + i);
            out[i] = s;
            total += s;
        }
        if total > 0.0 {
            for v in out[..n].iter_mut() {
                *v /= total;
            }
        } else {
            let uniform = 1.0 / n as f32;
            for v in out[..n].iter_mut() {
                *v = uniform;
            }
        }
    }
}

/// Owns one `Entry` per distinct player `InfoSet` plus the
/// node-index-to-slot indirection built alongside the tree.
pub struct InfoTable {
    entries: Vec<Entry>,
    slot_of_infoset: HashMap<InfoSet, u32>,
    node_to_slot: Vec<u32>,
}

const NO_SLOT: u32 = u32::MAX;

impl InfoTable {
    pub fn build(tree: &Tree) -> Self {
        let mut slot_of_infoset: HashMap<InfoSet, u32> = HashMap::new();
        let mut entries: Vec<Entry> = Vec::new();
        let mut node_to_slot = vec![NO_SLOT; tree.len()];

        for node in 0..tree.len() as NodeIndex {
            if tree.kind(node) == KIND_CHANCE || tree.is_terminal(node) {
                continue;
            }
            let info = tree.infoset(node);
            let n = tree.fan_out(node) as usize;
            let slot = *slot_of_infoset.entry(info).or_insert_with(|| {
                entries.push(Entry::new(n));
                (entries.len() - 1) as u32
            });
            assert_eq!(
                entries[slot as usize].n(),
                n,
                "info set {info:?} observed with differing fan-out across nodes"
            );
            node_to_slot[node as usize] = slot;
        }

        Self {
            entries,
            slot_of_infoset,
            node_to_slot,
        }
    }

    #[inline]
    pub fn slot_of(&self, node: NodeIndex) -> u32 {
        let slot = self.node_to_slot[node as usize];
        debug_assert_ne!(slot, NO_SLOT, "node {node} has no info-set slot (chance or terminal)");
        slot
    }

    pub fn slot_for_infoset(&self, info: InfoSet) -> Option<u32> {
        self.slot_of_infoset.get(&info).copied()
    }

    #[inline]
    pub fn n_actions(&self, slot: u32) -> usize {
        self.entries[slot as usize].n()
    }

    #[inline]
    pub fn entry(&self, slot: u32) -> &Entry {
        &self.entries[slot as usize]
    }

    pub fn num_info_sets(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::rps::Rps;
    use crate::tree::Tree;

    #[test]
    fn fresh_entry_is_uniform() {
        let e = Entry::new(3);
        let mut out = [0.0f32; MAX_PLAYER_ACTIONS];
        e.current_strategy_unlocked(&mut out[..3]);
        for &v in &out[..3] {
            assert!((v - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn accumulate_shifts_regret_matching() {
        let e = Entry::new(2);
        e.accumulate(&[5.0, -1.0], &[0.0, 0.0], false);
        let mut out = [0.0f32; MAX_PLAYER_ACTIONS];
        e.current_strategy_unlocked(&mut out[..2]);
        assert!((out[0] - 1.0).abs() < 1e-6);
        assert!(out[1] < 1e-6);
    }

    #[test]
    fn cfr_plus_clamps_negative_regret() {
        let e = Entry::new(2);
        e.accumulate(&[5.0, -10.0], &[0.0, 0.0], true);
        e.accumulate(&[-20.0, 1.0], &[0.0, 0.0], true);
        // action 0: 5 - 20 clamped to 0 each step -> max(5-20,0)=0
        // action 1: max(-10,0)=0, then 0+1=1
        let mut out = [0.0f32; MAX_PLAYER_ACTIONS];
        e.current_strategy_unlocked(&mut out[..2]);
        assert!(out[0] < 1e-6);
        assert!((out[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn table_dedupes_same_infoset_into_one_slot() {
        let tree = Tree::build(Rps::default());
        let table = InfoTable::build(&tree);
        // P2 acts at three distinct nodes that share one InfoSet (see
        // games::rps), so they must collapse into a single slot.
        let p2_nodes: Vec<NodeIndex> = (0..tree.len() as NodeIndex)
            .filter(|&n| tree.kind(n) == crate::tree::KIND_P2)
            .collect();
        assert_eq!(p2_nodes.len(), 3);
        let slots: std::collections::HashSet<u32> =
            p2_nodes.iter().map(|&n| table.slot_of(n)).collect();
        assert_eq!(slots.len(), 1);
    }
}
