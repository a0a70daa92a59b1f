//! State identifiers, bitset state sets and per-state auxiliary maps.

use fixedbitset::FixedBitSet;
use std::fmt;

/// A state identifier represented as a u32.
pub type StateId = u32;

/// A set of states implemented using a growable bit set.
///
/// Two sets with the same members compare equal regardless of the capacity they
/// were created with; use [`StateSet::to_vec`] when a canonical key is needed.
#[derive(Clone, Default)]
pub struct StateSet {
    bits: FixedBitSet,
}

impl StateSet {
    /// Create a new empty state set with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(capacity),
        }
    }

    /// Create a state set containing a single state.
    pub fn singleton(state: StateId, capacity: usize) -> Self {
        let mut set = Self::with_capacity(capacity);
        set.insert(state);
        set
    }

    /// Insert a state. Returns `true` if it was not already present.
    pub fn insert(&mut self, state: StateId) -> bool {
        let idx = state as usize;
        if idx >= self.bits.len() {
            self.bits.grow(idx + 1);
        }
        !self.bits.put(idx)
    }

    /// Check if the set contains a state.
    pub fn contains(&self, state: StateId) -> bool {
        let idx = state as usize;
        idx < self.bits.len() && self.bits.contains(idx)
    }

    /// Remove a state. Returns `true` if it was present.
    pub fn remove(&mut self, state: StateId) -> bool {
        let idx = state as usize;
        if idx < self.bits.len() && self.bits.contains(idx) {
            self.bits.set(idx, false);
            true
        } else {
            false
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Iterate over all states in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.bits.ones().map(|i| i as StateId)
    }

    /// Union this set with another, modifying self in place.
    pub fn union_with(&mut self, other: &StateSet) {
        if other.bits.len() > self.bits.len() {
            self.bits.grow(other.bits.len());
        }
        self.bits.union_with(&other.bits);
    }

    /// Check if this set intersects with another.
    pub fn intersects(&self, other: &StateSet) -> bool {
        self.bits.intersection(&other.bits).next().is_some()
    }

    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Sorted member list, used as a canonical hashable key.
    pub fn to_vec(&self) -> Vec<StateId> {
        self.iter().collect()
    }
}

impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for StateSet {}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut set = Self::default();
        for state in iter {
            set.insert(state);
        }
        set
    }
}

impl Extend<StateId> for StateSet {
    fn extend<I: IntoIterator<Item = StateId>>(&mut self, iter: I) {
        for state in iter {
            self.insert(state);
        }
    }
}

/// An auxiliary map keyed by state, backed by a dense vector.
///
/// Used for discovery marks during traversals, old-to-new maps during copies and
/// class assignments during minimization.
#[derive(Debug, Clone)]
pub struct StateMap<V> {
    slots: Vec<Option<V>>,
}

impl<V> StateMap<V> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots }
    }

    pub fn get(&self, state: StateId) -> Option<&V> {
        self.slots.get(state as usize).and_then(Option::as_ref)
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.get(state).is_some()
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, state: StateId, value: V) -> Option<V> {
        let idx = state as usize;
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        self.slots[idx].replace(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &V)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|v| (idx as StateId, v)))
    }
}

impl<V> Default for StateMap<V> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}
