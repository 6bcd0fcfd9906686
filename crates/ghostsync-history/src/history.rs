//! Bounded, ordered state history

use ghostsync_core::{PlayerSnapshot, UpdateNumber, Zone};

/// Maximum states retained per peer
pub const HISTORY_CAPACITY: usize = 20;

/// One received snapshot with its envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    /// Sender's update number
    pub update_number: UpdateNumber,
    /// Zone the sender was in
    pub zone: Zone,
    /// The pose
    pub snapshot: PlayerSnapshot,
}

impl State {
    /// Create a new state
    pub fn new(update_number: UpdateNumber, zone: Zone, snapshot: PlayerSnapshot) -> Self {
        Self {
            update_number,
            zone,
            snapshot,
        }
    }
}

/// States sorted ascending by update number, without duplicates
///
/// Once full, a state is only accepted if it is newer than the oldest one
/// retained; the oldest is then evicted to make room.
#[derive(Debug, Clone)]
pub struct StateHistory {
    /// Storage, oldest first
    states: Vec<State>,
    /// Capacity (max states)
    capacity: usize,
}

impl StateHistory {
    /// Create a new history with the given capacity
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        Self {
            states: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Whether a state with this update number would be kept
    pub fn can_insert(&self, update_number: UpdateNumber) -> bool {
        if self.contains(update_number) {
            return false;
        }
        match self.states.first() {
            Some(oldest) if self.is_full() => oldest.update_number < update_number,
            _ => true,
        }
    }

    /// Whether the update number is newer than every retained state
    pub fn is_newest(&self, update_number: UpdateNumber) -> bool {
        self.states
            .last()
            .map_or(true, |newest| newest.update_number < update_number)
    }

    /// Insert a state in order, evicting the oldest when over capacity
    ///
    /// Returns `false` without changing anything if [`can_insert`] rejects it.
    ///
    /// [`can_insert`]: StateHistory::can_insert
    pub fn insert(&mut self, state: State) -> bool {
        if !self.can_insert(state.update_number) {
            return false;
        }
        let index = self
            .states
            .partition_point(|s| s.update_number < state.update_number);
        self.states.insert(index, state);
        if self.states.len() > self.capacity {
            self.states.remove(0);
        }
        true
    }

    /// Whether a state with this update number is retained
    pub fn contains(&self, update_number: UpdateNumber) -> bool {
        self.states
            .binary_search_by_key(&update_number, |s| s.update_number)
            .is_ok()
    }

    /// The retained state whose update number is closest to `target`
    ///
    /// Targets outside the retained range clamp to the oldest or newest
    /// state. Between two states the closer one wins, and an exact tie goes
    /// to the older of the two.
    pub fn nearest(&self, target: i64) -> Option<&State> {
        let oldest = self.states.first()?;
        let newest = self.states.last()?;
        if target <= i64::from(oldest.update_number) {
            return Some(oldest);
        }
        if target >= i64::from(newest.update_number) {
            return Some(newest);
        }

        // Strictly inside the range, so 0 < index < len
        let index = self
            .states
            .partition_point(|s| i64::from(s.update_number) < target);
        let after = &self.states[index];
        let before = &self.states[index - 1];
        if target - i64::from(before.update_number) <= i64::from(after.update_number) - target {
            Some(before)
        } else {
            Some(after)
        }
    }

    /// Oldest retained state
    pub fn oldest(&self) -> Option<&State> {
        self.states.first()
    }

    /// Newest retained state
    pub fn newest(&self) -> Option<&State> {
        self.states.last()
    }

    /// All retained states, oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    /// Number of retained states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Check if the history is at capacity
    pub fn is_full(&self) -> bool {
        self.states.len() >= self.capacity
    }

    /// Get the capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear all states
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}
