//! Per-peer synchronizer
//!
//! A `Ghost` combines a peer's state history with its offset window and
//! remembers which state was last selected for rendering.

use crate::{OffsetWindow, State, StateHistory};
use ghostsync_core::{PeerId, UpdateNumber, PLAYBACK_DELAY};

/// Synchronized state of one remote participant
#[derive(Debug, Clone)]
pub struct Ghost {
    /// Peer this ghost represents
    id: PeerId,
    /// Received states, oldest first
    history: StateHistory,
    /// Remote minus local update numbers of the newest arrivals
    offsets: OffsetWindow,
    /// State chosen by the last refresh
    current: Option<State>,
}

impl Ghost {
    /// Create an empty ghost for a peer
    pub fn new(id: PeerId) -> Self {
        Self {
            id,
            history: StateHistory::default(),
            offsets: OffsetWindow::default(),
            current: None,
        }
    }

    /// Whether a state with this update number would be kept
    pub fn can_insert(&self, update_number: UpdateNumber) -> bool {
        self.history.can_insert(update_number)
    }

    /// Insert a state received while the local update number was `local`
    ///
    /// A state newer than everything retained also contributes an offset
    /// sample. The snapshot is stamped with this ghost's id. Stale and
    /// duplicate states are dropped and `false` is returned.
    pub fn receive(&mut self, state: State, local: UpdateNumber) -> bool {
        if !self.can_insert(state.update_number) {
            log::trace!(
                "{}: dropping stale state {}",
                self.id,
                state.update_number
            );
            return false;
        }
        if self.history.is_newest(state.update_number) {
            self.offsets
                .push(i64::from(state.update_number) - i64::from(local));
        }
        let state = State {
            snapshot: state.snapshot.with_id(self.id),
            ..state
        };
        self.history.insert(state)
    }

    /// Select and cache the state to render at local update number `local`
    ///
    /// The playback target is `local + average_offset - PLAYBACK_DELAY`; the
    /// retained state nearest to it is chosen. Returns `None` until at least
    /// one state has arrived.
    pub fn refresh_state(&mut self, local: UpdateNumber) -> Option<&State> {
        self.current = match self.offsets.average() {
            Some(average) => {
                let target = i64::from(local) + average - PLAYBACK_DELAY;
                self.history.nearest(target).copied()
            }
            None => None,
        };
        self.current.as_ref()
    }

    /// State chosen by the last refresh
    pub fn current(&self) -> Option<&State> {
        self.current.as_ref()
    }

    /// Peer this ghost represents
    pub fn id(&self) -> PeerId {
        self.id
    }

    /// Received states
    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Offset samples
    pub fn offsets(&self) -> &OffsetWindow {
        &self.offsets
    }
}
