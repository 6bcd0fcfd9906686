//! Remote participant roster
//!
//! Tracks one [`Ghost`] per remote peer and the set of peers the host is
//! currently rendering ("spawned"). Each query refreshes every ghost and
//! reports which snapshots to draw and which spawned peers to tear down.

use ghostsync_core::{PeerId, PlayerSnapshot, UpdateNumber, Zone};
use ghostsync_history::{Ghost, State};
use ghostsync_wire::Record;
use indexmap::{IndexMap, IndexSet};

/// Result of one per-tick query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GhostUpdate {
    /// Snapshots to render, one per peer in the local zone
    pub updates: Vec<PlayerSnapshot>,
    /// Peers whose representation must be removed
    pub removals: Vec<PeerId>,
}

impl GhostUpdate {
    /// Check if there is nothing to render or remove
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.removals.is_empty()
    }
}

/// All remote ghosts plus the spawned set
#[derive(Debug, Default)]
pub struct GhostRegistry {
    /// Ghosts by peer, in join order
    ghosts: IndexMap<PeerId, Ghost>,
    /// Peers the host currently renders
    spawned: IndexSet<PeerId>,
}

impl GhostRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ghost for a peer, replacing any existing one
    pub fn add(&mut self, id: PeerId) {
        self.ghosts.insert(id, Ghost::new(id));
    }

    /// Remove a peer's ghost along with its history
    ///
    /// Returns `false` if the peer was unknown.
    pub fn remove(&mut self, id: PeerId) -> bool {
        self.ghosts.shift_remove(&id).is_some()
    }

    /// Remove every ghost, keeping the spawned set for the next query
    pub fn clear(&mut self) {
        self.ghosts.clear();
    }

    /// Feed a decoded record to its peer's ghost
    ///
    /// Returns `false` if the peer is unknown or the state was stale.
    pub fn receive(&mut self, record: &Record, local: UpdateNumber) -> bool {
        let Some(ghost) = self.ghosts.get_mut(&record.peer) else {
            log::trace!("Ignoring state for unknown {}", record.peer);
            return false;
        };
        let state = State::new(record.update_number, record.zone, record.snapshot);
        ghost.receive(state, local)
    }

    /// Refresh every ghost and compute what the host should render
    ///
    /// With no local update number yet, ghosts keep their cached states.
    /// A peer is renderable when its cached state is in `zone`; it joins the
    /// spawned set. Spawned peers that are gone, or whose state is elsewhere,
    /// are reported for removal and leave the spawned set.
    pub fn collect(&mut self, local: Option<UpdateNumber>, zone: Zone) -> GhostUpdate {
        let mut update = GhostUpdate::default();

        for (id, ghost) in self.ghosts.iter_mut() {
            let current = match local {
                Some(local) => ghost.refresh_state(local),
                None => ghost.current(),
            };
            if let Some(state) = current.filter(|s| s.zone == zone) {
                update.updates.push(state.snapshot);
                self.spawned.insert(*id);
            }
        }

        let ghosts = &self.ghosts;
        self.spawned.retain(|id| {
            let present = ghosts
                .get(id)
                .and_then(Ghost::current)
                .is_some_and(|s| s.zone == zone);
            if !present {
                update.removals.push(*id);
            }
            present
        });

        update
    }

    /// Get a peer's ghost
    pub fn get(&self, id: PeerId) -> Option<&Ghost> {
        self.ghosts.get(&id)
    }

    /// Check if a peer has a ghost
    pub fn contains(&self, id: PeerId) -> bool {
        self.ghosts.contains_key(&id)
    }

    /// Peers with a ghost, in join order
    pub fn ids(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.ghosts.keys().copied()
    }

    /// Peers the host currently renders
    pub fn spawned(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.spawned.iter().copied()
    }

    /// Number of ghosts
    pub fn len(&self) -> usize {
        self.ghosts.len()
    }

    /// Check if there are no ghosts
    pub fn is_empty(&self) -> bool {
        self.ghosts.is_empty()
    }
}
