//! Turn-token state machine: at most one seated player holds the turn.

use crate::registry::{ClientId, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Empty,
    Holding(ClientId),
}

impl Turn {
    pub fn holder(&self) -> Option<ClientId> {
        match self {
            Turn::Empty => None,
            Turn::Holding(id) => Some(*id),
        }
    }

    pub fn is_holding(&self, id: ClientId) -> bool {
        self.holder() == Some(id)
    }

    /// Advance to the next seated player after the current holder, wrapping
    /// around to the front of the roster. `Empty` if no players remain.
    pub fn advance(self, registry: &Registry) -> Turn {
        if registry.players.is_empty() {
            return Turn::Empty;
        }
        let next_idx = match self.holder().and_then(|id| registry.player_index(id)) {
            Some(idx) => (idx + 1) % registry.players.len(),
            None => 0,
        };
        Turn::Holding(registry.players[next_idx].id)
    }

    /// The turn holder at `removed_idx` just left the roster (already
    /// removed from `registry.players`, which is the pre-removal length
    /// minus one). Returns the id that should now hold the turn, preferring
    /// the player that slid into the vacated slot, then wrapping to the
    /// front, then `Empty` if the roster is now empty.
    pub fn after_removal_at(registry: &Registry, removed_idx: usize) -> Turn {
        if registry.players.is_empty() {
            return Turn::Empty;
        }
        let next_idx = removed_idx % registry.players.len();
        Turn::Holding(registry.players[next_idx].id)
    }
}
