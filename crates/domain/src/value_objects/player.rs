//! Online player snapshot as reported by the host

use serde::{Deserialize, Serialize};

use super::geometry::{DimensionId, Location, Position};
use crate::PlayerId;

/// A player currently connected to the server.
///
/// Built by the host's player directory on demand; never stored by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlinePlayer {
    pub id: PlayerId,
    pub name: String,
    pub location: Location,
}

impl OnlinePlayer {
    pub fn new(id: PlayerId, name: impl Into<String>, location: Location) -> Self {
        Self {
            id,
            name: name.into(),
            location,
        }
    }

    #[inline]
    pub fn dimension(&self) -> &DimensionId {
        &self.location.dimension
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.location.position
    }
}
