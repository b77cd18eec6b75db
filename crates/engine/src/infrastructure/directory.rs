//! In-memory player directory fed by host connect/move/disconnect events.

use dashmap::DashMap;
use parties_domain::{Location, OnlinePlayer, PlayerId};

use crate::infrastructure::ports::PlayerDirectory;

#[derive(Default)]
pub struct InMemoryPlayerDirectory {
    players: DashMap<PlayerId, OnlinePlayer>,
}

impl InMemoryPlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a connected player.
    pub fn upsert(&self, player: OnlinePlayer) {
        self.players.insert(player.id, player);
    }

    /// Move a connected player. Returns false if the player is not online.
    pub fn update_location(&self, id: PlayerId, location: Location) -> bool {
        match self.players.get_mut(&id) {
            Some(mut player) => {
                player.location = location;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: PlayerId) -> Option<OnlinePlayer> {
        self.players.remove(&id).map(|(_, player)| player)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl PlayerDirectory for InMemoryPlayerDirectory {
    /// Sorted by player id so callers see a stable order.
    fn online_players(&self) -> Vec<OnlinePlayer> {
        let mut players: Vec<OnlinePlayer> =
            self.players.iter().map(|entry| entry.value().clone()).collect();
        players.sort_by_key(|p| p.id);
        players
    }

    fn player(&self, id: PlayerId) -> Option<OnlinePlayer> {
        self.players.get(&id).map(|entry| entry.value().clone())
    }
}
