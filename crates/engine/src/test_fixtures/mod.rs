//! Shared builders and fakes for engine tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{player, online, RecordingBroadcaster};
//!
//! let alice = online(1, "minecraft:overworld", Position::default());
//! assert_eq!(alice.id, player(1));
//! ```

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use parties_domain::{
    ClientPayload, Location, OnlinePlayer, PartyConfig, PartyEvent, PlayerId, Position,
};
use uuid::Uuid;

use crate::infrastructure::clock::ManualClock;
use crate::infrastructure::config::ConfigHandle;
use crate::infrastructure::directory::InMemoryPlayerDirectory;
use crate::infrastructure::ports::{NetworkBroadcaster, Outbound};

pub const OVERWORLD: &str = "minecraft:overworld";
pub const NETHER: &str = "minecraft:the_nether";

// =============================================================================
// Identities & Time
// =============================================================================

/// Deterministic player id; ordering follows `n`.
pub fn player(n: u128) -> PlayerId {
    PlayerId::from_uuid(Uuid::from_u128(n))
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(t0()))
}

// =============================================================================
// Players
// =============================================================================

pub fn online(n: u128, dimension: &str, position: Position) -> OnlinePlayer {
    OnlinePlayer::new(
        player(n),
        format!("player{n}"),
        Location::new(dimension, position),
    )
}

/// Directory pre-populated with `players`.
pub fn directory_with(players: Vec<OnlinePlayer>) -> Arc<InMemoryPlayerDirectory> {
    let directory = InMemoryPlayerDirectory::new();
    for p in players {
        directory.upsert(p);
    }
    Arc::new(directory)
}

// =============================================================================
// Configuration
// =============================================================================

/// Default configuration with `edit` applied.
pub fn config_with(edit: impl FnOnce(&mut PartyConfig)) -> PartyConfig {
    let mut config = PartyConfig::default();
    edit(&mut config);
    config
}

pub fn handle_with(edit: impl FnOnce(&mut PartyConfig)) -> ConfigHandle {
    ConfigHandle::new(config_with(edit)).unwrap()
}

pub fn default_handle() -> ConfigHandle {
    ConfigHandle::new(PartyConfig::default()).unwrap()
}

// =============================================================================
// Broadcast capture
// =============================================================================

/// Broadcaster that records everything it is handed.
#[derive(Default)]
pub struct RecordingBroadcaster {
    sent: Mutex<Vec<Outbound>>,
}

impl RecordingBroadcaster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().unwrap().clone()
    }

    /// Drain and return what was recorded.
    pub fn take(&self) -> Vec<Outbound> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    /// Lifecycle notices only, in send order.
    pub fn notices(&self) -> Vec<PartyEvent> {
        self.sent()
            .into_iter()
            .filter_map(|o| match o.payload {
                ClientPayload::Notice { event } => Some(event),
                _ => None,
            })
            .collect()
    }

    /// Recipients of the first notice matching `pred`.
    pub fn recipients_of(&self, pred: impl Fn(&PartyEvent) -> bool) -> Option<Vec<PlayerId>> {
        self.sent().into_iter().find_map(|o| match &o.payload {
            ClientPayload::Notice { event } if pred(event) => Some(o.recipients.clone()),
            _ => None,
        })
    }
}

impl NetworkBroadcaster for RecordingBroadcaster {
    fn broadcast(&self, recipients: Vec<PlayerId>, payload: ClientPayload) {
        self.sent
            .lock()
            .unwrap()
            .push(Outbound::new(recipients, payload));
    }
}
