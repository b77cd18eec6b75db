//! Periodic party state sync.
//!
//! Two cadences, counted in simulation ticks. Fast carries membership and the
//! member state that moves every few ticks (position, dimension, online).
//! Slow carries rules that rarely change. Producers are registered explicitly
//! by the composition root; the scheduler only decides when each one runs and
//! passes what it returns to the broadcaster.

use std::sync::Arc;

use async_trait::async_trait;
use parties_domain::{ClientPayload, MemberStatus, PartyConfig, PartyError};

use crate::infrastructure::config::ConfigHandle;
use crate::infrastructure::ports::{NetworkBroadcaster, Outbound, PlayerDirectory};
use crate::stores::PartyStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Fast,
    Slow,
}

/// Fast and slow intervals in ticks, with `slow >= fast >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncIntervals {
    fast: u32,
    slow: u32,
}

impl SyncIntervals {
    /// # Errors
    ///
    /// `InvalidConfig` if either interval is zero or `slow < fast`.
    pub fn new(fast: u32, slow: u32) -> Result<Self, PartyError> {
        if fast == 0 {
            return Err(PartyError::invalid_config("fast sync interval must be >= 1"));
        }
        if slow < fast {
            return Err(PartyError::invalid_config(format!(
                "slow sync interval ({slow}) must be >= fast sync interval ({fast})"
            )));
        }
        Ok(Self { fast, slow })
    }

    pub fn from_config(config: &PartyConfig) -> Result<Self, PartyError> {
        Self::new(config.timers.fast_interval, config.timers.slow_interval)
    }

    pub fn fast(&self) -> u32 {
        self.fast
    }

    pub fn slow(&self) -> u32 {
        self.slow
    }

    fn due(&self, cadence: Cadence, tick: u64) -> bool {
        let every = match cadence {
            Cadence::Fast => self.fast,
            Cadence::Slow => self.slow,
        };
        tick % u64::from(every) == 0
    }
}

/// Builds the payloads for one cadence firing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyncProducer: Send + Sync {
    async fn produce(&self) -> Vec<Outbound>;
}

pub struct SyncScheduler {
    intervals: SyncIntervals,
    tick: u64,
    producers: Vec<(Cadence, Arc<dyn SyncProducer>)>,
    broadcaster: Arc<dyn NetworkBroadcaster>,
}

impl SyncScheduler {
    pub fn new(intervals: SyncIntervals, broadcaster: Arc<dyn NetworkBroadcaster>) -> Self {
        Self {
            intervals,
            tick: 0,
            producers: Vec::new(),
            broadcaster,
        }
    }

    pub fn register(&mut self, cadence: Cadence, producer: Arc<dyn SyncProducer>) {
        self.producers.push((cadence, producer));
    }

    pub fn intervals(&self) -> SyncIntervals {
        self.intervals
    }

    /// Takes effect from the next tick. The tick counter is not reset.
    pub fn set_intervals(&mut self, intervals: SyncIntervals) {
        if intervals != self.intervals {
            tracing::info!(
                fast = intervals.fast(),
                slow = intervals.slow(),
                "Sync intervals changed"
            );
        }
        self.intervals = intervals;
    }

    /// Advance one tick and fire every producer whose cadence is due.
    /// Returns the number of payloads handed to the broadcaster.
    pub async fn on_tick(&mut self) -> usize {
        self.tick = self.tick.wrapping_add(1);
        let tick = self.tick;

        let mut sent = 0;
        for (cadence, producer) in &self.producers {
            if !self.intervals.due(*cadence, tick) {
                continue;
            }
            for Outbound {
                recipients,
                payload,
            } in producer.produce().await
            {
                if recipients.is_empty() {
                    continue;
                }
                self.broadcaster.broadcast(recipients, payload);
                sent += 1;
            }
        }
        sent
    }
}

// =============================================================================
// Built-in producers
// =============================================================================

/// Fast cadence: each party's roster with live member status.
///
/// Silent while external teams are active; the built-in parties are dormant
/// then and the host's team mod owns what clients see.
pub struct RosterProducer {
    store: Arc<PartyStore>,
    directory: Arc<dyn PlayerDirectory>,
    config: ConfigHandle,
}

impl RosterProducer {
    pub fn new(
        store: Arc<PartyStore>,
        directory: Arc<dyn PlayerDirectory>,
        config: ConfigHandle,
    ) -> Self {
        Self {
            store,
            directory,
            config,
        }
    }
}

#[async_trait]
impl SyncProducer for RosterProducer {
    async fn produce(&self) -> Vec<Outbound> {
        if self.config.current().external_teams() {
            return Vec::new();
        }
        self.store
            .parties()
            .await
            .into_iter()
            .map(|party| {
                let members = party
                    .members
                    .iter()
                    .map(|id| match self.directory.player(*id) {
                        Some(p) => MemberStatus {
                            player_id: *id,
                            name: Some(p.name.clone()),
                            online: true,
                            dimension: Some(p.location.dimension.clone()),
                            position: Some(p.location.position),
                        },
                        None => MemberStatus {
                            player_id: *id,
                            name: None,
                            online: false,
                            dimension: None,
                            position: None,
                        },
                    })
                    .collect();
                Outbound::new(
                    party.members.clone(),
                    ClientPayload::Roster { party, members },
                )
            })
            .collect()
    }
}

/// Slow cadence: party rules from the current config snapshot. Silent while
/// external teams are active.
pub struct SettingsProducer {
    store: Arc<PartyStore>,
    config: ConfigHandle,
}

impl SettingsProducer {
    pub fn new(store: Arc<PartyStore>, config: ConfigHandle) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl SyncProducer for SettingsProducer {
    async fn produce(&self) -> Vec<Outbound> {
        let config = self.config.current();
        if config.external_teams() {
            return Vec::new();
        }
        self.store
            .parties()
            .await
            .into_iter()
            .map(|party| {
                Outbound::new(
                    party.members,
                    ClientPayload::Settings {
                        max_party_size: config.max_party_size(),
                        friendly_fire: party.friendly_fire,
                        xp_share: config.xp_share.enable_share,
                        global_share: config.xp_share.global_share,
                    },
                )
            })
            .collect()
    }
}
