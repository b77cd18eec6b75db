//! Application state and composition.

use std::sync::Arc;

use parties_domain::{PartyConfig, PartyError, PlayerId};
use tokio::sync::{watch, Mutex};

use crate::infrastructure::{
    config::ConfigHandle,
    ports::{
        AttributeService, ClockPort, ConfigProvider, ExternalTeamProvider, LootService,
        NetworkBroadcaster, PlayerDirectory, ProximityPredicate, SpatialQuery, TeamMirror,
    },
    proximity::{RangeProximity, DEFAULT_SHARE_RANGE},
    spatial::GridSpatialIndex,
};
use crate::stores::PartyStore;
use crate::use_cases::{
    BossScaling, Cadence, CommandDispatcher, FriendlyFire, MembershipBridge, ModPacketRelay,
    PlayerCounter, RosterProducer, SettingsProducer, SyncIntervals, SyncScheduler,
    XpShareEngine,
};

/// Host-side collaborators the core is wired against.
pub struct Collaborators {
    pub clock: Arc<dyn ClockPort>,
    pub directory: Arc<dyn PlayerDirectory>,
    pub broadcaster: Arc<dyn NetworkBroadcaster>,
    pub attributes: Arc<dyn AttributeService>,
    pub loot: Arc<dyn LootService>,
    pub config_provider: Arc<dyn ConfigProvider>,
    /// Defaults to [`RangeProximity`] over the directory.
    pub proximity: Option<Arc<dyn ProximityPredicate>>,
    pub external_teams: Option<Arc<dyn ExternalTeamProvider>>,
    /// Host team system to mirror membership into, if any.
    pub team_mirror: Option<Arc<dyn TeamMirror>>,
}

/// Container for all use cases.
pub struct UseCases {
    pub membership: Arc<MembershipBridge>,
    pub player_count: Arc<PlayerCounter>,
    pub bosses: Arc<BossScaling>,
    pub xp_share: Arc<XpShareEngine>,
    pub commands: Arc<CommandDispatcher>,
    pub mod_packets: Arc<ModPacketRelay>,
    pub friendly_fire: Arc<FriendlyFire>,
}

/// What one simulation tick did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub expired_invites: usize,
    pub sync_payloads: usize,
}

/// Main application state.
///
/// Holds the party store and every use case, plus the per-tick machinery
/// (spatial index, sync scheduler) driven by [`App::tick`].
pub struct App {
    pub store: Arc<PartyStore>,
    pub use_cases: UseCases,
    pub config: ConfigHandle,
    directory: Arc<dyn PlayerDirectory>,
    spatial: Arc<GridSpatialIndex>,
    sync: Mutex<SyncLoop>,
}

struct SyncLoop {
    scheduler: SyncScheduler,
    config_changes: watch::Receiver<Arc<PartyConfig>>,
}

impl App {
    /// Wire every component against `deps`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the sync intervals in `config` are unusable.
    pub fn new(config: ConfigHandle, deps: Collaborators) -> Result<Self, PartyError> {
        let intervals = SyncIntervals::from_config(&config.current())?;

        let mut store = PartyStore::new(
            deps.clock.clone(),
            config.clone(),
            deps.broadcaster.clone(),
        );
        if let Some(mirror) = deps.team_mirror {
            store = store.with_team_mirror(mirror);
        }
        let store = Arc::new(store);
        let membership = Arc::new(MembershipBridge::new(
            store.clone(),
            deps.external_teams,
            config.clone(),
        ));
        let proximity: Arc<dyn ProximityPredicate> = match deps.proximity {
            Some(proximity) => proximity,
            None => Arc::new(RangeProximity::new(
                deps.directory.clone(),
                DEFAULT_SHARE_RANGE,
            )),
        };
        let spatial = Arc::new(GridSpatialIndex::default());
        let spatial_query: Arc<dyn SpatialQuery> = spatial.clone();

        let player_count = Arc::new(PlayerCounter::new(
            deps.directory.clone(),
            Some(spatial_query),
            membership.clone(),
        ));
        let bosses = Arc::new(BossScaling::new(
            player_count.clone(),
            deps.attributes,
            deps.loot,
            config.clone(),
            deps.clock,
        ));
        let xp_share = Arc::new(XpShareEngine::new(
            membership.clone(),
            deps.directory.clone(),
            proximity.clone(),
            config.clone(),
        ));
        let commands = Arc::new(CommandDispatcher::new(
            store.clone(),
            membership.clone(),
            deps.directory.clone(),
            config.clone(),
            deps.config_provider,
        ));
        let mod_packets = Arc::new(ModPacketRelay::new(
            membership.clone(),
            proximity,
            deps.broadcaster.clone(),
            config.clone(),
        ));
        let friendly_fire = Arc::new(FriendlyFire::new(membership.clone()));

        let mut scheduler = SyncScheduler::new(intervals, deps.broadcaster);
        scheduler.register(
            Cadence::Fast,
            Arc::new(RosterProducer::new(
                store.clone(),
                deps.directory.clone(),
                config.clone(),
            )),
        );
        scheduler.register(
            Cadence::Slow,
            Arc::new(SettingsProducer::new(store.clone(), config.clone())),
        );

        let config_changes = config.subscribe();

        Ok(Self {
            store,
            use_cases: UseCases {
                membership,
                player_count,
                bosses,
                xp_share,
                commands,
                mod_packets,
                friendly_fire,
            },
            config,
            directory: deps.directory,
            spatial,
            sync: Mutex::new(SyncLoop {
                scheduler,
                config_changes,
            }),
        })
    }

    /// One simulation tick: sweep expired invites, refresh the spatial index,
    /// pick up reloaded sync intervals, then fire due sync cadences.
    pub async fn tick(&self) -> TickReport {
        let expired_invites = self.store.expire_invites().await;
        self.spatial.rebuild(&self.directory.online_players());

        let mut sync = self.sync.lock().await;
        if sync.config_changes.has_changed().unwrap_or(false) {
            let snapshot = sync.config_changes.borrow_and_update().clone();
            match SyncIntervals::from_config(&snapshot) {
                Ok(intervals) => sync.scheduler.set_intervals(intervals),
                Err(e) => tracing::warn!(error = %e, "Keeping previous sync intervals"),
            }
        }
        let sync_payloads = sync.scheduler.on_tick().await;

        TickReport {
            expired_invites,
            sync_payloads,
        }
    }

    /// Drop the player's pending invites. Membership is kept so they come
    /// back to the same party.
    pub async fn player_disconnected(&self, player: PlayerId) -> usize {
        let dropped = self.store.drop_invites_for(player).await;
        tracing::debug!(player_id = %player, dropped, "Player disconnected");
        dropped
    }

    pub fn spatial_index(&self) -> &GridSpatialIndex {
        &self.spatial
    }
}
