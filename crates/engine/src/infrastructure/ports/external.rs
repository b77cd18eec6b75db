//! Host collaborator port traits.
//!
//! The core never touches the host game directly. Everything it needs to know
//! about players and the world comes in through these traits, and everything
//! it decides goes out through them.

use async_trait::async_trait;
use parties_domain::{
    BossMultipliers, ClientPayload, DimensionId, EntityId, LootScaling, OnlinePlayer,
    PartyConfig, PartyId, PartyView, PlayerId, Position,
};

use super::error::ConfigLoadError;

// =============================================================================
// Players & World
// =============================================================================

/// The host's list of connected players.
#[cfg_attr(test, mockall::automock)]
pub trait PlayerDirectory: Send + Sync {
    fn online_players(&self) -> Vec<OnlinePlayer>;
    fn player(&self, id: PlayerId) -> Option<OnlinePlayer>;

    fn is_online(&self, id: PlayerId) -> bool {
        self.player(id).is_some()
    }
}

/// Same dimension and within the mod-defined range.
#[cfg_attr(test, mockall::automock)]
pub trait ProximityPredicate: Send + Sync {
    fn in_range(&self, a: PlayerId, b: PlayerId) -> bool;
}

/// Radius lookup over online players, partitioned by dimension.
#[cfg_attr(test, mockall::automock)]
pub trait SpatialQuery: Send + Sync {
    /// Players in `dimension` at most `radius` blocks from `center`.
    fn players_within(&self, dimension: &DimensionId, center: &Position, radius: f64)
        -> Vec<PlayerId>;
}

// =============================================================================
// Outbound
// =============================================================================

/// Hands payload snapshots to the network layer.
///
/// Implementations must not block: the call happens on the simulation tick.
#[cfg_attr(test, mockall::automock)]
pub trait NetworkBroadcaster: Send + Sync {
    fn broadcast(&self, recipients: Vec<PlayerId>, payload: ClientPayload);
}

/// Applies boss multipliers to the host's attribute system.
#[cfg_attr(test, mockall::automock)]
pub trait AttributeService: Send + Sync {
    fn apply(&self, entity: EntityId, multipliers: BossMultipliers);
}

/// Scales a boss's drops using the count frozen at spawn.
#[cfg_attr(test, mockall::automock)]
pub trait LootService: Send + Sync {
    fn scale_drops(&self, entity: EntityId, scaling: LootScaling);
}

// =============================================================================
// Delegated Membership
// =============================================================================

/// Read-only membership from an external team system.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExternalTeamProvider: Send + Sync {
    async fn team_of(&self, player: PlayerId) -> Option<PartyView>;
}

/// Mirrors party membership into the host's own team system.
///
/// Called after the store lock is released, once per membership change.
#[cfg_attr(test, mockall::automock)]
pub trait TeamMirror: Send + Sync {
    fn member_joined(&self, party: PartyId, player: PlayerId);
    fn member_left(&self, party: PartyId, player: PlayerId);
    fn party_disbanded(&self, party: PartyId, former_members: Vec<PlayerId>);
}

// =============================================================================
// Configuration
// =============================================================================

/// Source of configuration snapshots (file, env, ...).
#[cfg_attr(test, mockall::automock)]
pub trait ConfigProvider: Send + Sync {
    /// Read and validate a fresh snapshot.
    fn load(&self) -> Result<PartyConfig, ConfigLoadError>;
}
