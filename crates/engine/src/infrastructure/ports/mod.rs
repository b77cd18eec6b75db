//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - The host's player list and world geometry (directory, proximity, spatial query)
//! - Client delivery (network broadcaster)
//! - Applying computed results (attribute and loot services)
//! - Delegated membership (external team provider, vanilla team mirror)
//! - Configuration sources
//! - Clock (for testing)

mod error;
mod external;
mod testing;
pub mod types;

pub use error::ConfigLoadError;
pub use external::{
    AttributeService, ConfigProvider, ExternalTeamProvider, LootService, NetworkBroadcaster,
    PlayerDirectory, ProximityPredicate, SpatialQuery, TeamMirror,
};
pub use testing::ClockPort;
pub use types::Outbound;

#[cfg(test)]
pub use external::{
    MockAttributeService, MockConfigProvider, MockExternalTeamProvider, MockLootService,
    MockNetworkBroadcaster, MockPlayerDirectory, MockProximityPredicate, MockSpatialQuery,
    MockTeamMirror,
};
