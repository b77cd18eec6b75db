//! Value objects - immutable values with validation at construction

pub mod geometry;
pub mod invite;
pub mod party_config;
pub mod player;
pub mod scaling;

pub use geometry::{DimensionId, Location, Position};
pub use invite::{Invite, InviteKey};
pub use party_config::{
    BossModuleSettings, CountPolicy, MechanicsSettings, ModSupportSettings, PartyConfig,
    TimerSettings, XpShareSettings,
};
pub use player::OnlinePlayer;
pub use scaling::{BossMultipliers, BossSnapshot, LootScaling, PlayerCount, ScalingContext};
