//! Parties domain: party aggregate, invites, scaling values, and the error
//! taxonomy shared by every party operation.

pub mod aggregates;
pub mod error;
pub mod events;
pub mod ids;
pub mod payloads;
pub mod value_objects;

pub use aggregates::{MemberRemoval, Party, PartyMember, PartyView};
pub use error::PartyError;
pub use events::{InviteClosed, LeaveReason, PartyEvent};
pub use ids::{EntityId, PartyId, PlayerId};
pub use payloads::{ClientPayload, MemberStatus};
pub use value_objects::{
    BossModuleSettings, BossMultipliers, BossSnapshot, CountPolicy, DimensionId, Invite,
    InviteKey, Location, LootScaling, MechanicsSettings, ModSupportSettings, OnlinePlayer,
    PartyConfig, PlayerCount, Position, ScalingContext, TimerSettings, XpShareSettings,
};
