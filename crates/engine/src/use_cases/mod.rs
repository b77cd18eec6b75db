//! Use cases - party features built on the store and the host ports.
//!
//! Membership reads always go through `MembershipBridge` so that external
//! team systems are honoured everywhere at once.

pub mod boss_scaling;
pub mod commands;
pub mod friendly_fire;
pub mod membership;
pub mod mod_packets;
pub mod player_count;
pub mod sync;
pub mod xp_share;

// Re-export main types
pub use boss_scaling::{BossScaling, SpawnOutcome};
pub use commands::{CommandDispatcher, CommandReply, PartyCommand};
pub use friendly_fire::FriendlyFire;
pub use membership::{MembershipBridge, MembershipSource};
pub use mod_packets::ModPacketRelay;
pub use player_count::PlayerCounter;
pub use sync::{
    Cadence, RosterProducer, SettingsProducer, SyncIntervals, SyncProducer, SyncScheduler,
};
pub use xp_share::{XpGain, XpShare, XpShareEngine, XpShareOutcome, XpSource};
