//! Client-bound payloads
//!
//! These are the snapshots the core hands to the network broadcaster. Wire
//! encoding is the broadcaster's concern.

use serde::{Deserialize, Serialize};

use crate::aggregates::PartyView;
use crate::events::PartyEvent;
use crate::value_objects::{DimensionId, Position};
use crate::PlayerId;

/// Per-member state shown on party frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStatus {
    pub player_id: PlayerId,
    pub name: Option<String>,
    pub online: bool,
    pub dimension: Option<DimensionId>,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ClientPayload {
    /// Lifecycle notification
    Notice { event: PartyEvent },
    /// Fast cadence: membership and fast-changing member state
    Roster {
        party: PartyView,
        members: Vec<MemberStatus>,
    },
    /// Slow cadence: rules that rarely change
    Settings {
        max_party_size: u32,
        friendly_fire: bool,
        xp_share: bool,
        global_share: bool,
    },
    /// Opaque payload from another mod, relayed between members
    ModPacket {
        from: PlayerId,
        channel: String,
        data: Vec<u8>,
    },
}

impl From<PartyEvent> for ClientPayload {
    fn from(event: PartyEvent) -> Self {
        ClientPayload::Notice { event }
    }
}
