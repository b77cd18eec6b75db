//! Party Events
//!
//! Notifications produced by membership and invite transitions. The engine
//! pushes each one to the players it concerns; clients render them as chat
//! lines or frame updates.

use serde::{Deserialize, Serialize};

use crate::{PartyId, PlayerId};

/// Why a member is no longer in a party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeaveReason {
    Left,
    Kicked,
}

/// Why an invite went away without being accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InviteClosed {
    Declined,
    Cancelled,
    Expired,
    /// One side disconnected
    Withdrawn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum PartyEvent {
    PartyCreated {
        party_id: PartyId,
        leader: PlayerId,
    },
    MemberJoined {
        party_id: PartyId,
        player_id: PlayerId,
    },
    MemberLeft {
        party_id: PartyId,
        player_id: PlayerId,
        reason: LeaveReason,
    },
    LeaderChanged {
        party_id: PartyId,
        previous: PlayerId,
        leader: PlayerId,
    },
    PartyDisbanded {
        party_id: PartyId,
        former_members: Vec<PlayerId>,
    },
    InviteReceived {
        inviter: PlayerId,
        invitee: PlayerId,
        expires_in_secs: u32,
    },
    InviteClosed {
        inviter: PlayerId,
        invitee: PlayerId,
        reason: InviteClosed,
    },
}

impl PartyEvent {
    /// The party whose current members should hear about this, if any.
    pub fn party_id(&self) -> Option<PartyId> {
        match self {
            PartyEvent::PartyCreated { party_id, .. }
            | PartyEvent::MemberJoined { party_id, .. }
            | PartyEvent::MemberLeft { party_id, .. }
            | PartyEvent::LeaderChanged { party_id, .. } => Some(*party_id),
            PartyEvent::PartyDisbanded { .. }
            | PartyEvent::InviteReceived { .. }
            | PartyEvent::InviteClosed { .. } => None,
        }
    }

    /// Players named by the event itself, who must hear about it even if they
    /// are no longer members.
    pub fn involved_players(&self) -> Vec<PlayerId> {
        match self {
            PartyEvent::PartyCreated { leader, .. } => vec![*leader],
            PartyEvent::MemberJoined { player_id, .. }
            | PartyEvent::MemberLeft { player_id, .. } => vec![*player_id],
            PartyEvent::LeaderChanged {
                previous, leader, ..
            } => vec![*previous, *leader],
            PartyEvent::PartyDisbanded { former_members, .. } => former_members.clone(),
            PartyEvent::InviteReceived {
                inviter, invitee, ..
            }
            | PartyEvent::InviteClosed {
                inviter, invitee, ..
            } => vec![*inviter, *invitee],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn player(n: u128) -> PlayerId {
        PlayerId::from_uuid(Uuid::from_u128(n))
    }

    #[test]
    fn disband_reaches_former_members_without_a_party() {
        let event = PartyEvent::PartyDisbanded {
            party_id: PartyId::new(),
            former_members: vec![player(1), player(2)],
        };
        assert_eq!(event.party_id(), None);
        assert_eq!(event.involved_players(), vec![player(1), player(2)]);
    }

    #[test]
    fn serializes_with_type_tag() {
        let event = PartyEvent::InviteClosed {
            inviter: player(1),
            invitee: player(2),
            reason: InviteClosed::Expired,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "inviteClosed");
        assert_eq!(json["reason"], "expired");
    }
}
