//! Relays opaque payloads from other mods (cast bars, buffs) to the rest of
//! the sender's party.
//!
//! With global updates disabled only members within proximity of the sender
//! receive the packet.

use std::sync::Arc;

use parties_domain::{ClientPayload, PlayerId};

use super::membership::MembershipBridge;
use crate::infrastructure::config::ConfigHandle;
use crate::infrastructure::ports::{NetworkBroadcaster, ProximityPredicate};

pub struct ModPacketRelay {
    membership: Arc<MembershipBridge>,
    proximity: Arc<dyn ProximityPredicate>,
    broadcaster: Arc<dyn NetworkBroadcaster>,
    config: ConfigHandle,
}

impl ModPacketRelay {
    pub fn new(
        membership: Arc<MembershipBridge>,
        proximity: Arc<dyn ProximityPredicate>,
        broadcaster: Arc<dyn NetworkBroadcaster>,
        config: ConfigHandle,
    ) -> Self {
        Self {
            membership,
            proximity,
            broadcaster,
            config,
        }
    }

    /// Forward `data` on `channel`. Returns how many members it went to.
    pub async fn relay(&self, from: PlayerId, channel: String, data: Vec<u8>) -> usize {
        let global = self.config.current().mod_support.allow_global_updates;
        let Some(party) = self.membership.party_of(from).await else {
            return 0;
        };

        let recipients: Vec<PlayerId> = party
            .members
            .into_iter()
            .filter(|member| *member != from)
            .filter(|member| global || self.proximity.in_range(from, *member))
            .collect();
        if recipients.is_empty() {
            return 0;
        }

        let count = recipients.len();
        self.broadcaster.broadcast(
            recipients,
            ClientPayload::ModPacket {
                from,
                channel,
                data,
            },
        );
        count
    }
}
