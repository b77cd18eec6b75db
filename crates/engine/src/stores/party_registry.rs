//! Authoritative party membership.
//!
//! Parties are indexed by id, and every member is indexed back to their party
//! so "which party is this player in" is a single lookup. Both maps change
//! together inside each method; callers only ever see them in agreement.
//!
//! A party id that no longer exists is reported as `NotMember`: nobody is a
//! member of a party that is gone.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parties_domain::{
    LeaveReason, MemberRemoval, Party, PartyError, PartyEvent, PartyId, PlayerId,
};

/// Reverse-index entry for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    pub party_id: PartyId,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct PartyRegistry {
    parties: HashMap<PartyId, Party>,
    members: HashMap<PlayerId, Membership>,
}

impl PartyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get(&self, party_id: PartyId) -> Option<&Party> {
        self.parties.get(&party_id)
    }

    /// The party `player` belongs to, if any.
    pub fn party_of(&self, player: PlayerId) -> Option<&Party> {
        self.members
            .get(&player)
            .and_then(|m| self.parties.get(&m.party_id))
    }

    pub fn membership(&self, player: PlayerId) -> Option<Membership> {
        self.members.get(&player).copied()
    }

    pub fn parties(&self) -> impl Iterator<Item = &Party> {
        self.parties.values()
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a party led by `leader`.
    ///
    /// # Errors
    ///
    /// `AlreadyInParty` if `leader` already belongs to a party.
    pub fn create_party(
        &mut self,
        leader: PlayerId,
        friendly_fire: bool,
        now: DateTime<Utc>,
    ) -> Result<PartyId, PartyError> {
        if self.members.contains_key(&leader) {
            return Err(PartyError::AlreadyInParty);
        }
        let party = Party::new(leader, friendly_fire, now);
        let party_id = party.id();
        self.members.insert(
            leader,
            Membership {
                party_id,
                joined_at: now,
            },
        );
        self.parties.insert(party_id, party);

        tracing::info!(party_id = %party_id, leader = %leader, "Party created");
        Ok(party_id)
    }

    /// Add `player` to an existing party.
    ///
    /// # Errors
    ///
    /// - `AlreadyInParty` if `player` belongs to any party
    /// - `PartyFull` if the party already holds `max_size` members
    /// - `NotMember` if the party no longer exists
    pub fn add_member(
        &mut self,
        party_id: PartyId,
        player: PlayerId,
        max_size: u32,
        now: DateTime<Utc>,
    ) -> Result<PartyEvent, PartyError> {
        if self.members.contains_key(&player) {
            return Err(PartyError::AlreadyInParty);
        }
        let party = self
            .parties
            .get_mut(&party_id)
            .ok_or(PartyError::NotMember)?;
        party.add_member(player, max_size, now)?;
        self.members.insert(
            player,
            Membership {
                party_id,
                joined_at: now,
            },
        );

        tracing::debug!(
            party_id = %party_id,
            player_id = %player,
            size = party.len(),
            "Member joined"
        );
        Ok(PartyEvent::MemberJoined {
            party_id,
            player_id: player,
        })
    }

    /// Remove `player`, handing off leadership or destroying the party as
    /// needed. Events are returned in the order they happened.
    ///
    /// # Errors
    ///
    /// `NotMember` if `player` is not in the party or the party is gone.
    pub fn remove_member(
        &mut self,
        party_id: PartyId,
        player: PlayerId,
        reason: LeaveReason,
    ) -> Result<Vec<PartyEvent>, PartyError> {
        let party = self
            .parties
            .get_mut(&party_id)
            .ok_or(PartyError::NotMember)?;
        let removal = party.remove_member(player)?;
        self.members.remove(&player);

        let mut events = vec![PartyEvent::MemberLeft {
            party_id,
            player_id: player,
            reason,
        }];
        match removal {
            MemberRemoval::Left => {
                tracing::debug!(party_id = %party_id, player_id = %player, ?reason, "Member left");
            }
            MemberRemoval::LeaderHandedOff { new_leader } => {
                tracing::info!(
                    party_id = %party_id,
                    previous = %player,
                    leader = %new_leader,
                    "Leader left; leadership handed to earliest member"
                );
                events.push(PartyEvent::LeaderChanged {
                    party_id,
                    previous: player,
                    leader: new_leader,
                });
            }
            MemberRemoval::Emptied => {
                self.parties.remove(&party_id);
                tracing::info!(party_id = %party_id, "Last member left; party disbanded");
                events.push(PartyEvent::PartyDisbanded {
                    party_id,
                    former_members: vec![player],
                });
            }
        }
        Ok(events)
    }

    /// Hand leadership from `requester` to `new_leader`.
    ///
    /// # Errors
    ///
    /// `NotLeader` if `requester` does not lead the party, `NotMember` if
    /// `new_leader` is not in it (or the party is gone).
    pub fn transfer_leader(
        &mut self,
        party_id: PartyId,
        requester: PlayerId,
        new_leader: PlayerId,
    ) -> Result<PartyEvent, PartyError> {
        let party = self
            .parties
            .get_mut(&party_id)
            .ok_or(PartyError::NotMember)?;
        let previous = party.transfer_leader(requester, new_leader)?;

        tracing::info!(
            party_id = %party_id,
            previous = %previous,
            leader = %new_leader,
            "Leader changed"
        );
        Ok(PartyEvent::LeaderChanged {
            party_id,
            previous,
            leader: new_leader,
        })
    }

    /// Destroy a party and release all of its members.
    ///
    /// # Errors
    ///
    /// `NotMember` if the party does not exist.
    pub fn disband(&mut self, party_id: PartyId) -> Result<PartyEvent, PartyError> {
        let party = self
            .parties
            .remove(&party_id)
            .ok_or(PartyError::NotMember)?;
        let former_members = party.member_ids();
        for member in &former_members {
            self.members.remove(member);
        }

        tracing::info!(party_id = %party_id, members = former_members.len(), "Party disbanded");
        Ok(PartyEvent::PartyDisbanded {
            party_id,
            former_members,
        })
    }

    /// Panics if the forward and reverse indexes disagree or a party breaks
    /// its size or leader rules.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self, max_size: u32) {
        let mut seen = std::collections::HashSet::new();
        for party in self.parties.values() {
            assert!(!party.is_empty(), "empty party {} kept", party.id());
            assert!(party.len() <= max_size as usize, "party over capacity");
            assert!(party.contains(party.leader()), "leader not a member");
            for member in party.member_ids() {
                assert!(seen.insert(member), "player {member} in two parties");
                assert_eq!(
                    self.members.get(&member).map(|m| m.party_id),
                    Some(party.id()),
                    "reverse index disagrees for {member}"
                );
            }
        }
        assert_eq!(seen.len(), self.members.len(), "stale reverse index entries");
    }
}
