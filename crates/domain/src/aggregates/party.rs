//! Party aggregate - a leader plus join-ordered members
//!
//! # Invariants
//!
//! - `1 <= members.len() <= max_size` after every successful mutation
//! - the leader is always a member
//! - members are kept in join order; the first remaining member inherits
//!   leadership when the leader leaves
//!
//! An aggregate that loses its last member reports
//! [`MemberRemoval::Emptied`]; the owner must drop it immediately.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PartyError, PartyId, PlayerId};

/// A member's join record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyMember {
    pub player_id: PlayerId,
    pub joined_at: DateTime<Utc>,
}

/// Outcome of removing a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRemoval {
    /// A non-leader left; nothing else changed
    Left,
    /// The leader left and the earliest-joined remaining member took over
    LeaderHandedOff { new_leader: PlayerId },
    /// The last member left; the party must be destroyed
    Emptied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    id: PartyId,
    leader: PlayerId,
    members: Vec<PartyMember>,
    friendly_fire: bool,
    created_at: DateTime<Utc>,
}

impl Party {
    /// Create a party whose only member is its leader.
    pub fn new(leader: PlayerId, friendly_fire: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: PartyId::new(),
            leader,
            members: vec![PartyMember {
                player_id: leader,
                joined_at: now,
            }],
            friendly_fire,
            created_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> PartyId {
        self.id
    }

    #[inline]
    pub fn leader(&self) -> PlayerId {
        self.leader
    }

    /// Members in join order.
    #[inline]
    pub fn members(&self) -> &[PartyMember] {
        &self.members
    }

    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.members.iter().map(|m| m.player_id).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.members.iter().any(|m| m.player_id == player)
    }

    pub fn is_leader(&self, player: PlayerId) -> bool {
        self.leader == player
    }

    #[inline]
    pub fn friendly_fire(&self) -> bool {
        self.friendly_fire
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Owned read snapshot.
    pub fn view(&self) -> PartyView {
        PartyView {
            id: self.id,
            leader: self.leader,
            members: self.member_ids(),
            friendly_fire: self.friendly_fire,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append a member at the end of the join order.
    ///
    /// # Errors
    ///
    /// - `AlreadyInParty` if the player is already a member
    /// - `PartyFull` if the party already holds `max_size` members
    pub fn add_member(
        &mut self,
        player: PlayerId,
        max_size: u32,
        now: DateTime<Utc>,
    ) -> Result<(), PartyError> {
        if self.contains(player) {
            return Err(PartyError::AlreadyInParty);
        }
        if self.members.len() >= max_size as usize {
            return Err(PartyError::party_full(max_size));
        }
        self.members.push(PartyMember {
            player_id: player,
            joined_at: now,
        });
        Ok(())
    }

    /// Remove a member, handing leadership to the earliest joiner if needed.
    pub fn remove_member(&mut self, player: PlayerId) -> Result<MemberRemoval, PartyError> {
        let index = self
            .members
            .iter()
            .position(|m| m.player_id == player)
            .ok_or(PartyError::NotMember)?;
        self.members.remove(index);

        let Some(first) = self.members.first() else {
            return Ok(MemberRemoval::Emptied);
        };
        if self.leader == player {
            self.leader = first.player_id;
            return Ok(MemberRemoval::LeaderHandedOff {
                new_leader: self.leader,
            });
        }
        Ok(MemberRemoval::Left)
    }

    /// Hand leadership from `requester` to `new_leader`.
    ///
    /// # Errors
    ///
    /// - `NotLeader` if `requester` does not lead the party
    /// - `NotMember` if `new_leader` is not in the party
    pub fn transfer_leader(
        &mut self,
        requester: PlayerId,
        new_leader: PlayerId,
    ) -> Result<PlayerId, PartyError> {
        if self.leader != requester {
            return Err(PartyError::NotLeader);
        }
        if !self.contains(new_leader) {
            return Err(PartyError::NotMember);
        }
        let previous = self.leader;
        self.leader = new_leader;
        Ok(previous)
    }
}

/// Read-only party snapshot handed out of the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyView {
    pub id: PartyId,
    pub leader: PlayerId,
    /// Join order
    pub members: Vec<PlayerId>,
    pub friendly_fire: bool,
}

impl PartyView {
    pub fn contains(&self, player: PlayerId) -> bool {
        self.members.contains(&player)
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn player(n: u128) -> PlayerId {
        PlayerId::from_uuid(Uuid::from_u128(n))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_party_has_leader_as_only_member() {
        let party = Party::new(player(1), false, t0());
        assert_eq!(party.leader(), player(1));
        assert_eq!(party.member_ids(), vec![player(1)]);
        assert!(!party.friendly_fire());
    }

    #[test]
    fn add_member_respects_capacity() {
        let mut party = Party::new(player(1), false, t0());
        party.add_member(player(2), 2, t0()).unwrap();

        let err = party.add_member(player(3), 2, t0()).unwrap_err();
        assert_eq!(err, PartyError::PartyFull { max: 2 });
        assert_eq!(party.len(), 2);
    }

    #[test]
    fn add_member_rejects_duplicates() {
        let mut party = Party::new(player(1), false, t0());
        assert_eq!(
            party.add_member(player(1), 5, t0()),
            Err(PartyError::AlreadyInParty)
        );
    }

    #[test]
    fn leader_removal_promotes_earliest_joiner() {
        let mut party = Party::new(player(9), false, t0());
        party.add_member(player(5), 5, t0() + Duration::seconds(1)).unwrap();
        party.add_member(player(1), 5, t0() + Duration::seconds(2)).unwrap();

        let outcome = party.remove_member(player(9)).unwrap();
        assert_eq!(
            outcome,
            MemberRemoval::LeaderHandedOff {
                new_leader: player(5)
            }
        );
        assert_eq!(party.leader(), player(5));
        assert_eq!(party.member_ids(), vec![player(5), player(1)]);
    }

    #[test]
    fn removing_last_member_empties_party() {
        let mut party = Party::new(player(1), false, t0());
        assert_eq!(party.remove_member(player(1)), Ok(MemberRemoval::Emptied));
        assert!(party.is_empty());
    }

    #[test]
    fn removing_stranger_fails() {
        let mut party = Party::new(player(1), false, t0());
        assert_eq!(party.remove_member(player(2)), Err(PartyError::NotMember));
    }

    #[test]
    fn transfer_leader_checks_requester_and_target() {
        let mut party = Party::new(player(1), false, t0());
        party.add_member(player(2), 5, t0()).unwrap();

        assert_eq!(
            party.transfer_leader(player(2), player(2)),
            Err(PartyError::NotLeader)
        );
        assert_eq!(
            party.transfer_leader(player(1), player(3)),
            Err(PartyError::NotMember)
        );
        assert_eq!(party.transfer_leader(player(1), player(2)), Ok(player(1)));
        assert!(party.is_leader(player(2)));
    }
}
