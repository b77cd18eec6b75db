//! Pending party invite
//!
//! An invite is keyed by its (inviter, invitee) pair; at most one can be
//! outstanding per pair. The target party is recorded when the inviter
//! already leads or belongs to one. A partyless inviter's invite carries no
//! target and the party is formed when the invite is accepted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{PartyId, PlayerId};

/// Identity of an invite: who asked whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InviteKey {
    pub inviter: PlayerId,
    pub invitee: PlayerId,
}

impl InviteKey {
    pub fn new(inviter: PlayerId, invitee: PlayerId) -> Self {
        Self { inviter, invitee }
    }

    /// True if `player` is on either side of the invite.
    pub fn involves(&self, player: PlayerId) -> bool {
        self.inviter == player || self.invitee == player
    }
}

/// A time-bounded proposal for one player to join another's party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    key: InviteKey,
    target: Option<PartyId>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Invite {
    /// Create an invite that lapses `accept_window` after `now`.
    pub fn new(
        key: InviteKey,
        target: Option<PartyId>,
        now: DateTime<Utc>,
        accept_window: Duration,
    ) -> Self {
        Self {
            key,
            target,
            created_at: now,
            expires_at: now + accept_window,
        }
    }

    #[inline]
    pub fn key(&self) -> InviteKey {
        self.key
    }

    #[inline]
    pub fn inviter(&self) -> PlayerId {
        self.key.inviter
    }

    #[inline]
    pub fn invitee(&self) -> PlayerId {
        self.key.invitee
    }

    /// The party the invitee will join, if the inviter had one when inviting.
    #[inline]
    pub fn target(&self) -> Option<PartyId> {
        self.target
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// An invite is dead from its expiry instant onward.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
