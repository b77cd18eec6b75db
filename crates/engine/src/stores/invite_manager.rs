//! Pending invite state.
//!
//! Invites are stored by (inviter, invitee) and indexed a second time by
//! expiry so the per-tick sweep only touches invites that are actually due.
//! The sequence number keeps index keys unique when two invites share an
//! expiry instant.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use parties_domain::{Invite, InviteKey, PartyError, PlayerId};

type ExpiryKey = (DateTime<Utc>, u64);

#[derive(Debug, Default)]
pub struct InviteManager {
    invites: HashMap<InviteKey, (Invite, ExpiryKey)>,
    by_expiry: BTreeMap<ExpiryKey, InviteKey>,
    next_seq: u64,
}

impl InviteManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new invite.
    ///
    /// An expired invite for the same pair that the sweep has not reached yet
    /// is replaced.
    ///
    /// # Errors
    ///
    /// `AlreadyInvited` if a live invite exists for the pair. The existing
    /// invite is left untouched.
    pub fn insert(&mut self, invite: Invite, now: DateTime<Utc>) -> Result<(), PartyError> {
        let key = invite.key();
        if let Some((existing, _)) = self.invites.get(&key) {
            if !existing.is_expired(now) {
                return Err(PartyError::AlreadyInvited);
            }
            self.take(key);
        }

        let expiry = (invite.expires_at(), self.next_seq);
        self.next_seq = self.next_seq.wrapping_add(1);
        self.by_expiry.insert(expiry, key);
        self.invites.insert(key, (invite, expiry));
        Ok(())
    }

    pub fn get(&self, key: InviteKey) -> Option<&Invite> {
        self.invites.get(&key).map(|(invite, _)| invite)
    }

    /// True if a live invite exists for the pair at `now`.
    pub fn is_pending(&self, key: InviteKey, now: DateTime<Utc>) -> bool {
        self.get(key).is_some_and(|invite| !invite.is_expired(now))
    }

    /// Remove and return an invite.
    pub fn take(&mut self, key: InviteKey) -> Option<Invite> {
        let (invite, expiry) = self.invites.remove(&key)?;
        self.by_expiry.remove(&expiry);
        Some(invite)
    }

    /// Remove every invite whose expiry is at or before `now`, oldest first.
    pub fn expire_due(&mut self, now: DateTime<Utc>) -> Vec<Invite> {
        let mut expired = Vec::new();
        while let Some(entry) = self.by_expiry.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let key = entry.remove();
            if let Some((invite, _)) = self.invites.remove(&key) {
                expired.push(invite);
            }
        }
        expired
    }

    /// Remove every invite `player` sent or received.
    pub fn remove_involving(&mut self, player: PlayerId) -> Vec<Invite> {
        let keys: Vec<InviteKey> = self
            .invites
            .keys()
            .filter(|key| key.involves(player))
            .copied()
            .collect();
        let mut removed: Vec<Invite> = keys.into_iter().filter_map(|k| self.take(k)).collect();
        removed.sort_by_key(|invite| invite.created_at());
        removed
    }

    /// Invites waiting on `invitee`, oldest first.
    pub fn pending_for(&self, invitee: PlayerId) -> Vec<Invite> {
        let mut pending: Vec<Invite> = self
            .invites
            .values()
            .filter(|(invite, _)| invite.invitee() == invitee)
            .map(|(invite, _)| invite.clone())
            .collect();
        pending.sort_by_key(|invite| invite.created_at());
        pending
    }

    pub fn len(&self) -> usize {
        self.invites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invites.is_empty()
    }
}
