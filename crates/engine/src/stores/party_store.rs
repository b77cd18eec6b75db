//! Party store - the single serialization point for membership and invites.
//!
//! Every mutation takes one write guard over the registry and the invite
//! manager together, runs to completion, and only then hands its notices to
//! the broadcaster. Reads take one read guard and return owned snapshots, so
//! a reader never observes a half-applied change.
//!
//! While external teams are enabled, every player-issued mutation fails with
//! `ExternalTeamsActive`. The expiry sweep and disconnect cleanup still run.
//!
//! With `use_vanilla_teams` on and a [`TeamMirror`] attached, membership
//! changes are replayed into the host's team system after the guard drops.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parties_domain::{
    Invite, InviteClosed, InviteKey, LeaveReason, Party, PartyConfig, PartyError, PartyEvent,
    PartyId, PartyView, PlayerId,
};
use tokio::sync::RwLock;

use super::invite_manager::InviteManager;
use super::party_registry::PartyRegistry;
use crate::infrastructure::config::ConfigHandle;
use crate::infrastructure::ports::{ClockPort, NetworkBroadcaster, Outbound, TeamMirror};

pub struct PartyStore {
    state: RwLock<PartyState>,
    clock: Arc<dyn ClockPort>,
    config: ConfigHandle,
    broadcaster: Arc<dyn NetworkBroadcaster>,
    team_mirror: Option<Arc<dyn TeamMirror>>,
}

impl PartyStore {
    pub fn new(
        clock: Arc<dyn ClockPort>,
        config: ConfigHandle,
        broadcaster: Arc<dyn NetworkBroadcaster>,
    ) -> Self {
        Self {
            state: RwLock::new(PartyState::default()),
            clock,
            config,
            broadcaster,
            team_mirror: None,
        }
    }

    pub fn with_team_mirror(mut self, mirror: Arc<dyn TeamMirror>) -> Self {
        self.team_mirror = Some(mirror);
        self
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Create a party led by `leader`.
    pub async fn create_party(&self, leader: PlayerId) -> Result<PartyView, PartyError> {
        self.mutate(Gate::PlayerCommand, |state, tx| state.create(leader, tx))
            .await
    }

    /// Invite `invitee` to the inviter's party (or to a party formed on accept).
    pub async fn send_invite(
        &self,
        inviter: PlayerId,
        invitee: PlayerId,
    ) -> Result<Invite, PartyError> {
        self.mutate(Gate::PlayerCommand, |state, tx| {
            state.invite(inviter, invitee, tx)
        })
        .await
    }

    /// Accept the invite `inviter` sent to `invitee`.
    pub async fn accept_invite(
        &self,
        invitee: PlayerId,
        inviter: PlayerId,
    ) -> Result<PartyView, PartyError> {
        self.mutate(Gate::PlayerCommand, |state, tx| {
            state.accept(invitee, inviter, tx)
        })
        .await
    }

    pub async fn decline_invite(
        &self,
        invitee: PlayerId,
        inviter: PlayerId,
    ) -> Result<(), PartyError> {
        self.mutate(Gate::PlayerCommand, |state, tx| {
            state.close_invite(InviteKey::new(inviter, invitee), InviteClosed::Declined, tx)
        })
        .await
    }

    /// Withdraw an invite `inviter` sent.
    pub async fn cancel_invite(
        &self,
        inviter: PlayerId,
        invitee: PlayerId,
    ) -> Result<(), PartyError> {
        self.mutate(Gate::PlayerCommand, |state, tx| {
            state.close_invite(InviteKey::new(inviter, invitee), InviteClosed::Cancelled, tx)
        })
        .await
    }

    pub async fn leave(&self, player: PlayerId) -> Result<Vec<PartyEvent>, PartyError> {
        self.mutate(Gate::PlayerCommand, |state, tx| {
            state.remove(player, player, LeaveReason::Left, tx)
        })
        .await
    }

    /// Leader removes `target`. Kicking yourself is the same as leaving.
    pub async fn kick(
        &self,
        requester: PlayerId,
        target: PlayerId,
    ) -> Result<Vec<PartyEvent>, PartyError> {
        self.mutate(Gate::PlayerCommand, |state, tx| {
            state.remove(requester, target, LeaveReason::Kicked, tx)
        })
        .await
    }

    pub async fn promote(
        &self,
        requester: PlayerId,
        new_leader: PlayerId,
    ) -> Result<PartyView, PartyError> {
        self.mutate(Gate::PlayerCommand, |state, tx| {
            state.promote(requester, new_leader, tx)
        })
        .await
    }

    /// Leader destroys the party. Returns the former members.
    pub async fn disband(&self, requester: PlayerId) -> Result<Vec<PlayerId>, PartyError> {
        self.mutate(Gate::PlayerCommand, |state, tx| state.disband(requester, tx))
            .await
    }

    // =========================================================================
    // Housekeeping
    // =========================================================================

    /// Remove every invite whose deadline has passed. Returns how many went.
    pub async fn expire_invites(&self) -> usize {
        let swept = self
            .mutate(Gate::Always, |state, tx| {
                let expired = state.invites.expire_due(tx.now);
                for invite in &expired {
                    tx.events.push(PartyEvent::InviteClosed {
                        inviter: invite.inviter(),
                        invitee: invite.invitee(),
                        reason: InviteClosed::Expired,
                    });
                }
                Ok(expired.len())
            })
            .await;
        let count = swept.unwrap_or_default();
        if count > 0 {
            tracing::debug!(count, "Expired invites swept");
        }
        count
    }

    /// Drop every invite `player` sent or received, e.g. on disconnect.
    pub async fn drop_invites_for(&self, player: PlayerId) -> usize {
        let dropped = self
            .mutate(Gate::Always, |state, tx| {
                let removed = state.invites.remove_involving(player);
                for invite in &removed {
                    tx.events.push(PartyEvent::InviteClosed {
                        inviter: invite.inviter(),
                        invitee: invite.invitee(),
                        reason: InviteClosed::Withdrawn,
                    });
                }
                Ok(removed.len())
            })
            .await;
        dropped.unwrap_or_default()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn party_of(&self, player: PlayerId) -> Option<PartyView> {
        let state = self.state.read().await;
        state.registry.party_of(player).map(Party::view)
    }

    pub async fn party(&self, party_id: PartyId) -> Option<PartyView> {
        let state = self.state.read().await;
        state.registry.get(party_id).map(Party::view)
    }

    /// Snapshot of every party.
    pub async fn parties(&self) -> Vec<PartyView> {
        let state = self.state.read().await;
        state.registry.parties().map(Party::view).collect()
    }

    /// Invites waiting on `invitee`, oldest first.
    pub async fn pending_invites(&self, invitee: PlayerId) -> Vec<Invite> {
        let state = self.state.read().await;
        state.invites.pending_for(invitee)
    }

    pub async fn invite_count(&self) -> usize {
        self.state.read().await.invites.len()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Run `op` under the write guard with one config snapshot and one clock
    /// reading, then broadcast whatever notices it recorded. Notices are sent
    /// even when `op` fails part way (e.g. an expired invite being cleaned up).
    async fn mutate<T, F>(&self, gate: Gate, op: F) -> Result<T, PartyError>
    where
        F: FnOnce(&mut PartyState, &mut Transition<'_>) -> Result<T, PartyError>,
    {
        let config = self.config.current();
        if gate == Gate::PlayerCommand && config.external_teams() {
            return Err(PartyError::ExternalTeamsActive);
        }

        let mut tx = Transition {
            config: &config,
            now: self.clock.now(),
            events: Vec::new(),
        };
        let mirror = self
            .team_mirror
            .as_ref()
            .filter(|_| config.vanilla_teams());
        let (result, outbound, mirrored) = {
            let mut state = self.state.write().await;
            let result = op(&mut *state, &mut tx);
            let mirrored = match mirror {
                Some(_) => tx.events.clone(),
                None => Vec::new(),
            };
            let outbound = address(&state.registry, tx.events);
            (result, outbound, mirrored)
        };

        for Outbound {
            recipients,
            payload,
        } in outbound
        {
            self.broadcaster.broadcast(recipients, payload);
        }
        if let Some(mirror) = mirror {
            for event in mirrored {
                mirror_into(&**mirror, event);
            }
        }
        result
    }
}

/// Replay one membership change into the host's team system.
fn mirror_into(mirror: &dyn TeamMirror, event: PartyEvent) {
    match event {
        PartyEvent::PartyCreated { party_id, leader } => mirror.member_joined(party_id, leader),
        PartyEvent::MemberJoined {
            party_id,
            player_id,
        } => mirror.member_joined(party_id, player_id),
        PartyEvent::MemberLeft {
            party_id,
            player_id,
            ..
        } => mirror.member_left(party_id, player_id),
        PartyEvent::PartyDisbanded {
            party_id,
            former_members,
        } => mirror.party_disbanded(party_id, former_members),
        PartyEvent::LeaderChanged { .. }
        | PartyEvent::InviteReceived { .. }
        | PartyEvent::InviteClosed { .. } => {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// Disabled while external teams own membership
    PlayerCommand,
    Always,
}

/// Per-mutation context: the config snapshot, the instant, and the notices
/// produced so far.
struct Transition<'a> {
    config: &'a PartyConfig,
    now: DateTime<Utc>,
    events: Vec<PartyEvent>,
}

#[derive(Default)]
struct PartyState {
    registry: PartyRegistry,
    invites: InviteManager,
}

impl PartyState {
    fn create(
        &mut self,
        leader: PlayerId,
        tx: &mut Transition<'_>,
    ) -> Result<PartyView, PartyError> {
        let party_id = self
            .registry
            .create_party(leader, tx.config.mechanics.friendly_fire, tx.now)?;
        tx.events.push(PartyEvent::PartyCreated { party_id, leader });
        self.view(party_id)
    }

    fn invite(
        &mut self,
        inviter: PlayerId,
        invitee: PlayerId,
        tx: &mut Transition<'_>,
    ) -> Result<Invite, PartyError> {
        if inviter == invitee {
            return Err(PartyError::SelfInvite);
        }
        let key = InviteKey::new(inviter, invitee);
        let target = match self.registry.party_of(inviter) {
            Some(party) if party.contains(invitee) => return Err(PartyError::AlreadyInParty),
            Some(party) => Some(party),
            None => None,
        };
        if self.invites.is_pending(key, tx.now) {
            return Err(PartyError::AlreadyInvited);
        }
        // A partyless inviter counts as a party of one.
        let max = tx.config.max_party_size();
        if let Some(party) = target {
            if party.len() >= max as usize {
                return Err(PartyError::party_full(max));
            }
        }

        let invite = Invite::new(
            key,
            target.map(Party::id),
            tx.now,
            tx.config.accept_window(),
        );
        self.invites.insert(invite.clone(), tx.now)?;
        tx.events.push(PartyEvent::InviteReceived {
            inviter,
            invitee,
            expires_in_secs: tx.config.timers.player_accept_timer,
        });

        tracing::debug!(inviter = %inviter, invitee = %invitee, "Invite sent");
        Ok(invite)
    }

    fn accept(
        &mut self,
        invitee: PlayerId,
        inviter: PlayerId,
        tx: &mut Transition<'_>,
    ) -> Result<PartyView, PartyError> {
        let key = InviteKey::new(inviter, invitee);
        let invite = self
            .invites
            .get(key)
            .cloned()
            .ok_or(PartyError::NoSuchInvite)?;

        if invite.is_expired(tx.now) {
            self.invites.take(key);
            tx.events.push(PartyEvent::InviteClosed {
                inviter,
                invitee,
                reason: InviteClosed::Expired,
            });
            return Err(PartyError::InviteExpired);
        }
        // Keep the invite so the player can leave their party and retry.
        if self.registry.membership(invitee).is_some() {
            return Err(PartyError::AlreadyInParty);
        }

        let current = self.registry.party_of(inviter).map(Party::id);
        let party_id = match (invite.target(), current) {
            (Some(target), Some(current)) if target == current => current,
            (None, Some(current)) => current,
            (None, None) => {
                let party_id = self.registry.create_party(
                    inviter,
                    tx.config.mechanics.friendly_fire,
                    tx.now,
                )?;
                tx.events.push(PartyEvent::PartyCreated {
                    party_id,
                    leader: inviter,
                });
                party_id
            }
            (Some(target), _) => {
                self.invites.take(key);
                tx.events.push(PartyEvent::InviteClosed {
                    inviter,
                    invitee,
                    reason: InviteClosed::Withdrawn,
                });
                tracing::warn!(
                    inviter = %inviter,
                    invitee = %invitee,
                    party_id = %target,
                    "Invite refers to a party the inviter no longer belongs to; dropping it"
                );
                return Err(PartyError::NoSuchInvite);
            }
        };

        let joined = self
            .registry
            .add_member(party_id, invitee, tx.config.max_party_size(), tx.now)?;
        self.invites.take(key);
        tx.events.push(joined);

        tracing::debug!(
            inviter = %inviter,
            invitee = %invitee,
            party_id = %party_id,
            "Invite accepted"
        );
        self.view(party_id)
    }

    fn close_invite(
        &mut self,
        key: InviteKey,
        reason: InviteClosed,
        tx: &mut Transition<'_>,
    ) -> Result<(), PartyError> {
        self.invites.take(key).ok_or(PartyError::NoSuchInvite)?;
        tx.events.push(PartyEvent::InviteClosed {
            inviter: key.inviter,
            invitee: key.invitee,
            reason,
        });
        tracing::debug!(
            inviter = %key.inviter,
            invitee = %key.invitee,
            ?reason,
            "Invite closed"
        );
        Ok(())
    }

    fn remove(
        &mut self,
        requester: PlayerId,
        target: PlayerId,
        reason: LeaveReason,
        tx: &mut Transition<'_>,
    ) -> Result<Vec<PartyEvent>, PartyError> {
        let party = self
            .registry
            .party_of(requester)
            .ok_or(PartyError::NotMember)?;
        let party_id = party.id();
        let reason = if requester == target {
            LeaveReason::Left
        } else {
            if !party.is_leader(requester) {
                return Err(PartyError::NotLeader);
            }
            if !party.contains(target) {
                return Err(PartyError::NotMember);
            }
            reason
        };

        let events = self.registry.remove_member(party_id, target, reason)?;
        tx.events.extend(events.iter().cloned());
        Ok(events)
    }

    fn promote(
        &mut self,
        requester: PlayerId,
        new_leader: PlayerId,
        tx: &mut Transition<'_>,
    ) -> Result<PartyView, PartyError> {
        let party_id = self
            .registry
            .party_of(requester)
            .map(Party::id)
            .ok_or(PartyError::NotMember)?;
        let changed = self
            .registry
            .transfer_leader(party_id, requester, new_leader)?;
        tx.events.push(changed);
        self.view(party_id)
    }

    fn disband(
        &mut self,
        requester: PlayerId,
        tx: &mut Transition<'_>,
    ) -> Result<Vec<PlayerId>, PartyError> {
        let party = self
            .registry
            .party_of(requester)
            .ok_or(PartyError::NotMember)?;
        if !party.is_leader(requester) {
            return Err(PartyError::NotLeader);
        }
        let party_id = party.id();
        let event = self.registry.disband(party_id)?;
        let former_members = match &event {
            PartyEvent::PartyDisbanded { former_members, .. } => former_members.clone(),
            _ => Vec::new(),
        };
        tx.events.push(event);
        Ok(former_members)
    }

    fn view(&self, party_id: PartyId) -> Result<PartyView, PartyError> {
        self.registry
            .get(party_id)
            .map(Party::view)
            .ok_or(PartyError::NotMember)
    }
}

/// Address each notice to the players it names plus the party's current
/// members, without duplicates.
fn address(registry: &PartyRegistry, events: Vec<PartyEvent>) -> Vec<Outbound> {
    events
        .into_iter()
        .map(|event| {
            let mut recipients = event.involved_players();
            if let Some(party) = event.party_id().and_then(|id| registry.get(id)) {
                for member in party.member_ids() {
                    if !recipients.contains(&member) {
                        recipients.push(member);
                    }
                }
            }
            Outbound::new(recipients, event)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, ManualClock};
    use crate::infrastructure::ports::{MockNetworkBroadcaster, MockTeamMirror};
    use crate::test_fixtures::{
        default_handle, handle_with, manual_clock, player, t0, RecordingBroadcaster,
    };
    use chrono::Duration;

    struct Harness {
        store: Arc<PartyStore>,
        clock: Arc<ManualClock>,
        broadcasts: Arc<RecordingBroadcaster>,
        config: ConfigHandle,
    }

    fn harness() -> Harness {
        harness_with(default_handle())
    }

    fn harness_with(config: ConfigHandle) -> Harness {
        let clock = manual_clock();
        let broadcasts = RecordingBroadcaster::new();
        let store = Arc::new(PartyStore::new(
            clock.clone(),
            config.clone(),
            broadcasts.clone(),
        ));
        Harness {
            store,
            clock,
            broadcasts,
            config,
        }
    }

    /// Party led by `members[0]` with the rest joined via invites.
    async fn party_of(h: &Harness, members: &[u128]) -> PartyView {
        let leader = player(members[0]);
        let mut view = h.store.create_party(leader).await.unwrap();
        for n in &members[1..] {
            h.store.send_invite(leader, player(*n)).await.unwrap();
            view = h.store.accept_invite(player(*n), leader).await.unwrap();
        }
        view
    }

    #[tokio::test]
    async fn accepting_invite_between_partyless_players_forms_a_party() {
        let h = harness();
        let invite = h.store.send_invite(player(1), player(2)).await.unwrap();
        assert_eq!(invite.target(), None);
        assert_eq!(invite.expires_at(), t0() + Duration::seconds(30));

        let view = h.store.accept_invite(player(2), player(1)).await.unwrap();
        assert_eq!(view.leader, player(1));
        assert_eq!(view.members, vec![player(1), player(2)]);
        assert_eq!(h.store.invite_count().await, 0);

        let notices = h.broadcasts.notices();
        assert!(matches!(notices[0], PartyEvent::InviteReceived { .. }));
        assert!(matches!(notices[1], PartyEvent::PartyCreated { .. }));
        assert!(matches!(notices[2], PartyEvent::MemberJoined { .. }));
    }

    #[tokio::test]
    async fn self_invite_is_rejected() {
        let h = harness();
        assert_eq!(
            h.store.send_invite(player(1), player(1)).await,
            Err(PartyError::SelfInvite)
        );
    }

    #[tokio::test]
    async fn duplicate_invite_keeps_original_expiry() {
        let h = harness();
        h.store.send_invite(player(1), player(2)).await.unwrap();
        h.clock.advance(Duration::seconds(10));

        assert_eq!(
            h.store.send_invite(player(1), player(2)).await,
            Err(PartyError::AlreadyInvited)
        );
        let pending = h.store.pending_invites(player(2)).await;
        assert_eq!(pending[0].expires_at(), t0() + Duration::seconds(30));
    }

    #[tokio::test]
    async fn invite_from_full_party_fails() {
        let h = harness_with(handle_with(|c| c.mechanics.party_size = 2));
        party_of(&h, &[1, 2]).await;

        assert_eq!(
            h.store.send_invite(player(1), player(3)).await,
            Err(PartyError::PartyFull { max: 2 })
        );
    }

    #[tokio::test]
    async fn inviting_an_existing_member_fails() {
        let h = harness();
        party_of(&h, &[1, 2]).await;
        assert_eq!(
            h.store.send_invite(player(1), player(2)).await,
            Err(PartyError::AlreadyInParty)
        );
    }

    #[tokio::test]
    async fn accept_after_deadline_reports_expired_and_removes_invite() {
        let h = harness();
        h.store.send_invite(player(1), player(2)).await.unwrap();
        h.clock.advance(Duration::seconds(30));

        assert_eq!(
            h.store.accept_invite(player(2), player(1)).await,
            Err(PartyError::InviteExpired)
        );
        assert_eq!(
            h.store.accept_invite(player(2), player(1)).await,
            Err(PartyError::NoSuchInvite)
        );
    }

    #[tokio::test]
    async fn accept_while_in_another_party_keeps_invite() {
        let h = harness();
        h.store.send_invite(player(1), player(2)).await.unwrap();
        h.store.create_party(player(2)).await.unwrap();

        assert_eq!(
            h.store.accept_invite(player(2), player(1)).await,
            Err(PartyError::AlreadyInParty)
        );
        h.store.leave(player(2)).await.unwrap();
        h.store.accept_invite(player(2), player(1)).await.unwrap();
    }

    #[tokio::test]
    async fn invite_to_a_party_the_inviter_left_is_stale() {
        let h = harness();
        party_of(&h, &[1, 2]).await;
        h.store.send_invite(player(2), player(3)).await.unwrap();
        h.store.leave(player(2)).await.unwrap();

        assert_eq!(
            h.store.accept_invite(player(3), player(2)).await,
            Err(PartyError::NoSuchInvite)
        );
        assert_eq!(h.store.invite_count().await, 0);

        let recipients = h
            .broadcasts
            .recipients_of(|e| {
                matches!(
                    e,
                    PartyEvent::InviteClosed {
                        reason: InviteClosed::Withdrawn,
                        ..
                    }
                )
            })
            .unwrap();
        assert_eq!(recipients, vec![player(2), player(3)]);
    }

    #[tokio::test]
    async fn sweep_removes_only_due_invites_and_notifies_both_sides() {
        let h = harness();
        h.store.send_invite(player(1), player(2)).await.unwrap();
        h.clock.advance(Duration::seconds(20));
        h.store.send_invite(player(3), player(4)).await.unwrap();

        h.clock.advance(Duration::seconds(10));
        assert_eq!(h.store.expire_invites().await, 1);
        assert_eq!(h.store.invite_count().await, 1);

        let recipients = h
            .broadcasts
            .recipients_of(|e| {
                matches!(
                    e,
                    PartyEvent::InviteClosed {
                        reason: InviteClosed::Expired,
                        ..
                    }
                )
            })
            .unwrap();
        assert_eq!(recipients, vec![player(1), player(2)]);
    }

    #[tokio::test]
    async fn decline_and_cancel_remove_without_joining() {
        let h = harness();
        h.store.send_invite(player(1), player(2)).await.unwrap();
        h.store.send_invite(player(1), player(3)).await.unwrap();

        h.store.decline_invite(player(2), player(1)).await.unwrap();
        h.store.cancel_invite(player(1), player(3)).await.unwrap();

        assert_eq!(h.store.invite_count().await, 0);
        assert!(h.store.party_of(player(2)).await.is_none());
        assert_eq!(
            h.store.decline_invite(player(2), player(1)).await,
            Err(PartyError::NoSuchInvite)
        );
    }

    #[tokio::test]
    async fn leader_leaving_hands_off_to_earliest_joined() {
        let h = harness();
        let view = party_of(&h, &[1, 2, 3]).await;

        h.store.leave(player(1)).await.unwrap();
        let after = h.store.party(view.id).await.unwrap();
        assert_eq!(after.leader, player(2));
        assert_eq!(after.members, vec![player(2), player(3)]);

        // The leaver still hears about the handoff.
        let recipients = h
            .broadcasts
            .recipients_of(|e| matches!(e, PartyEvent::LeaderChanged { .. }))
            .unwrap();
        assert!(recipients.contains(&player(1)));
        assert!(recipients.contains(&player(3)));
    }

    #[tokio::test]
    async fn kick_requires_leader_and_member() {
        let h = harness();
        party_of(&h, &[1, 2, 3]).await;

        assert_eq!(
            h.store.kick(player(2), player(3)).await,
            Err(PartyError::NotLeader)
        );
        assert_eq!(
            h.store.kick(player(1), player(9)).await,
            Err(PartyError::NotMember)
        );

        let events = h.store.kick(player(1), player(3)).await.unwrap();
        assert!(matches!(
            events[0],
            PartyEvent::MemberLeft {
                reason: LeaveReason::Kicked,
                ..
            }
        ));
        assert!(h.store.party_of(player(3)).await.is_none());
    }

    #[tokio::test]
    async fn kicking_yourself_is_leaving() {
        let h = harness();
        party_of(&h, &[1, 2]).await;

        let events = h.store.kick(player(2), player(2)).await.unwrap();
        assert!(matches!(
            events[0],
            PartyEvent::MemberLeft {
                reason: LeaveReason::Left,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn last_member_leaving_disbands() {
        let h = harness();
        let view = h.store.create_party(player(1)).await.unwrap();

        let events = h.store.leave(player(1)).await.unwrap();
        assert!(matches!(events.last(), Some(PartyEvent::PartyDisbanded { .. })));
        assert!(h.store.party(view.id).await.is_none());
    }

    #[tokio::test]
    async fn disband_is_leader_only() {
        let h = harness();
        party_of(&h, &[1, 2]).await;

        assert_eq!(h.store.disband(player(2)).await, Err(PartyError::NotLeader));
        let former = h.store.disband(player(1)).await.unwrap();
        assert_eq!(former, vec![player(1), player(2)]);
        assert!(h.store.parties().await.is_empty());
    }

    #[tokio::test]
    async fn promote_transfers_leadership() {
        let h = harness();
        party_of(&h, &[1, 2]).await;

        let view = h.store.promote(player(1), player(2)).await.unwrap();
        assert_eq!(view.leader, player(2));
        assert_eq!(
            h.store.promote(player(1), player(2)).await,
            Err(PartyError::NotLeader)
        );
    }

    #[tokio::test]
    async fn new_parties_take_friendly_fire_from_config() {
        let h = harness_with(handle_with(|c| c.mechanics.friendly_fire = true));
        let view = h.store.create_party(player(1)).await.unwrap();
        assert!(view.friendly_fire);
    }

    #[tokio::test]
    async fn mutations_are_disabled_under_external_teams() {
        let h = harness();
        h.store.send_invite(player(1), player(2)).await.unwrap();

        let mut external = PartyConfig::default();
        external.mod_support.use_external_teams = true;
        h.config.replace(external).unwrap();

        assert_eq!(
            h.store.create_party(player(3)).await,
            Err(PartyError::ExternalTeamsActive)
        );
        assert_eq!(
            h.store.accept_invite(player(2), player(1)).await,
            Err(PartyError::ExternalTeamsActive)
        );
        assert_eq!(
            h.store.leave(player(1)).await,
            Err(PartyError::ExternalTeamsActive)
        );

        // Housekeeping still runs.
        h.clock.advance(Duration::seconds(30));
        assert_eq!(h.store.expire_invites().await, 1);
    }

    #[tokio::test]
    async fn disconnect_drops_invites_on_both_sides() {
        let h = harness();
        h.store.send_invite(player(1), player(2)).await.unwrap();
        h.store.send_invite(player(3), player(1)).await.unwrap();
        h.store.send_invite(player(3), player(4)).await.unwrap();

        assert_eq!(h.store.drop_invites_for(player(1)).await, 2);
        assert_eq!(h.store.invite_count().await, 1);
    }

    #[tokio::test]
    async fn failed_command_broadcasts_nothing() {
        let mut broadcaster = MockNetworkBroadcaster::new();
        broadcaster.expect_broadcast().never();
        let store = PartyStore::new(
            Arc::new(FixedClock(t0())),
            default_handle(),
            Arc::new(broadcaster),
        );

        assert_eq!(store.leave(player(1)).await, Err(PartyError::NotMember));
        assert_eq!(
            store.send_invite(player(1), player(1)).await,
            Err(PartyError::SelfInvite)
        );
    }

    fn mirrored_store(config: ConfigHandle, mirror: MockTeamMirror) -> PartyStore {
        PartyStore::new(
            Arc::new(FixedClock(t0())),
            config,
            RecordingBroadcaster::new(),
        )
        .with_team_mirror(Arc::new(mirror))
    }

    #[tokio::test]
    async fn vanilla_team_mirror_follows_membership() {
        let mut mirror = MockTeamMirror::new();
        mirror
            .expect_member_joined()
            .withf(|_, p| *p == player(1))
            .times(1)
            .return_const(());
        mirror
            .expect_member_joined()
            .withf(|_, p| *p == player(2))
            .times(1)
            .return_const(());
        mirror
            .expect_member_left()
            .withf(|_, p| *p == player(2))
            .times(1)
            .return_const(());
        mirror
            .expect_party_disbanded()
            .withf(|_, members| members == &vec![player(1)])
            .times(1)
            .return_const(());
        let store = mirrored_store(default_handle(), mirror);

        store.create_party(player(1)).await.unwrap();
        store.send_invite(player(1), player(2)).await.unwrap();
        store.accept_invite(player(2), player(1)).await.unwrap();
        store.kick(player(1), player(2)).await.unwrap();
        store.disband(player(1)).await.unwrap();
    }

    #[tokio::test]
    async fn vanilla_team_mirror_is_idle_when_disabled() {
        let mut mirror = MockTeamMirror::new();
        mirror.expect_member_joined().never();
        mirror.expect_member_left().never();
        mirror.expect_party_disbanded().never();
        let config = handle_with(|c| c.mechanics.use_vanilla_teams = false);
        let store = mirrored_store(config, mirror);

        store.send_invite(player(1), player(2)).await.unwrap();
        store.accept_invite(player(2), player(1)).await.unwrap();
        store.leave(player(2)).await.unwrap();
        store.disband(player(1)).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_accepts_put_player_in_exactly_one_party() {
        let h = harness();
        for inviter in 1..=4 {
            h.store.create_party(player(inviter)).await.unwrap();
            h.store.send_invite(player(inviter), player(10)).await.unwrap();
        }

        let mut handles = Vec::new();
        for inviter in 1..=4 {
            let store = h.store.clone();
            handles.push(tokio::spawn(async move {
                store.accept_invite(player(10), player(inviter)).await
            }));
        }
        let mut joined = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                joined += 1;
            }
        }

        assert_eq!(joined, 1);
        let containing: Vec<_> = h
            .store
            .parties()
            .await
            .into_iter()
            .filter(|p| p.contains(player(10)))
            .collect();
        assert_eq!(containing.len(), 1);
    }
}
