//! Friendly-fire gate for player-vs-player damage.

use std::sync::Arc;

use parties_domain::PlayerId;

use super::membership::MembershipBridge;

pub struct FriendlyFire {
    membership: Arc<MembershipBridge>,
}

impl FriendlyFire {
    pub fn new(membership: Arc<MembershipBridge>) -> Self {
        Self { membership }
    }

    /// False only when both players share a party that has friendly fire off.
    pub async fn can_damage(&self, attacker: PlayerId, target: PlayerId) -> bool {
        if attacker == target {
            return true;
        }
        match self.membership.party_of(attacker).await {
            Some(party) if party.contains(target) => party.friendly_fire,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::stores::PartyStore;
    use crate::test_fixtures::{handle_with, player, t0, RecordingBroadcaster};

    async fn gate(friendly_fire: bool) -> FriendlyFire {
        let config = handle_with(|c| c.mechanics.friendly_fire = friendly_fire);
        let store = Arc::new(PartyStore::new(
            Arc::new(FixedClock(t0())),
            config.clone(),
            RecordingBroadcaster::new(),
        ));
        store.send_invite(player(1), player(2)).await.unwrap();
        store.accept_invite(player(2), player(1)).await.unwrap();
        FriendlyFire::new(Arc::new(MembershipBridge::new(store, None, config)))
    }

    #[tokio::test]
    async fn party_members_are_protected_when_friendly_fire_is_off() {
        let gate = gate(false).await;
        assert!(!gate.can_damage(player(1), player(2)).await);
        assert!(!gate.can_damage(player(2), player(1)).await);
        assert!(gate.can_damage(player(1), player(3)).await);
    }

    #[tokio::test]
    async fn friendly_fire_on_allows_damage() {
        let gate = gate(true).await;
        assert!(gate.can_damage(player(1), player(2)).await);
    }

    #[tokio::test]
    async fn party_keeps_the_friendly_fire_rule_it_was_created_with() {
        let config = handle_with(|c| c.mechanics.friendly_fire = false);
        let store = Arc::new(PartyStore::new(
            Arc::new(FixedClock(t0())),
            config.clone(),
            RecordingBroadcaster::new(),
        ));
        store.send_invite(player(1), player(2)).await.unwrap();
        store.accept_invite(player(2), player(1)).await.unwrap();

        let mut reloaded = (*config.current()).clone();
        reloaded.mechanics.friendly_fire = true;
        config.replace(reloaded).unwrap();

        let gate = FriendlyFire::new(Arc::new(MembershipBridge::new(store, None, config)));
        assert!(!gate.can_damage(player(1), player(2)).await);
    }
}
