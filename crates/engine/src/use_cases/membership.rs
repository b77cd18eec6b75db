//! Membership reads routed to whichever system owns parties right now.
//!
//! With external teams disabled the party store answers. With them enabled the
//! external provider answers and the store is never consulted, so a single
//! lookup can't mix the two views.

use std::sync::Arc;

use parties_domain::{PartyView, PlayerId};

use crate::infrastructure::config::ConfigHandle;
use crate::infrastructure::ports::ExternalTeamProvider;
use crate::stores::PartyStore;

/// Which system answered a membership read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipSource {
    Internal,
    External,
}

pub struct MembershipBridge {
    store: Arc<PartyStore>,
    external: Option<Arc<dyn ExternalTeamProvider>>,
    config: ConfigHandle,
}

impl MembershipBridge {
    pub fn new(
        store: Arc<PartyStore>,
        external: Option<Arc<dyn ExternalTeamProvider>>,
        config: ConfigHandle,
    ) -> Self {
        Self {
            store,
            external,
            config,
        }
    }

    pub fn source(&self) -> MembershipSource {
        if self.config.current().external_teams() {
            MembershipSource::External
        } else {
            MembershipSource::Internal
        }
    }

    /// The party or team `player` belongs to.
    pub async fn party_of(&self, player: PlayerId) -> Option<PartyView> {
        match self.source() {
            MembershipSource::Internal => self.store.party_of(player).await,
            MembershipSource::External => match &self.external {
                Some(provider) => provider.team_of(player).await,
                None => {
                    tracing::warn!(
                        player_id = %player,
                        "External teams enabled without a provider; treating player as partyless"
                    );
                    None
                }
            },
        }
    }
}
