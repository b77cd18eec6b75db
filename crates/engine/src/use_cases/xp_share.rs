//! Experience sharing across party members.
//!
//! A gain is split evenly across the qualifying members of the earner's party.
//! Whatever does not divide evenly goes to the earner when they qualify, or to
//! the lowest player id otherwise, so the shares always sum to the original
//! amount.

use std::sync::Arc;

use parties_domain::PlayerId;

use super::membership::MembershipBridge;
use crate::infrastructure::config::ConfigHandle;
use crate::infrastructure::ports::{PlayerDirectory, ProximityPredicate};

/// Where an experience gain came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpSource {
    Natural,
    /// Granted by an admin command
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpGain {
    pub player: PlayerId,
    pub amount: u32,
    pub source: XpSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpShare {
    pub player: PlayerId,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XpShareOutcome {
    /// The earner keeps the whole gain
    Unshared,
    /// Per-member shares in party join order
    Shared(Vec<XpShare>),
}

pub struct XpShareEngine {
    membership: Arc<MembershipBridge>,
    directory: Arc<dyn PlayerDirectory>,
    proximity: Arc<dyn ProximityPredicate>,
    config: ConfigHandle,
}

impl XpShareEngine {
    pub fn new(
        membership: Arc<MembershipBridge>,
        directory: Arc<dyn PlayerDirectory>,
        proximity: Arc<dyn ProximityPredicate>,
        config: ConfigHandle,
    ) -> Self {
        Self {
            membership,
            directory,
            proximity,
            config,
        }
    }

    pub async fn distribute(&self, gain: XpGain) -> XpShareOutcome {
        let config = self.config.current();
        let policy = &config.xp_share;
        if !policy.enable_share || gain.amount == 0 {
            return XpShareOutcome::Unshared;
        }
        if gain.source == XpSource::Command && policy.ignore_command {
            return XpShareOutcome::Unshared;
        }
        // The party may have dissolved since the gain was raised.
        let Some(party) = self.membership.party_of(gain.player).await else {
            return XpShareOutcome::Unshared;
        };

        let recipients: Vec<PlayerId> = party
            .members
            .iter()
            .copied()
            .filter(|member| self.directory.is_online(*member))
            .filter(|member| {
                policy.global_share
                    || *member == gain.player
                    || self.proximity.in_range(gain.player, *member)
            })
            .collect();

        if recipients.len() <= 1 {
            return XpShareOutcome::Unshared;
        }

        let shares = split_evenly(gain.amount, &recipients, gain.player);
        tracing::debug!(
            player_id = %gain.player,
            amount = gain.amount,
            recipients = shares.len(),
            "Experience shared"
        );
        XpShareOutcome::Shared(shares)
    }
}

/// Even split of `amount` across `recipients`, remainder to `earner` if
/// present, else to the lowest id. Empty input yields no shares.
pub fn split_evenly(amount: u32, recipients: &[PlayerId], earner: PlayerId) -> Vec<XpShare> {
    let Some(lowest) = recipients.iter().min().copied() else {
        return Vec::new();
    };
    let count = u32::try_from(recipients.len()).unwrap_or(u32::MAX);
    let base = amount / count;
    let remainder = amount % count;
    let remainder_to = if recipients.contains(&earner) {
        earner
    } else {
        lowest
    };

    let mut remainder_paid = false;
    recipients
        .iter()
        .map(|player| {
            let mut share = base;
            if *player == remainder_to && !remainder_paid {
                share += remainder;
                remainder_paid = true;
            }
            XpShare {
                player: *player,
                amount: share,
            }
        })
        .collect()
}
