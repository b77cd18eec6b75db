//! Player counting for boss scaling.
//!
//! One pure function per policy so each can be exercised on its own.
//! `PlayerCounter` picks the policy, supplies the online player list, and
//! floors the result at one.

use std::sync::Arc;

use parties_domain::{
    CountPolicy, DimensionId, Location, OnlinePlayer, PlayerCount, PlayerId, ScalingContext,
};

use super::membership::MembershipBridge;
use crate::infrastructure::ports::{PlayerDirectory, SpatialQuery};

pub struct PlayerCounter {
    directory: Arc<dyn PlayerDirectory>,
    spatial: Option<Arc<dyn SpatialQuery>>,
    membership: Arc<MembershipBridge>,
}

impl PlayerCounter {
    /// Without a spatial index, RADIUS falls back to a flat scan.
    pub fn new(
        directory: Arc<dyn PlayerDirectory>,
        spatial: Option<Arc<dyn SpatialQuery>>,
        membership: Arc<MembershipBridge>,
    ) -> Self {
        Self {
            directory,
            spatial,
            membership,
        }
    }

    /// Count players for `context` under `policy`. `radius` only matters for
    /// [`CountPolicy::Radius`].
    pub async fn count(
        &self,
        context: &ScalingContext,
        policy: CountPolicy,
        radius: f64,
    ) -> PlayerCount {
        let players = self.directory.online_players();
        let location = &context.location;

        let raw = match policy {
            CountPolicy::Server => count_server(&players),
            CountPolicy::Dimension => count_dimension(&players, &location.dimension),
            CountPolicy::Radius => match &self.spatial {
                Some(index) => index
                    .players_within(&location.dimension, &location.position, radius)
                    .len(),
                None => count_radius(&players, location, radius),
            },
            CountPolicy::Party => match nearest_player(&players, location) {
                Some(nearest) => self
                    .membership
                    .party_of(nearest)
                    .await
                    .map_or(1, |party| party.size()),
                None => 0,
            },
        };

        let count = PlayerCount::floored(raw);
        tracing::debug!(
            boss = %context.boss,
            %policy,
            raw,
            count = count.value(),
            "Player count evaluated"
        );
        count
    }
}

pub fn count_server(players: &[OnlinePlayer]) -> usize {
    players.len()
}

pub fn count_dimension(players: &[OnlinePlayer], dimension: &DimensionId) -> usize {
    players
        .iter()
        .filter(|p| p.dimension() == dimension)
        .count()
}

/// Flat scan; the spatial index is preferred when available.
pub fn count_radius(players: &[OnlinePlayer], center: &Location, radius: f64) -> usize {
    players
        .iter()
        .filter(|p| p.location.within(center, radius))
        .count()
}

/// Closest online player in `center`'s dimension. Exact distance ties go to
/// the lowest player id.
pub fn nearest_player(players: &[OnlinePlayer], center: &Location) -> Option<PlayerId> {
    players
        .iter()
        .filter(|p| p.dimension() == &center.dimension)
        .map(|p| (p.position().distance_squared(&center.position), p.id))
        .min_by(|(da, ida), (db, idb)| da.total_cmp(db).then_with(|| ida.cmp(idb)))
        .map(|(_, id)| id)
}
