//! Default proximity predicate: same dimension and within a fixed range.

use std::sync::Arc;

use parties_domain::PlayerId;

use crate::infrastructure::ports::{PlayerDirectory, ProximityPredicate};

/// Range used for XP sharing and mod-packet gating when the host supplies none.
pub const DEFAULT_SHARE_RANGE: f64 = 64.0;

pub struct RangeProximity {
    directory: Arc<dyn PlayerDirectory>,
    range: f64,
}

impl RangeProximity {
    pub fn new(directory: Arc<dyn PlayerDirectory>, range: f64) -> Self {
        Self { directory, range }
    }

    pub fn range(&self) -> f64 {
        self.range
    }
}

impl ProximityPredicate for RangeProximity {
    fn in_range(&self, a: PlayerId, b: PlayerId) -> bool {
        let (Some(first), Some(second)) = (self.directory.player(a), self.directory.player(b))
        else {
            return false;
        };
        first.location.within(&second.location, self.range)
    }
}
