//! Boss scaling values
//!
//! The core only computes counts and multipliers. Applying them to attributes
//! and loot tables is the host's business.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geometry::Location;
use crate::EntityId;

/// Player count used for scaling (always >= 1)
///
/// A boss with nobody around still scales as if one player were present, so
/// `count - 1` in the multiplier math never goes negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u32", from = "u32")]
pub struct PlayerCount(u32);

impl PlayerCount {
    pub const ONE: PlayerCount = PlayerCount(1);

    /// Wrap a raw count, raising zero to the floor of one.
    pub fn floored(raw: usize) -> Self {
        let raw = u32::try_from(raw).unwrap_or(u32::MAX);
        Self(raw.max(1))
    }

    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Players beyond the baseline one.
    #[inline]
    pub fn extra(self) -> u32 {
        self.0 - 1
    }
}

impl From<u32> for PlayerCount {
    fn from(value: u32) -> Self {
        Self(value.max(1))
    }
}

impl From<PlayerCount> for u32 {
    fn from(value: PlayerCount) -> Self {
        value.0
    }
}

impl std::fmt::Display for PlayerCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ephemeral input to a player count evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingContext {
    pub boss: EntityId,
    pub location: Location,
    pub at: DateTime<Utc>,
}

impl ScalingContext {
    pub fn new(boss: EntityId, location: Location, at: DateTime<Utc>) -> Self {
        Self { boss, location, at }
    }
}

/// Health and damage multipliers for one boss instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossMultipliers {
    pub health: f64,
    pub damage: f64,
}

impl BossMultipliers {
    pub const UNSCALED: BossMultipliers = BossMultipliers {
        health: 1.0,
        damage: 1.0,
    };

    /// `1 + modifier * (count - 1)` per attribute, never below 1.0.
    pub fn for_count(count: PlayerCount, health_mod: f64, damage_mod: f64) -> Self {
        Self {
            health: scale(count, health_mod),
            damage: scale(count, damage_mod),
        }
    }
}

fn scale(count: PlayerCount, modifier: f64) -> f64 {
    let value = 1.0 + modifier * f64::from(count.extra());
    if value.is_finite() {
        value.max(1.0)
    } else {
        1.0
    }
}

/// What the loot collaborator receives when a scaled boss drops loot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootScaling {
    pub player_count: PlayerCount,
    pub scale_loot: bool,
    pub scale_special_loot: bool,
}

/// Scaling decision frozen at spawn time for one boss instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossSnapshot {
    pub entity: EntityId,
    pub entity_type: String,
    pub player_count: PlayerCount,
    pub multipliers: BossMultipliers,
    pub loot: LootScaling,
    pub scaled_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_floored_to_one() {
        assert_eq!(PlayerCount::floored(0).value(), 1);
        assert_eq!(PlayerCount::from(0).value(), 1);
        assert_eq!(PlayerCount::floored(4).value(), 4);
    }

    #[test]
    fn zero_modifier_yields_exactly_one() {
        for count in [1, 2, 7, 100] {
            let m = BossMultipliers::for_count(PlayerCount::floored(count), 0.0, 0.0);
            assert_eq!(m, BossMultipliers::UNSCALED);
        }
    }

    #[test]
    fn quarter_modifier_with_three_players_is_one_and_a_half() {
        let m = BossMultipliers::for_count(PlayerCount::floored(3), 0.25, 0.5);
        assert_eq!(m.health, 1.5);
        assert_eq!(m.damage, 2.0);
    }

    #[test]
    fn negative_modifier_is_clamped_to_baseline() {
        let m = BossMultipliers::for_count(PlayerCount::floored(5), -1.0, f64::INFINITY);
        assert_eq!(m.health, 1.0);
        assert_eq!(m.damage, 1.0);
    }
}
