//! Party module configuration
//!
//! One immutable snapshot of every tunable the core reads. Sections mirror the
//! groups server operators see in the config file: `timers`, `mechanics`,
//! `xp_share`, `mod_support`, and `boss_module`.
//!
//! A snapshot is only ever handed out after [`PartyConfig::validate`] passed,
//! so components can rely on the ranges documented on each field.

use serde::{Deserialize, Serialize};

use crate::PartyError;

// ============================================================================
// Player Count Policy
// ============================================================================

/// How "nearby players" are counted when scaling bosses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CountPolicy {
    /// Every online player
    Server,
    /// Online players in the boss's dimension
    Dimension,
    /// Online players within a radius of the boss, same dimension
    Radius,
    /// Size of the party of the player nearest to the boss
    Party,
}

impl std::fmt::Display for CountPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CountPolicy::Server => write!(f, "SERVER"),
            CountPolicy::Dimension => write!(f, "DIMENSION"),
            CountPolicy::Radius => write!(f, "RADIUS"),
            CountPolicy::Party => write!(f, "PARTY"),
        }
    }
}

impl std::str::FromStr for CountPolicy {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SERVER" => Ok(CountPolicy::Server),
            "DIMENSION" => Ok(CountPolicy::Dimension),
            "RADIUS" => Ok(CountPolicy::Radius),
            "PARTY" => Ok(CountPolicy::Party),
            other => Err(PartyError::invalid_config(format!(
                "unknown player count type: {}",
                other
            ))),
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Invite and sync timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSettings {
    /// Seconds an invite stays acceptable (5..=60)
    pub player_accept_timer: u32,
    /// Ticks between fast syncs: membership, hunger, xp (10..=200)
    pub fast_interval: u32,
    /// Ticks between slow syncs: less time-sensitive state (40..=800)
    pub slow_interval: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            player_accept_timer: 30,
            fast_interval: 10,
            slow_interval: 40,
        }
    }
}

/// Party rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MechanicsSettings {
    /// Maximum members per party (>= 2)
    pub party_size: u32,
    /// Whether members of a new party may hurt each other
    pub friendly_fire: bool,
    /// Mirror membership into the host's own team system as well
    pub use_vanilla_teams: bool,
}

impl Default for MechanicsSettings {
    fn default() -> Self {
        Self {
            party_size: 5,
            friendly_fire: false,
            use_vanilla_teams: true,
        }
    }
}

/// Experience sharing policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpShareSettings {
    /// Master switch for sharing
    pub enable_share: bool,
    /// Share regardless of distance and dimension
    pub global_share: bool,
    /// Do not share points granted through the xp command
    pub ignore_command: bool,
}

impl Default for XpShareSettings {
    fn default() -> Self {
        Self {
            enable_share: true,
            global_share: false,
            ignore_command: true,
        }
    }
}

/// Integration switches for other mods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModSupportSettings {
    /// Relay modded payloads (cast bars) to members regardless of distance
    pub allow_global_updates: bool,
    /// Delegate party management to an external team system
    pub use_external_teams: bool,
}

impl Default for ModSupportSettings {
    fn default() -> Self {
        Self {
            allow_global_updates: true,
            use_external_teams: false,
        }
    }
}

/// Boss attribute and loot scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossModuleSettings {
    pub enabled: bool,
    /// Entity type ids treated as bosses. Read once at startup.
    pub mark_bosses: Vec<String>,
    pub player_count_type: CountPolicy,
    /// Radius in blocks for [`CountPolicy::Radius`] (>= 1)
    pub player_count_radius: u32,
    /// Extra health per counted player beyond the first (>= 0)
    pub health_mod: f64,
    /// Extra damage per counted player beyond the first (>= 0)
    pub damage_mod: f64,
    pub scale_loot: bool,
    pub scale_special_loot: bool,
}

impl Default for BossModuleSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            mark_bosses: vec![
                "minecraft:wither".to_string(),
                "minecraft:ender_dragon".to_string(),
                "minecraft:warden".to_string(),
            ],
            player_count_type: CountPolicy::Dimension,
            player_count_radius: 256,
            health_mod: 0.25,
            damage_mod: 0.25,
            scale_loot: true,
            scale_special_loot: true,
        }
    }
}

// ============================================================================
// Party Config
// ============================================================================

/// Complete configuration snapshot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyConfig {
    pub timers: TimerSettings,
    pub mechanics: MechanicsSettings,
    pub xp_share: XpShareSettings,
    pub mod_support: ModSupportSettings,
    pub boss_module: BossModuleSettings,
}

impl PartyConfig {
    pub const ACCEPT_TIMER_RANGE: (u32, u32) = (5, 60);
    pub const FAST_INTERVAL_RANGE: (u32, u32) = (10, 200);
    pub const SLOW_INTERVAL_RANGE: (u32, u32) = (40, 800);
    pub const MIN_PARTY_SIZE: u32 = 2;

    /// Check every range and cross-field constraint.
    ///
    /// # Errors
    ///
    /// Returns [`PartyError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), PartyError> {
        check_range(
            "timers.player_accept_timer",
            self.timers.player_accept_timer,
            Self::ACCEPT_TIMER_RANGE,
        )?;
        check_range(
            "timers.fast_interval",
            self.timers.fast_interval,
            Self::FAST_INTERVAL_RANGE,
        )?;
        check_range(
            "timers.slow_interval",
            self.timers.slow_interval,
            Self::SLOW_INTERVAL_RANGE,
        )?;
        if self.timers.slow_interval < self.timers.fast_interval {
            return Err(PartyError::invalid_config(format!(
                "timers.slow_interval ({}) must be >= timers.fast_interval ({})",
                self.timers.slow_interval, self.timers.fast_interval
            )));
        }
        if self.mechanics.party_size < Self::MIN_PARTY_SIZE {
            return Err(PartyError::invalid_config(format!(
                "mechanics.party_size must be >= {}, got {}",
                Self::MIN_PARTY_SIZE,
                self.mechanics.party_size
            )));
        }
        if self.boss_module.player_count_radius < 1 {
            return Err(PartyError::invalid_config(
                "boss_module.player_count_radius must be >= 1",
            ));
        }
        check_modifier("boss_module.health_mod", self.boss_module.health_mod)?;
        check_modifier("boss_module.damage_mod", self.boss_module.damage_mod)?;
        Ok(())
    }

    /// Invite accept window as a chrono duration.
    pub fn accept_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.timers.player_accept_timer))
    }

    #[inline]
    pub fn max_party_size(&self) -> u32 {
        self.mechanics.party_size
    }

    #[inline]
    pub fn external_teams(&self) -> bool {
        self.mod_support.use_external_teams
    }

    #[inline]
    pub fn vanilla_teams(&self) -> bool {
        self.mechanics.use_vanilla_teams
    }
}

fn check_range(field: &str, value: u32, (min, max): (u32, u32)) -> Result<(), PartyError> {
    if value < min || value > max {
        return Err(PartyError::invalid_config(format!(
            "{} must be within {}..={}, got {}",
            field, min, max, value
        )));
    }
    Ok(())
}

fn check_modifier(field: &str, value: f64) -> Result<(), PartyError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PartyError::invalid_config(format!(
            "{} must be a finite value >= 0, got {}",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PartyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timers.player_accept_timer, 30);
        assert_eq!(config.max_party_size(), 5);
        assert!(config.vanilla_teams());
        assert_eq!(config.boss_module.player_count_type, CountPolicy::Dimension);
        assert_eq!(config.boss_module.mark_bosses.len(), 3);
    }

    #[test]
    fn slow_interval_below_fast_is_rejected() {
        let mut config = PartyConfig::default();
        config.timers.fast_interval = 100;
        config.timers.slow_interval = 50;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PartyError::InvalidConfig(_)));
        assert!(err.to_string().contains("slow_interval"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut config = PartyConfig::default();
        config.timers.player_accept_timer = 61;
        assert!(config.validate().is_err());

        let mut config = PartyConfig::default();
        config.mechanics.party_size = 1;
        assert!(config.validate().is_err());

        let mut config = PartyConfig::default();
        config.boss_module.health_mod = -0.5;
        assert!(config.validate().is_err());

        let mut config = PartyConfig::default();
        config.boss_module.damage_mod = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn count_policy_parses_case_insensitively() {
        assert_eq!("party".parse::<CountPolicy>().unwrap(), CountPolicy::Party);
        assert_eq!(" RADIUS ".parse::<CountPolicy>().unwrap(), CountPolicy::Radius);
        assert!("nearby".parse::<CountPolicy>().is_err());
    }

    #[test]
    fn partial_sections_fall_back_to_defaults() {
        let json = r#"{
            "mechanics": { "party_size": 8 },
            "boss_module": { "player_count_type": "SERVER" }
        }"#;
        let config: PartyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_party_size(), 8);
        assert!(!config.mechanics.friendly_fire);
        assert!(config.vanilla_teams());
        assert_eq!(config.boss_module.player_count_type, CountPolicy::Server);
        assert_eq!(config.timers, TimerSettings::default());
    }
}
