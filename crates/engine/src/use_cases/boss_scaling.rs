//! Boss attribute and loot scaling.
//!
//! A marked boss is evaluated once, when it spawns. The resulting multipliers
//! and loot gates are frozen in a snapshot for that instance and reused when it
//! drops loot, no matter who has come or gone since.
//!
//! The marked entity-type set is read from configuration when the engine is
//! built. Changing it takes a restart.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use parties_domain::{
    BossMultipliers, BossSnapshot, EntityId, Location, LootScaling, ScalingContext,
};

use super::player_count::PlayerCounter;
use crate::infrastructure::config::ConfigHandle;
use crate::infrastructure::ports::{AttributeService, ClockPort, LootService};

/// Result of a spawn evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnOutcome {
    /// Boss module switched off
    Disabled,
    /// Entity type is not a marked boss
    NotMarked,
    Scaled(BossSnapshot),
}

pub struct BossScaling {
    counter: Arc<PlayerCounter>,
    attributes: Arc<dyn AttributeService>,
    loot: Arc<dyn LootService>,
    config: ConfigHandle,
    clock: Arc<dyn ClockPort>,
    marked: HashSet<String>,
    snapshots: DashMap<EntityId, BossSnapshot>,
}

impl BossScaling {
    pub fn new(
        counter: Arc<PlayerCounter>,
        attributes: Arc<dyn AttributeService>,
        loot: Arc<dyn LootService>,
        config: ConfigHandle,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let marked: HashSet<String> = config
            .current()
            .boss_module
            .mark_bosses
            .iter()
            .cloned()
            .collect();
        tracing::info!(marked = marked.len(), "Boss marker set loaded");
        Self {
            counter,
            attributes,
            loot,
            config,
            clock,
            marked,
            snapshots: DashMap::new(),
        }
    }

    pub fn is_marked(&self, entity_type: &str) -> bool {
        self.marked.contains(entity_type)
    }

    /// Evaluate a freshly spawned entity and, if it is a marked boss, apply
    /// and remember its multipliers.
    pub async fn on_spawn(
        &self,
        entity: EntityId,
        entity_type: &str,
        location: Location,
    ) -> SpawnOutcome {
        let config = self.config.current();
        let settings = &config.boss_module;
        if !settings.enabled {
            return SpawnOutcome::Disabled;
        }
        if !self.is_marked(entity_type) {
            return SpawnOutcome::NotMarked;
        }

        let now = self.clock.now();
        let context = ScalingContext::new(entity, location, now);
        let player_count = self
            .counter
            .count(
                &context,
                settings.player_count_type,
                f64::from(settings.player_count_radius),
            )
            .await;
        let multipliers =
            BossMultipliers::for_count(player_count, settings.health_mod, settings.damage_mod);

        let snapshot = BossSnapshot {
            entity,
            entity_type: entity_type.to_string(),
            player_count,
            multipliers,
            loot: LootScaling {
                player_count,
                scale_loot: settings.scale_loot,
                scale_special_loot: settings.scale_special_loot,
            },
            scaled_at: now,
        };
        self.attributes.apply(entity, multipliers);
        self.snapshots.insert(entity, snapshot.clone());

        tracing::info!(
            entity = %entity,
            entity_type,
            player_count = player_count.value(),
            health = multipliers.health,
            damage = multipliers.damage,
            "Boss scaled"
        );
        SpawnOutcome::Scaled(snapshot)
    }

    /// Hand the frozen count to the loot collaborator. Returns `None` for
    /// entities that were never scaled.
    pub fn on_loot_drop(&self, entity: EntityId) -> Option<LootScaling> {
        let loot = self.snapshots.get(&entity)?.loot;
        if loot.scale_loot || loot.scale_special_loot {
            self.loot.scale_drops(entity, loot);
        }
        Some(loot)
    }

    /// Forget a boss that died or despawned.
    pub fn on_removed(&self, entity: EntityId) -> Option<BossSnapshot> {
        self.snapshots.remove(&entity).map(|(_, snapshot)| snapshot)
    }

    pub fn snapshot(&self, entity: EntityId) -> Option<BossSnapshot> {
        self.snapshots.get(&entity).map(|s| s.value().clone())
    }

    pub fn tracked(&self) -> usize {
        self.snapshots.len()
    }
}
