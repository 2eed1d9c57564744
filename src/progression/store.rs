//! # Progression Store
//!
//! Trait seam for the authoritative player record store plus the shipped
//! in-memory implementation and the leveling formula.

use crate::game::{EntityId, GridPos, PlayerRecord};
use crate::{EmberError, EmberResult};
use std::collections::HashMap;

/// Authoritative store for player records.
///
/// The combat loop awaits these calls inline; a call in flight is the only
/// suspension point in the whole core. Implementations return the full
/// post-update record so the caller can replace its held snapshot.
#[allow(async_fn_in_trait)]
pub trait ProgressionStore {
    /// Grants experience, applying the leveling formula, and returns the
    /// authoritative post-grant record.
    async fn grant_experience(&mut self, player: EntityId, amount: u32)
        -> EmberResult<PlayerRecord>;

    /// Adds `delta` to the stored gold balance and returns the
    /// authoritative record.
    async fn adjust_gold(&mut self, player: EntityId, delta: i64) -> EmberResult<PlayerRecord>;

    /// Persists the player's grid position (teardown sync point).
    async fn update_position(&mut self, player: EntityId, position: GridPos) -> EmberResult<()>;
}

/// Applies the leveling formula to a record in place.
///
/// The requirement is `level * 100` experience, computed once from the
/// pre-grant level and held fixed across the rollover loop. Each level
/// gained grants 3 skill points; when at least one level is gained, max
/// health rises by 10, max mana by 5, damage by 2 and defense by 1 per
/// level gained, and health/mana are restored to the new maxima.
pub fn apply_experience(record: &mut PlayerRecord, amount: u32) {
    let requirement = record.level * 100;
    let start_level = record.level;
    let mut remaining = record.experience + amount;

    while remaining >= requirement {
        remaining -= requirement;
        record.level += 1;
        record.skill_points += 3;
    }
    record.experience = remaining;

    let gained = record.level - start_level;
    if gained > 0 {
        record.max_health += gained as i32 * 10;
        record.max_mana += gained as i32 * 5;
        record.damage += gained as i32 * 2;
        record.defense += gained as i32;
        record.health = record.max_health;
        record.mana = record.max_mana;
    }
}

/// In-memory progression store.
///
/// Stands in for the remote data store: same formula, same record shapes,
/// no network. Useful for offline play and deterministic tests.
#[derive(Debug, Default)]
pub struct InMemoryProgression {
    records: HashMap<EntityId, PlayerRecord>,
}

impl InMemoryProgression {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding one record.
    pub fn with_record(record: PlayerRecord) -> Self {
        let mut store = Self::new();
        store.insert(record);
        store
    }

    /// Inserts or replaces a record.
    pub fn insert(&mut self, record: PlayerRecord) {
        self.records.insert(record.id, record);
    }

    /// Reads a stored record.
    pub fn get(&self, player: EntityId) -> Option<&PlayerRecord> {
        self.records.get(&player)
    }

    fn get_mut(&mut self, player: EntityId) -> EmberResult<&mut PlayerRecord> {
        self.records
            .get_mut(&player)
            .ok_or_else(|| EmberError::Progression(format!("player {} not found", player)))
    }
}

impl ProgressionStore for InMemoryProgression {
    async fn grant_experience(
        &mut self,
        player: EntityId,
        amount: u32,
    ) -> EmberResult<PlayerRecord> {
        let record = self.get_mut(player)?;
        apply_experience(record, amount);
        Ok(record.clone())
    }

    async fn adjust_gold(&mut self, player: EntityId, delta: i64) -> EmberResult<PlayerRecord> {
        let record = self.get_mut(player)?;
        record.gold += delta;
        Ok(record.clone())
    }

    async fn update_position(&mut self, player: EntityId, position: GridPos) -> EmberResult<()> {
        let record = self.get_mut(player)?;
        record.position = position;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::CharacterClass;
    use tokio_test::block_on;

    fn fresh_record() -> PlayerRecord {
        let class = CharacterClass::by_id("warrior").unwrap();
        PlayerRecord::new("Hero".to_string(), &class)
    }

    #[test]
    fn test_no_level_gain_stores_reduced_experience() {
        let mut record = fresh_record();
        apply_experience(&mut record, 60);

        assert_eq!(record.level, 1);
        assert_eq!(record.experience, 60);
        assert_eq!(record.skill_points, 0);
        assert_eq!(record.max_health, 120);
        assert_eq!(record.damage, 12);
    }

    #[test]
    fn test_leveling_rollover() {
        // 250 XP at level 1: the 100 XP requirement is met twice.
        let mut record = fresh_record();
        record.health = 40;
        record.mana = 5;
        apply_experience(&mut record, 250);

        assert_eq!(record.level, 3);
        assert_eq!(record.experience, 50);
        assert_eq!(record.skill_points, 6);
        assert_eq!(record.max_health, 140);
        assert_eq!(record.max_mana, 40);
        assert_eq!(record.damage, 16);
        assert_eq!(record.defense, 10);
        // Fully restored to the new maxima.
        assert_eq!(record.health, 140);
        assert_eq!(record.mana, 40);
    }

    #[test]
    fn test_exact_requirement_levels_up() {
        let mut record = fresh_record();
        apply_experience(&mut record, 100);

        assert_eq!(record.level, 2);
        assert_eq!(record.experience, 0);
        assert_eq!(record.skill_points, 3);
    }

    #[test]
    fn test_store_grant_experience_round_trip() {
        let record = fresh_record();
        let id = record.id;
        let mut store = InMemoryProgression::with_record(record);

        let updated = block_on(store.grant_experience(id, 250)).unwrap();
        assert_eq!(updated.level, 3);
        assert_eq!(updated.experience, 50);
        // The stored copy advanced too.
        assert_eq!(store.get(id).unwrap().level, 3);
    }

    #[test]
    fn test_store_adjust_gold() {
        let record = fresh_record();
        let id = record.id;
        let mut store = InMemoryProgression::with_record(record);

        let updated = block_on(store.adjust_gold(id, 25)).unwrap();
        assert_eq!(updated.gold, 25);
        let updated = block_on(store.adjust_gold(id, -10)).unwrap();
        assert_eq!(updated.gold, 15);
    }

    #[test]
    fn test_store_update_position() {
        let record = fresh_record();
        let id = record.id;
        let mut store = InMemoryProgression::with_record(record);

        block_on(store.update_position(id, GridPos::new(4.5, 7.0))).unwrap();
        assert_eq!(store.get(id).unwrap().position, GridPos::new(4.5, 7.0));
    }

    #[test]
    fn test_store_unknown_player_errors() {
        let mut store = InMemoryProgression::new();
        let result = block_on(store.grant_experience(crate::game::new_entity_id(), 10));
        assert!(result.is_err());
    }
}
