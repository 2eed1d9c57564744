//! # Entity Records
//!
//! The persisted player shape, its runtime combat projection, enemies and
//! projectiles. Everything that crosses the persistence boundary derives
//! serde so the surrounding application can ship it to the remote store
//! unchanged.

use crate::game::{new_entity_id, EntityId, GridPos};
use crate::{config, EmberResult};
use serde::{Deserialize, Serialize};

/// A playable character class with its base stats.
///
/// The authoritative class table lives in the remote store; these built-ins
/// mirror it so a client can create characters offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterClass {
    /// Stable class identifier ("warrior", "mage", ...)
    pub id: String,
    /// Display name
    pub name: String,
    /// Flavor text shown at character creation
    pub description: String,
    /// Starting health and max health
    pub base_health: i32,
    /// Starting mana and max mana
    pub base_mana: i32,
    /// Starting flat damage
    pub base_damage: i32,
    /// Starting flat defense
    pub base_defense: i32,
}

impl CharacterClass {
    /// Returns the built-in class roster.
    pub fn builtin() -> Vec<CharacterClass> {
        vec![
            CharacterClass {
                id: "warrior".to_string(),
                name: "Warrior".to_string(),
                description: "A frontline fighter who shrugs off blows".to_string(),
                base_health: 120,
                base_mana: 30,
                base_damage: 12,
                base_defense: 8,
            },
            CharacterClass {
                id: "mage".to_string(),
                name: "Mage".to_string(),
                description: "A fragile caster with devastating attacks".to_string(),
                base_health: 80,
                base_mana: 100,
                base_damage: 15,
                base_defense: 4,
            },
            CharacterClass {
                id: "ranger".to_string(),
                name: "Ranger".to_string(),
                description: "A skirmisher who strikes from range".to_string(),
                base_health: 100,
                base_mana: 50,
                base_damage: 13,
                base_defense: 6,
            },
            CharacterClass {
                id: "cleric".to_string(),
                name: "Cleric".to_string(),
                description: "A resilient healer of the old faith".to_string(),
                base_health: 100,
                base_mana: 80,
                base_damage: 10,
                base_defense: 7,
            },
        ]
    }

    /// Looks up a built-in class by its identifier.
    pub fn by_id(id: &str) -> Option<CharacterClass> {
        Self::builtin().into_iter().find(|c| c.id == id)
    }
}

/// The persisted player record, as held by the progression store.
///
/// This is the authoritative character sheet. The simulation holds a copy
/// and replaces it whenever the store returns an updated record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: EntityId,
    pub character_name: String,
    pub class_id: String,
    pub level: u32,
    pub experience: u32,
    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub damage: i32,
    pub defense: i32,
    pub gold: i64,
    pub position: GridPos,
    pub skill_points: u32,
}

impl PlayerRecord {
    /// Creates a fresh level-1 record seeded from a character class.
    pub fn new(character_name: String, class: &CharacterClass) -> Self {
        Self {
            id: new_entity_id(),
            character_name,
            class_id: class.id.clone(),
            level: 1,
            experience: 0,
            health: class.base_health,
            max_health: class.base_health,
            mana: class.base_mana,
            max_mana: class.base_mana,
            damage: class.base_damage,
            defense: class.base_defense,
            gold: 0,
            position: GridPos::new(10.0, 10.0),
            skill_points: 0,
        }
    }

    /// Experience required to reach the next level from the current one.
    pub fn experience_for_next_level(&self) -> u32 {
        self.level * 100
    }

    /// Serializes the record to JSON.
    pub fn to_json(&self) -> EmberResult<String> {
        serde_json::to_string_pretty(self).map_err(crate::EmberError::from)
    }

    /// Loads a record from JSON.
    pub fn from_json(json: &str) -> EmberResult<Self> {
        serde_json::from_str(json).map_err(crate::EmberError::from)
    }
}

/// Runtime combat-facing projection of a [`PlayerRecord`].
///
/// Mutated in place on every movement or combat tick and reconciled with
/// the authoritative record at sync points. Lives only as long as the
/// simulation view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivePlayer {
    pub id: EntityId,
    pub character_name: String,
    pub class_id: String,
    pub pos: GridPos,
    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub level: u32,
}

impl LivePlayer {
    /// Projects a persisted record into its runtime form.
    pub fn from_record(record: &PlayerRecord) -> Self {
        Self {
            id: record.id,
            character_name: record.character_name.clone(),
            class_id: record.class_id.clone(),
            pos: record.position.clamped(),
            health: record.health,
            max_health: record.max_health,
            mana: record.mana,
            max_mana: record.max_mana,
            level: record.level,
        }
    }

    /// Refreshes stats from an authoritative record after a sync.
    ///
    /// Position stays at the runtime value; the store's copy of it only
    /// advances at explicit sync points.
    pub fn reconcile(&mut self, record: &PlayerRecord) {
        self.health = record.health;
        self.max_health = record.max_health;
        self.mana = record.mana;
        self.max_mana = record.max_mana;
        self.level = record.level;
    }
}

/// An enemy in the simulation roster.
///
/// Defeated enemies stay in the roster with `alive == false` so their death
/// state can be inspected; they are skipped by targeting and rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    /// Enemy archetype ("goblin", "orc", ...)
    pub kind: String,
    /// Display name
    pub name: String,
    pub pos: GridPos,
    pub health: i32,
    pub max_health: i32,
    /// Flat damage dealt by this enemy
    pub damage: i32,
    /// Experience granted when defeated
    pub experience: u32,
    /// Gold granted when defeated
    pub gold: i64,
    pub alive: bool,
}

impl Enemy {
    /// Creates a living enemy at full health.
    pub fn new(
        kind: &str,
        name: &str,
        pos: GridPos,
        health: i32,
        damage: i32,
        experience: u32,
        gold: i64,
    ) -> Self {
        Self {
            id: new_entity_id(),
            kind: kind.to_string(),
            name: name.to_string(),
            pos,
            health,
            max_health: health,
            damage,
            experience,
            gold,
            alive: true,
        }
    }

    /// Applies flat damage, clamping health at zero.
    ///
    /// Returns `true` when this hit was lethal. Health never goes negative,
    /// and a dead enemy stays dead.
    pub fn apply_damage(&mut self, damage: i32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = (self.health - damage).max(0);
        if self.health == 0 {
            self.alive = false;
            return true;
        }
        false
    }
}

/// A short-lived in-flight attack record.
///
/// Exists only to mark that an attack is pending; damage application is
/// time-delayed, not distance-delayed, so the record is never interpolated
/// along its path. `speed` is carried on the wire shape but not consumed by
/// resolution timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub origin: GridPos,
    pub target: GridPos,
    pub damage: i32,
    pub speed: f32,
    pub owner: EntityId,
}

impl Projectile {
    /// Creates a projectile fired by `owner` from `origin` at `target`.
    pub fn new(owner: EntityId, origin: GridPos, target: GridPos, damage: i32) -> Self {
        Self {
            id: new_entity_id(),
            origin,
            target,
            damage,
            speed: config::PROJECTILE_SPEED,
            owner,
        }
    }
}

/// The fixed enemy roster a new combat session starts with.
pub fn starter_roster() -> Vec<Enemy> {
    vec![
        Enemy::new("goblin", "Goblin", GridPos::new(15.0, 15.0), 50, 10, 25, 10),
        Enemy::new("goblin", "Goblin", GridPos::new(20.0, 18.0), 50, 10, 25, 10),
        Enemy::new("orc", "Orc Warrior", GridPos::new(25.0, 25.0), 100, 20, 50, 25),
    ]
}
