//! # Combat/Movement Simulation
//!
//! The authoritative per-session simulation context: player positions, the
//! enemy roster, in-flight projectiles, and the pending damage-resolution
//! queue.
//!
//! The context is explicitly owned and every mutation takes an explicit
//! clock value, so attack resolution can be unit tested by passing
//! fabricated instants instead of waiting on real timers. Scheduled
//! resolutions are keyed by projectile identity and individually
//! cancellable, which lets teardown drop in-flight attacks
//! deterministically.

use crate::config;
use crate::game::{Enemy, EntityId, GridPos, LivePlayer, Projectile};
use log::debug;
use std::collections::HashMap;
use std::time::Instant;

/// A scheduled damage application, keyed by the projectile that caused it.
#[derive(Debug, Clone)]
struct PendingHit {
    projectile_id: EntityId,
    target_id: EntityId,
    damage: i32,
    due: Instant,
}

/// The result of resolving one due projectile.
#[derive(Debug, Clone, PartialEq)]
pub enum HitOutcome {
    /// The target survived the hit.
    Damaged { enemy_id: EntityId, remaining: i32 },
    /// The hit was lethal; rewards are the enemy's configured values.
    Defeated {
        enemy_id: EntityId,
        experience: u32,
        gold: i64,
    },
    /// The target id no longer matched a roster entry; nothing happened.
    TargetGone { enemy_id: EntityId },
}

/// The combat/movement simulation snapshot plus its resolution queue.
///
/// Exactly one entry in `players` corresponds to the locally controlled
/// identity (`local_player_id`); a shared snapshot may carry more.
#[derive(Debug)]
pub struct Simulation {
    /// All live players, indexed by id
    pub players: HashMap<EntityId, LivePlayer>,
    /// Enemy roster; defeated entries stay present with `alive == false`
    pub enemies: Vec<Enemy>,
    /// In-flight projectiles, in spawn order
    pub projectiles: Vec<Projectile>,
    /// The locally controlled player
    pub local_player_id: EntityId,
    /// Scheduled damage applications, in spawn order
    pending: Vec<PendingHit>,
}

impl Simulation {
    /// Creates a simulation seeded with the local player and an enemy
    /// roster.
    pub fn new(local: LivePlayer, enemies: Vec<Enemy>) -> Self {
        let local_player_id = local.id;
        let mut players = HashMap::new();
        players.insert(local_player_id, local);

        Self {
            players,
            enemies,
            projectiles: Vec::new(),
            local_player_id,
            pending: Vec::new(),
        }
    }

    /// Gets the locally controlled player.
    pub fn local_player(&self) -> Option<&LivePlayer> {
        self.players.get(&self.local_player_id)
    }

    /// Gets the locally controlled player mutably.
    pub fn local_player_mut(&mut self) -> Option<&mut LivePlayer> {
        self.players.get_mut(&self.local_player_id)
    }

    /// Looks up an enemy by id.
    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Moves the local player by a delta, clamping both axes to the map.
    ///
    /// Returns the clamped position so the caller can recenter the camera.
    pub fn move_local(&mut self, dx: f32, dy: f32) -> Option<GridPos> {
        let player = self.players.get_mut(&self.local_player_id)?;
        player.pos = player.pos.stepped(dx, dy);
        Some(player.pos)
    }

    /// Finds the nearest living enemy to `from`.
    ///
    /// Left-to-right scan over the roster with a strict less-than
    /// comparison, so the first minimal-distance enemy wins ties.
    pub fn nearest_living_enemy(&self, from: GridPos) -> Option<(&Enemy, f32)> {
        let mut nearest: Option<(&Enemy, f32)> = None;
        for enemy in self.enemies.iter().filter(|e| e.alive) {
            let dist = enemy.pos.distance_to(from);
            match nearest {
                Some((_, best)) if dist >= best => {}
                _ => nearest = Some((enemy, dist)),
            }
        }
        nearest
    }

    /// Fires at the nearest living enemy within engagement range.
    ///
    /// Spawns a projectile carrying `damage` and schedules its resolution
    /// for `now + RESOLUTION_DELAY`. Returns the projectile id, or `None`
    /// when the attack was a no-op (no living enemy, or the nearest one is
    /// out of range).
    pub fn fire_at_nearest(&mut self, damage: i32, now: Instant) -> Option<EntityId> {
        let origin = self.local_player()?.pos;
        let (target_id, target_pos) = match self.nearest_living_enemy(origin) {
            Some((enemy, dist)) if dist < config::ENGAGEMENT_RANGE => (enemy.id, enemy.pos),
            Some((enemy, dist)) => {
                debug!("attack no-op: nearest enemy {} at {:.1} tiles", enemy.name, dist);
                return None;
            }
            None => {
                debug!("attack no-op: no living enemies");
                return None;
            }
        };

        let projectile = Projectile::new(self.local_player_id, origin, target_pos, damage);
        let projectile_id = projectile.id;
        self.projectiles.push(projectile);
        self.pending.push(PendingHit {
            projectile_id,
            target_id,
            damage,
            due: now + config::RESOLUTION_DELAY,
        });
        Some(projectile_id)
    }

    /// Resolves every scheduled hit that is due at `now`.
    ///
    /// Each resolved projectile is removed from the snapshot regardless of
    /// outcome. A target id that no longer matches a roster entry is
    /// skipped silently.
    pub fn resolve_due(&mut self, now: Instant) -> Vec<HitOutcome> {
        let mut outcomes = Vec::new();
        let due: Vec<PendingHit> = {
            let (due, waiting) = std::mem::take(&mut self.pending)
                .into_iter()
                .partition(|hit| hit.due <= now);
            self.pending = waiting;
            due
        };

        for hit in due {
            self.projectiles.retain(|p| p.id != hit.projectile_id);

            let outcome = match self.enemies.iter_mut().find(|e| e.id == hit.target_id) {
                Some(enemy) => {
                    if enemy.apply_damage(hit.damage) {
                        HitOutcome::Defeated {
                            enemy_id: enemy.id,
                            experience: enemy.experience,
                            gold: enemy.gold,
                        }
                    } else {
                        HitOutcome::Damaged {
                            enemy_id: enemy.id,
                            remaining: enemy.health,
                        }
                    }
                }
                None => HitOutcome::TargetGone {
                    enemy_id: hit.target_id,
                },
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Cancels the scheduled resolution for one projectile.
    ///
    /// The projectile itself is also dropped from the snapshot. Returns
    /// `true` if a pending resolution was removed.
    pub fn cancel_resolution(&mut self, projectile_id: EntityId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|hit| hit.projectile_id != projectile_id);
        self.projectiles.retain(|p| p.id != projectile_id);
        self.pending.len() != before
    }

    /// Cancels every scheduled resolution and drops all projectiles.
    pub fn cancel_all_resolutions(&mut self) {
        self.pending.clear();
        self.projectiles.clear();
    }

    /// Number of resolutions still waiting on their delay.
    pub fn pending_resolutions(&self) -> usize {
        self.pending.len()
    }
}
