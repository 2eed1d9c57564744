//! # Combat Session
//!
//! Ties the simulation context to the progression store and the
//! notification channel. The session owns the authoritative player record
//! for the lifetime of the view, routes input into the simulation, drains
//! due damage resolutions every tick, and runs the enemy-defeated protocol
//! against the store.
//!
//! The progression sync is the only suspension point in the core: while a
//! sync is pending the defeated enemy is already dead and further attacks
//! operate against the stale record. That window is accepted, not masked.

use crate::config;
use crate::game::{Enemy, HitOutcome, LivePlayer, PlayerRecord, Simulation};
use crate::input::PlayerInput;
use crate::progression::ProgressionStore;
use log::{debug, error, info};
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;

/// A user-facing notification emitted by the session.
///
/// Delivery is external; the session only composes the text.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

/// Composes the enemy-defeated notice.
///
/// `new_level` is set when the sync raised the player's level past its
/// pre-attack value.
pub fn defeat_notice(experience: u32, gold: i64, new_level: Option<u32>) -> Notice {
    let mut body = format!("Gained {} XP and {} gold", experience, gold);
    if let Some(level) = new_level {
        body.push_str(&format!(". Level up! Now level {}", level));
    }
    Notice {
        title: "Enemy Defeated!".to_string(),
        body,
    }
}

/// One player's combat session against a progression store.
pub struct CombatSession<S> {
    record: PlayerRecord,
    sim: Simulation,
    store: S,
    notices: UnboundedSender<Notice>,
    running: bool,
}

impl<S: ProgressionStore> CombatSession<S> {
    /// Seeds a session from a persisted player record and an enemy roster.
    pub fn new(
        record: PlayerRecord,
        roster: Vec<Enemy>,
        store: S,
        notices: UnboundedSender<Notice>,
    ) -> Self {
        info!(
            "starting combat session for {} (level {}) with {} enemies",
            record.character_name,
            record.level,
            roster.len()
        );
        let live = LivePlayer::from_record(&record);
        Self {
            record,
            sim: Simulation::new(live, roster),
            store,
            notices,
            running: true,
        }
    }

    /// The authoritative record as last returned by the store.
    pub fn record(&self) -> &PlayerRecord {
        &self.record
    }

    /// The simulation snapshot, for rendering and inspection.
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// The locally controlled player.
    pub fn local_player(&self) -> Option<&LivePlayer> {
        self.sim.local_player()
    }

    /// Whether the frame loop should keep scheduling itself.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Applies one discrete input event to the simulation.
    ///
    /// Movement is a single clamped step; an attack spawns a projectile at
    /// the nearest living enemy in range (or is a no-op). `Quit` and
    /// `Help` are view concerns and ignored here.
    pub fn handle_input(&mut self, input: PlayerInput, now: Instant) {
        if !self.running {
            return;
        }
        match input {
            PlayerInput::Move(delta) => {
                self.sim
                    .move_local(delta.x * config::MOVE_STEP, delta.y * config::MOVE_STEP);
            }
            PlayerInput::Attack => {
                self.sim.fire_at_nearest(self.record.damage, now);
            }
            PlayerInput::Quit | PlayerInput::Help => {}
        }
    }

    /// Advances the session to `now`: drains due damage resolutions and
    /// runs the enemy-defeated protocol for lethal hits.
    ///
    /// Guarded against running after teardown, so a late timer cannot
    /// mutate a disposed snapshot.
    pub async fn tick(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        for outcome in self.sim.resolve_due(now) {
            match outcome {
                HitOutcome::Damaged {
                    enemy_id,
                    remaining,
                } => {
                    debug!("enemy {} took damage, {} health left", enemy_id, remaining);
                }
                HitOutcome::Defeated {
                    enemy_id,
                    experience,
                    gold,
                } => {
                    debug!("enemy {} defeated", enemy_id);
                    self.handle_enemy_defeated(experience, gold).await;
                }
                HitOutcome::TargetGone { enemy_id } => {
                    debug!("resolution target {} vanished, skipping", enemy_id);
                }
            }
        }
    }

    /// Enemy-defeated protocol: sync experience then gold, replace the
    /// held record with the authoritative state, and notify.
    ///
    /// Store failures are logged and swallowed; the enemy stays defeated
    /// and the displayed stats simply fail to advance until a future
    /// successful sync.
    async fn handle_enemy_defeated(&mut self, experience: u32, gold: i64) {
        let player_id = self.record.id;
        let pre_level = self.record.level;

        match self.store.grant_experience(player_id, experience).await {
            Ok(record) => self.record = record,
            Err(e) => {
                error!("failed to sync experience gain: {}", e);
                return;
            }
        }

        match self.store.adjust_gold(player_id, gold).await {
            Ok(record) => self.record = record,
            Err(e) => {
                error!("failed to sync gold reward: {}", e);
                self.reconcile_live();
                return;
            }
        }

        self.reconcile_live();

        let new_level = (self.record.level > pre_level).then_some(self.record.level);
        let notice = defeat_notice(experience, gold, new_level);
        if self.notices.send(notice).is_err() {
            debug!("notice receiver dropped");
        }
    }

    fn reconcile_live(&mut self) {
        let record = self.record.clone();
        if let Some(live) = self.sim.local_player_mut() {
            live.reconcile(&record);
        }
    }

    /// Tears the session down: cancels every pending resolution, stops the
    /// frame loop, and persists the player's position to the store.
    pub async fn teardown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.sim.cancel_all_resolutions();

        if let Some(pos) = self.sim.local_player().map(|p| p.pos) {
            self.record.position = pos;
            if let Err(e) = self.store.update_position(self.record.id, pos).await {
                error!("failed to persist position on teardown: {}", e);
            }
        }
        info!("combat session torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{starter_roster, CharacterClass, EntityId, GridPos};
    use crate::progression::InMemoryProgression;
    use crate::{EmberError, EmberResult};
    use tokio::sync::mpsc::{self, UnboundedReceiver};
    use tokio_test::block_on;

    /// Store wrapper that counts invocations.
    struct CountingStore {
        inner: InMemoryProgression,
        experience_calls: u32,
        gold_calls: u32,
    }

    impl CountingStore {
        fn new(record: PlayerRecord) -> Self {
            Self {
                inner: InMemoryProgression::with_record(record),
                experience_calls: 0,
                gold_calls: 0,
            }
        }
    }

    impl ProgressionStore for CountingStore {
        async fn grant_experience(
            &mut self,
            player: EntityId,
            amount: u32,
        ) -> EmberResult<PlayerRecord> {
            self.experience_calls += 1;
            self.inner.grant_experience(player, amount).await
        }

        async fn adjust_gold(&mut self, player: EntityId, delta: i64) -> EmberResult<PlayerRecord> {
            self.gold_calls += 1;
            self.inner.adjust_gold(player, delta).await
        }

        async fn update_position(&mut self, player: EntityId, pos: GridPos) -> EmberResult<()> {
            self.inner.update_position(player, pos).await
        }
    }

    /// Store that fails every call.
    struct FailingStore;

    impl ProgressionStore for FailingStore {
        async fn grant_experience(&mut self, _: EntityId, _: u32) -> EmberResult<PlayerRecord> {
            Err(EmberError::Progression("store offline".to_string()))
        }

        async fn adjust_gold(&mut self, _: EntityId, _: i64) -> EmberResult<PlayerRecord> {
            Err(EmberError::Progression("store offline".to_string()))
        }

        async fn update_position(&mut self, _: EntityId, _: GridPos) -> EmberResult<()> {
            Err(EmberError::Progression("store offline".to_string()))
        }
    }

    fn test_record() -> PlayerRecord {
        let class = CharacterClass::by_id("warrior").unwrap();
        let mut record = PlayerRecord::new("Hero".to_string(), &class);
        record.damage = 15;
        record
    }

    fn session_with<S: ProgressionStore>(
        record: PlayerRecord,
        store: S,
        roster: Vec<Enemy>,
    ) -> (CombatSession<S>, UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (CombatSession::new(record, roster, store, tx), rx)
    }

    fn enemy_at(x: f32, y: f32, health: i32) -> Enemy {
        Enemy::new("goblin", "Goblin", GridPos::new(x, y), health, 10, 25, 10)
    }

    #[test]
    fn test_movement_step_and_clamp() {
        let record = test_record();
        let store = InMemoryProgression::with_record(record.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut session = CombatSession::new(record, vec![], store, tx);
        let now = Instant::now();

        session.handle_input(PlayerInput::Move(GridPos::new(1.0, 0.0)), now);
        assert_eq!(
            session.local_player().unwrap().pos,
            GridPos::new(10.5, 10.0)
        );

        // Walk into the map edge; both axes stay clamped.
        for _ in 0..30 {
            session.handle_input(PlayerInput::Move(GridPos::new(-1.0, -1.0)), now);
        }
        assert_eq!(session.local_player().unwrap().pos, GridPos::new(0.0, 0.0));
    }

    #[test]
    fn test_basic_combat_round() {
        let record = test_record();
        let store = InMemoryProgression::with_record(record.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut session = CombatSession::new(record, vec![enemy_at(13.0, 14.0, 50)], store, tx);
        let now = Instant::now();

        session.handle_input(PlayerInput::Attack, now);
        assert_eq!(session.simulation().projectiles.len(), 1);

        // Before the delay nothing resolves.
        block_on(session.tick(now));
        assert_eq!(session.simulation().enemies[0].health, 50);

        block_on(session.tick(now + config::RESOLUTION_DELAY));
        assert_eq!(session.simulation().enemies[0].health, 35);
        assert!(session.simulation().enemies[0].alive);
        assert!(session.simulation().projectiles.is_empty());
    }

    #[test]
    fn test_lethal_round_syncs_progression_once() {
        let record = test_record();
        let roster = vec![enemy_at(13.0, 14.0, 10)];
        let (mut session, mut rx) =
            session_with(record.clone(), CountingStore::new(record), roster);
        let now = Instant::now();

        session.handle_input(PlayerInput::Attack, now);
        block_on(session.tick(now + config::RESOLUTION_DELAY));

        assert!(!session.simulation().enemies[0].alive);
        assert_eq!(session.store.experience_calls, 1);
        assert_eq!(session.store.gold_calls, 1);
        assert_eq!(session.record().experience, 25);
        assert_eq!(session.record().gold, 10);

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.title, "Enemy Defeated!");
        assert_eq!(notice.body, "Gained 25 XP and 10 gold");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_level_up_notice_and_reconcile() {
        let record = test_record();
        let mut roster = vec![enemy_at(13.0, 14.0, 10)];
        roster[0].experience = 250;
        let store = InMemoryProgression::with_record(record.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = CombatSession::new(record, roster, store, tx);
        let now = Instant::now();

        session.handle_input(PlayerInput::Attack, now);
        block_on(session.tick(now + config::RESOLUTION_DELAY));

        let notice = rx.try_recv().unwrap();
        assert_eq!(
            notice.body,
            "Gained 250 XP and 10 gold. Level up! Now level 3"
        );
        assert_eq!(session.record().level, 3);
        // The live player picked up the restored, raised stats.
        let live = session.local_player().unwrap();
        assert_eq!(live.level, 3);
        assert_eq!(live.max_health, 140);
        assert_eq!(live.health, 140);
    }

    #[test]
    fn test_store_failure_is_swallowed() {
        let (mut session, mut rx) =
            session_with(test_record(), FailingStore, vec![enemy_at(13.0, 14.0, 10)]);
        let now = Instant::now();

        session.handle_input(PlayerInput::Attack, now);
        block_on(session.tick(now + config::RESOLUTION_DELAY));

        // Enemy stays defeated, no notice, session keeps running.
        assert!(!session.simulation().enemies[0].alive);
        assert!(rx.try_recv().is_err());
        assert!(session.is_running());
        assert_eq!(session.record().experience, 0);
    }

    #[test]
    fn test_overlapping_attacks_do_not_double_sync() {
        let record = test_record();
        let roster = vec![enemy_at(13.0, 14.0, 10)];
        let (mut session, mut rx) =
            session_with(record.clone(), CountingStore::new(record), roster);
        let t0 = Instant::now();

        // Two attacks in flight against the same target before either
        // resolves: neither is blocked.
        session.handle_input(PlayerInput::Attack, t0);
        let t1 = t0 + std::time::Duration::from_millis(100);
        session.handle_input(PlayerInput::Attack, t1);
        assert_eq!(session.simulation().projectiles.len(), 2);

        block_on(session.tick(t1 + config::RESOLUTION_DELAY));

        // The first hit defeats the enemy; the second lands on the corpse
        // without resurrecting it or re-triggering the reward sync.
        assert!(!session.simulation().enemies[0].alive);
        assert_eq!(session.simulation().enemies[0].health, 0);
        assert!(session.simulation().projectiles.is_empty());
        assert_eq!(session.store.experience_calls, 1);
        assert_eq!(session.store.gold_calls, 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_teardown_cancels_pending_and_syncs_position() {
        let record = test_record();
        let id = record.id;
        let store = InMemoryProgression::with_record(record.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut session = CombatSession::new(record, vec![enemy_at(13.0, 14.0, 50)], store, tx);
        let now = Instant::now();

        session.handle_input(PlayerInput::Move(GridPos::new(1.0, 1.0)), now);
        session.handle_input(PlayerInput::Attack, now);
        assert_eq!(session.simulation().pending_resolutions(), 1);

        block_on(session.teardown());
        assert!(!session.is_running());
        assert_eq!(session.simulation().pending_resolutions(), 0);
        assert!(session.simulation().projectiles.is_empty());
        assert_eq!(
            session.store.get(id).unwrap().position,
            GridPos::new(10.5, 10.5)
        );

        // A timer firing after teardown mutates nothing.
        block_on(session.tick(now + config::RESOLUTION_DELAY));
        assert_eq!(session.simulation().enemies[0].health, 50);
    }

    #[test]
    fn test_input_ignored_after_teardown() {
        let record = test_record();
        let store = InMemoryProgression::with_record(record.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut session = CombatSession::new(record, starter_roster(), store, tx);

        block_on(session.teardown());
        session.handle_input(PlayerInput::Move(GridPos::new(1.0, 0.0)), Instant::now());
        assert_eq!(
            session.local_player().unwrap().pos,
            GridPos::new(10.0, 10.0)
        );
    }

    #[test]
    fn test_defeat_notice_composition() {
        let plain = defeat_notice(25, 10, None);
        assert_eq!(plain.title, "Enemy Defeated!");
        assert_eq!(plain.body, "Gained 25 XP and 10 gold");

        let leveled = defeat_notice(50, 25, Some(2));
        assert_eq!(leveled.body, "Gained 50 XP and 25 gold. Level up! Now level 2");
    }
}
