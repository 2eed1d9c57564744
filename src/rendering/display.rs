//! # Display Management
//!
//! Immediate-mode drawing of the simulation snapshot using macroquad:
//! the procedurally colored ground, enemies, projectiles, players with
//! name labels and health bars, the stats panel, and the message strip.

use crate::game::{Enemy, EntityId, GridPos, LivePlayer, PlayerRecord, Projectile, Simulation};
use crate::rendering::{fill_fraction, Camera, HealthTier, IsoProjection};
use crate::{config, EmberError, EmberResult};
use macroquad::prelude::*;

/// Ground color for path tiles
const PATH_COLOR: Color = Color::new(0.545, 0.451, 0.333, 1.0);
/// Ground color for grass tiles
const GRASS_COLOR: Color = Color::new(0.420, 0.557, 0.137, 1.0);
/// Tile outline
const TILE_EDGE: Color = Color::new(0.0, 0.0, 0.0, 0.2);
/// The locally controlled player
const LOCAL_PLAYER_COLOR: Color = Color::new(0.576, 0.200, 0.918, 1.0);
/// Any other player in a shared snapshot
const REMOTE_PLAYER_COLOR: Color = Color::new(0.231, 0.510, 0.965, 1.0);
/// Enemy body
const ENEMY_COLOR: Color = Color::new(0.545, 0.0, 0.0, 1.0);
/// Health-bar background track
const BAR_TRACK: Color = Color::new(0.0, 0.0, 0.0, 0.5);

/// Macroquad renderer for the isometric world.
///
/// Owns the camera: the only way to move it is
/// [`set_camera`](IsoRenderer::set_camera). Tile constants never change
/// after construction.
pub struct IsoRenderer {
    /// Fixed tile geometry
    pub projection: IsoProjection,
    /// Camera pixel offset tracking the local player
    pub camera: Camera,
    /// Cached viewport width in pixels
    pub viewport_width: f32,
    /// Cached viewport height in pixels
    pub viewport_height: f32,
    /// Message history shown in the notice strip
    pub messages: Vec<String>,
    /// Maximum number of messages to keep
    pub max_messages: usize,
}

impl IsoRenderer {
    /// Creates a renderer bound to the current drawing surface.
    ///
    /// Fails fatally when the surface reports an unusable viewport; this
    /// is a setup error, not a retryable condition.
    pub fn new() -> EmberResult<Self> {
        let width = screen_width();
        let height = screen_height();
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(EmberError::Display(format!(
                "drawing surface reported unusable viewport {}x{}",
                width, height
            )));
        }

        Ok(Self {
            projection: IsoProjection::default(),
            camera: Camera::default(),
            viewport_width: width,
            viewport_height: height,
            messages: Vec::new(),
            max_messages: 100,
        })
    }

    /// Current cached viewport dimensions.
    pub fn viewport(&self) -> (f32, f32) {
        (self.viewport_width, self.viewport_height)
    }

    /// Refreshes the cached viewport from the drawing surface.
    ///
    /// Call on viewport-size-change; tile constants and the camera are
    /// unaffected.
    pub fn resize(&mut self) {
        self.viewport_width = screen_width();
        self.viewport_height = screen_height();
    }

    /// Recenters the camera on a grid coordinate.
    pub fn set_camera(&mut self, pos: GridPos) {
        self.camera.center_on(&self.projection, pos);
    }

    /// Maps a screen pixel (pointer input) to the grid coordinate under
    /// it.
    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> GridPos {
        self.projection.screen_to_world(
            self.camera,
            self.viewport_width,
            self.viewport_height,
            screen_x,
            screen_y,
        )
    }

    fn to_screen(&self, pos: GridPos) -> (f32, f32) {
        let (iso_x, iso_y) = self.projection.project(pos);
        (
            iso_x - self.camera.x + self.viewport_width / 2.0,
            iso_y - self.camera.y + self.viewport_height / 2.0,
        )
    }

    /// Renders the complete game screen: world, stats panel, notices.
    pub fn render_game(&self, sim: &Simulation, record: &PlayerRecord) {
        self.render_frame(sim, sim.local_player_id);
        self.render_hud(sim, record);
        self.render_messages();
    }

    /// Renders one frame of the world snapshot.
    ///
    /// Draw order: ground, living enemies, projectiles, players. The
    /// tracked player gets a distinct color from any other snapshot
    /// entries.
    pub fn render_frame(&self, sim: &Simulation, tracked_id: EntityId) {
        clear_background(BLACK);
        self.draw_ground();

        for enemy in &sim.enemies {
            self.draw_enemy(enemy);
        }
        for projectile in &sim.projectiles {
            self.draw_projectile(projectile);
        }
        for (id, player) in &sim.players {
            let color = if *id == tracked_id {
                LOCAL_PLAYER_COLOR
            } else {
                REMOTE_PLAYER_COLOR
            };
            self.draw_player(player, color);
        }
    }

    /// Draws the static ground over the full map extent.
    ///
    /// Tile color is a deterministic function of coordinate parity:
    /// `(x + y) % 3 == 0` marks a path tile.
    fn draw_ground(&self) {
        for y in 0..config::MAP_HEIGHT {
            for x in 0..config::MAP_WIDTH {
                let color = if (x + y) % 3 == 0 { PATH_COLOR } else { GRASS_COLOR };
                self.draw_tile(x as f32, y as f32, color);
            }
        }
    }

    /// Draws one ground diamond at a grid coordinate.
    fn draw_tile(&self, x: f32, y: f32, color: Color) {
        let (sx, sy) = self.to_screen(GridPos::new(x, y));
        let half_w = self.projection.tile_width / 2.0;
        let half_h = self.projection.tile_height / 2.0;

        let top = vec2(sx, sy);
        let right = vec2(sx + half_w, sy + half_h);
        let bottom = vec2(sx, sy + half_h * 2.0);
        let left = vec2(sx - half_w, sy + half_h);

        draw_triangle(top, right, bottom, color);
        draw_triangle(top, bottom, left, color);
        draw_line(top.x, top.y, right.x, right.y, 1.0, TILE_EDGE);
        draw_line(right.x, right.y, bottom.x, bottom.y, 1.0, TILE_EDGE);
        draw_line(bottom.x, bottom.y, left.x, left.y, 1.0, TILE_EDGE);
        draw_line(left.x, left.y, top.x, top.y, 1.0, TILE_EDGE);
    }

    fn draw_player(&self, player: &LivePlayer, color: Color) {
        let (sx, sy) = self.to_screen(player.pos);

        draw_circle(sx, sy - 20.0, 15.0, color);
        self.draw_label(&player.character_name, sx, sy - 40.0, 16.0, WHITE);
        self.draw_health_bar(sx, sy - 50.0, player.health, player.max_health);
    }

    fn draw_enemy(&self, enemy: &Enemy) {
        if !enemy.alive {
            return;
        }
        let (sx, sy) = self.to_screen(enemy.pos);

        draw_circle(sx, sy - 20.0, 12.0, ENEMY_COLOR);
        self.draw_label(&enemy.name, sx, sy - 35.0, 14.0, WHITE);
        self.draw_health_bar(sx, sy - 45.0, enemy.health, enemy.max_health);
    }

    fn draw_projectile(&self, projectile: &Projectile) {
        let (sx, sy) = self.to_screen(projectile.origin);

        // Soft glow behind the bolt
        draw_circle(sx, sy - 15.0, 8.0, Color::new(1.0, 1.0, 0.0, 0.35));
        draw_circle(sx, sy - 15.0, 5.0, YELLOW);
    }

    /// Renders a two-layer health bar centered on `x`.
    pub fn draw_health_bar(&self, x: f32, y: f32, current: i32, max: i32) {
        let bar_width = 40.0;
        let bar_height = 4.0;
        let fraction = fill_fraction(current, max);

        let fill_color = match HealthTier::for_fraction(fraction) {
            HealthTier::Healthy => GREEN,
            HealthTier::Caution => YELLOW,
            HealthTier::Critical => RED,
        };

        draw_rectangle(x - bar_width / 2.0, y, bar_width, bar_height, BAR_TRACK);
        draw_rectangle(
            x - bar_width / 2.0,
            y,
            bar_width * fraction,
            bar_height,
            fill_color,
        );
    }

    fn draw_label(&self, text: &str, center_x: f32, y: f32, size: f32, color: Color) {
        let dims = measure_text(text, None, size as u16, 1.0);
        draw_text(text, center_x - dims.width / 2.0, y, size, color);
    }

    /// Renders the character stats panel.
    fn render_hud(&self, sim: &Simulation, record: &PlayerRecord) {
        let panel_x = self.viewport_width - 250.0;
        let mut line_y = 30.0;
        let line_height = 22.0;

        draw_text("EMBERFALL", panel_x, line_y, 24.0, WHITE);
        line_y += line_height * 1.5;

        let Some(player) = sim.local_player() else {
            return;
        };

        draw_text(
            &format!("{}  Lv. {}", player.character_name, player.level),
            panel_x,
            line_y,
            18.0,
            YELLOW,
        );
        line_y += line_height;

        draw_text(
            &format!("Health: {}/{}", player.health, player.max_health),
            panel_x,
            line_y,
            18.0,
            WHITE,
        );
        line_y += line_height;

        draw_text(
            &format!("Mana: {}/{}", player.mana, player.max_mana),
            panel_x,
            line_y,
            18.0,
            WHITE,
        );
        line_y += line_height;

        draw_text(
            &format!(
                "XP: {}/{}",
                record.experience,
                record.experience_for_next_level()
            ),
            panel_x,
            line_y,
            18.0,
            WHITE,
        );
        line_y += line_height;

        draw_text(
            &format!("Damage: {}  Defense: {}", record.damage, record.defense),
            panel_x,
            line_y,
            18.0,
            WHITE,
        );
        line_y += line_height;

        draw_text(&format!("Gold: {}", record.gold), panel_x, line_y, 18.0, GOLD);
        line_y += line_height * 2.0;

        draw_text("Controls:", panel_x, line_y, 18.0, GREEN);
        line_y += line_height;
        for control in ["WASD/Arrow keys: Move", "SPACE: Attack", "ESC: Quit"] {
            draw_text(control, panel_x, line_y, 16.0, WHITE);
            line_y += line_height;
        }
    }

    /// Renders the message strip along the bottom of the screen.
    fn render_messages(&self) {
        let message_area_y = self.viewport_height - 80.0;
        let message_count = 3;
        let line_height = 18.0;

        draw_rectangle(
            0.0,
            message_area_y - 10.0,
            self.viewport_width,
            90.0,
            Color::new(0.0, 0.0, 0.0, 0.8),
        );

        let start_index = self.messages.len().saturating_sub(message_count);
        for (i, message) in self.messages.iter().skip(start_index).enumerate() {
            let y = message_area_y + i as f32 * line_height;
            draw_text(message, 10.0, y, 16.0, WHITE);
        }
    }

    /// Adds a message to the message history.
    pub fn add_message(&mut self, message: String) {
        self.messages.push(message);

        if self.messages.len() > self.max_messages {
            self.messages.remove(0);
        }
    }
}
