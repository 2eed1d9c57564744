//! # Isometric Projection
//!
//! Pure coordinate math for the renderer: the Cartesian-to-isometric
//! transform and its inverse, camera placement, and the screen-to-world
//! mapping used for pointer input. No drawing happens here, so everything
//! in this module is unit-testable without a window.

use crate::config;
use crate::game::GridPos;
use serde::{Deserialize, Serialize};

/// The fixed tile geometry of the isometric projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsoProjection {
    pub tile_width: f32,
    pub tile_height: f32,
}

impl Default for IsoProjection {
    fn default() -> Self {
        Self {
            tile_width: config::TILE_WIDTH,
            tile_height: config::TILE_HEIGHT,
        }
    }
}

impl IsoProjection {
    /// Projects a grid coordinate into isometric pixel space.
    ///
    /// # Examples
    ///
    /// ```
    /// use emberfall::IsoProjection;
    ///
    /// let proj = IsoProjection::default();
    /// assert_eq!(proj.grid_to_iso(0.0, 0.0), (0.0, 0.0));
    /// assert_eq!(proj.grid_to_iso(1.0, 0.0), (32.0, 16.0));
    /// assert_eq!(proj.grid_to_iso(0.0, 1.0), (-32.0, 16.0));
    /// ```
    pub fn grid_to_iso(&self, x: f32, y: f32) -> (f32, f32) {
        let iso_x = (x - y) * (self.tile_width / 2.0);
        let iso_y = (x + y) * (self.tile_height / 2.0);
        (iso_x, iso_y)
    }

    /// Inverts the projection back into grid space.
    ///
    /// Exact algebraic inverse of [`grid_to_iso`](Self::grid_to_iso) up to
    /// floating-point precision.
    pub fn iso_to_grid(&self, iso_x: f32, iso_y: f32) -> (f32, f32) {
        let half_w = self.tile_width / 2.0;
        let half_h = self.tile_height / 2.0;
        let x = (iso_x / half_w + iso_y / half_h) / 2.0;
        let y = (iso_y / half_h - iso_x / half_w) / 2.0;
        (x, y)
    }

    /// Projects a grid position into isometric pixel space.
    pub fn project(&self, pos: GridPos) -> (f32, f32) {
        self.grid_to_iso(pos.x, pos.y)
    }

    /// Maps a screen pixel to the grid coordinate under it.
    ///
    /// Subtracts the half-viewport centering and the camera offset, then
    /// inverts the projection.
    pub fn screen_to_world(
        &self,
        camera: Camera,
        viewport_width: f32,
        viewport_height: f32,
        screen_x: f32,
        screen_y: f32,
    ) -> GridPos {
        let world_iso_x = screen_x - viewport_width / 2.0 + camera.x;
        let world_iso_y = screen_y - viewport_height / 2.0 + camera.y;
        let (x, y) = self.iso_to_grid(world_iso_x, world_iso_y);
        GridPos::new(x, y)
    }
}

/// Pixel-space camera offset tracking one grid coordinate.
///
/// Owned by the renderer; the only mutation is
/// [`center_on`](Camera::center_on).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
}

impl Camera {
    /// Recomputes the camera offset so `pos` projects to the viewport
    /// center.
    pub fn center_on(&mut self, projection: &IsoProjection, pos: GridPos) {
        let (iso_x, iso_y) = projection.project(pos);
        self.x = iso_x;
        self.y = iso_y;
    }
}

/// Health-bar fill as a fraction of the track, clamped to `[0, 1]`.
pub fn fill_fraction(current: i32, max: i32) -> f32 {
    (current as f32 / max as f32).clamp(0.0, 1.0)
}

/// Threshold tier used to pick the health-bar fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTier {
    Healthy,
    Caution,
    Critical,
}

impl HealthTier {
    /// Tier for a fill fraction: healthy above 50%, caution above 25%,
    /// critical otherwise.
    pub fn for_fraction(fraction: f32) -> Self {
        if fraction > 0.5 {
            HealthTier::Healthy
        } else if fraction > 0.25 {
            HealthTier::Caution
        } else {
            HealthTier::Critical
        }
    }
}
