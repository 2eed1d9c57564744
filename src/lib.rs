//! # Emberfall
//!
//! An isometric action RPG client with persistent character progression.
//!
//! ## Architecture Overview
//!
//! Emberfall is split into a small number of cooperating subsystems:
//!
//! - **Simulation**: an explicitly owned combat/movement context advanced by
//!   discrete input events and a cancellable damage-resolution queue
//! - **Rendering System**: Cartesian-to-isometric projection plus
//!   immediate-mode drawing of the world using macroquad
//! - **Progression**: the boundary to the authoritative player store, which
//!   applies the leveling formula and holds gold and position
//! - **Input System**: keyboard handling translated into simulation commands
//!
//! The simulation never reaches for ambient state: every mutation goes
//! through [`CombatSession`] with an explicit clock value, so combat can be
//! driven deterministically from tests without a live frame loop.

pub mod game;
pub mod input;
pub mod progression;
pub mod rendering;
pub mod session;

// Core module re-exports
pub use game::*;
pub use input::*;
pub use progression::*;
pub use rendering::*;
pub use session::*;

/// Core error type for the Emberfall client.
#[derive(thiserror::Error, Debug)]
pub enum EmberError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The drawing surface cannot be used
    #[error("Display error: {0}")]
    Display(String),

    /// Simulation state is invalid
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The progression store rejected or failed an operation
    #[error("Progression error: {0}")]
    Progression(String),
}

/// Result type used throughout the Emberfall codebase.
pub type EmberResult<T> = Result<T, EmberError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    use std::time::Duration;

    /// Map width in tiles
    pub const MAP_WIDTH: u32 = 50;

    /// Map height in tiles
    pub const MAP_HEIGHT: u32 = 50;

    /// Width of one isometric tile in pixels
    pub const TILE_WIDTH: f32 = 64.0;

    /// Height of one isometric tile in pixels
    pub const TILE_HEIGHT: f32 = 32.0;

    /// Distance covered by a single movement keypress, in tiles
    pub const MOVE_STEP: f32 = 0.5;

    /// Maximum distance at which an attack can acquire a target, in tiles
    pub const ENGAGEMENT_RANGE: f32 = 10.0;

    /// Wall-clock delay between projectile spawn and damage application
    pub const RESOLUTION_DELAY: Duration = Duration::from_millis(500);

    /// Travel speed carried on projectile records, in tiles per frame.
    /// Resolution timing is wall-clock based and does not consume this.
    pub const PROJECTILE_SPEED: f32 = 0.5;
}
