//! # Input Module
//!
//! Keyboard handling for the combat session. Raw macroquad key events are
//! translated into [`PlayerInput`] values; the session decides what they
//! mean against the current simulation state.

use crate::game::GridPos;
use macroquad::prelude::*;

/// Input handler for processing player commands.
pub struct InputHandler;

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    pub fn new() -> Self {
        Self
    }

    /// Gets the current input if any relevant key was pressed this frame.
    ///
    /// Movement is a discrete step per key-down, not a held-key glide, so
    /// only `is_key_pressed` edges are considered.
    pub fn get_input(&self) -> Option<PlayerInput> {
        // Quit
        if is_key_pressed(KeyCode::Escape) {
            return Some(PlayerInput::Quit);
        }

        // Movement keys - Arrow keys
        if is_key_pressed(KeyCode::Up) {
            return Some(PlayerInput::Move(GridPos::new(0.0, -1.0)));
        }
        if is_key_pressed(KeyCode::Down) {
            return Some(PlayerInput::Move(GridPos::new(0.0, 1.0)));
        }
        if is_key_pressed(KeyCode::Left) {
            return Some(PlayerInput::Move(GridPos::new(-1.0, 0.0)));
        }
        if is_key_pressed(KeyCode::Right) {
            return Some(PlayerInput::Move(GridPos::new(1.0, 0.0)));
        }

        // Movement keys - WASD
        if is_key_pressed(KeyCode::W) {
            return Some(PlayerInput::Move(GridPos::new(0.0, -1.0)));
        }
        if is_key_pressed(KeyCode::S) {
            return Some(PlayerInput::Move(GridPos::new(0.0, 1.0)));
        }
        if is_key_pressed(KeyCode::A) {
            return Some(PlayerInput::Move(GridPos::new(-1.0, 0.0)));
        }
        if is_key_pressed(KeyCode::D) {
            return Some(PlayerInput::Move(GridPos::new(1.0, 0.0)));
        }

        // Attack
        if is_key_pressed(KeyCode::Space) {
            return Some(PlayerInput::Attack);
        }

        // Help
        if is_key_pressed(KeyCode::F1) {
            return Some(PlayerInput::Help);
        }

        None
    }
}

/// Player input types produced by the input handler.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerInput {
    /// Step in a direction (unit delta, scaled by the movement step)
    Move(GridPos),
    /// Attack the nearest enemy in range
    Attack,
    /// Quit the game
    Quit,
    /// Show help information
    Help,
}
