//! # Rendering Module
//!
//! Isometric projection math and the macroquad drawing layer. The
//! projection half is pure and window-free; the display half owns the
//! camera and draws the simulation snapshot every frame.

pub mod display;
pub mod iso;

pub use display::*;
pub use iso::*;
