//! Plumber - a side-scrolling platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, contact resolution, timed effects)
//! - `frame`: Read-only render projection of the simulation state
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration errors

pub mod error;
pub mod frame;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use frame::RenderFrame;
pub use tuning::Tuning;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (one logical frame per step)
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Viewport dimensions
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 600.0;

    /// Level grid cell size
    pub const CELL_SIZE: f32 = 32.0;

    /// Downward acceleration (units/s²)
    pub const GRAVITY: f32 = 2040.0;
    /// Vertical velocity applied on jump
    pub const JUMP_IMPULSE: f32 = -876.0;
    /// Vertical velocity applied after stomping an enemy
    pub const BOUNCE_IMPULSE: f32 = -876.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 220.0;
    pub const PLAYER_WIDTH: f32 = 20.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;

    /// Goomba defaults
    pub const GOOMBA_SPEED: f32 = 50.0;
    pub const GOOMBA_SIZE: f32 = 32.0;

    /// Pickup sprites (coin and power-up)
    pub const PICKUP_SIZE: f32 = 30.0;

    /// Points awarded for a coin block
    pub const COIN_SCORE: u32 = 10;
}

/// Axis-aligned rectangle in world space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Build a rect from a centre point and half extents
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self::new(
            center.x - half.x,
            center.y - half.y,
            half.x * 2.0,
            half.y * 2.0,
        )
    }
}

/// Number of fixed steps covering `ms` milliseconds at `hz` (at least one)
#[inline]
pub fn ms_to_ticks(ms: f32, hz: u32) -> u64 {
    ((ms * hz as f32) / 1000.0).round().max(1.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_ticks_at_sixty_hz() {
        assert_eq!(ms_to_ticks(800.0, 60), 48);
        assert_eq!(ms_to_ticks(500.0, 60), 30);
        assert_eq!(ms_to_ticks(100.0, 60), 6);
        // Never zero, so a scheduled effect always waits at least one step
        assert_eq!(ms_to_ticks(0.0, 60), 1);
    }

    #[test]
    fn test_rect_from_center() {
        let r = Rect::from_center(Vec2::new(10.0, 20.0), Vec2::new(5.0, 10.0));
        assert_eq!(r, Rect::new(5.0, 10.0, 10.0, 20.0));
        assert_eq!(r.center(), Vec2::new(10.0, 20.0));
        assert_eq!(r.bottom(), 30.0);
    }
}
