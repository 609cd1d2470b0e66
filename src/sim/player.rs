//! The player character

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::ContactFlags;
use super::state::EntityId;
use super::tick::TickInput;
use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

/// Animation the renderer should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimState {
    Idle,
    WalkLeft,
    WalkRight,
}

/// Colour overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tint {
    #[default]
    Normal,
    /// Red wash after losing
    Defeated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    /// Body centre
    pub pos: Vec2,
    pub vel: Vec2,
    /// Half extents before any power-up scaling
    pub base_half: Vec2,
    /// Permanent size multiplier (collision geometry)
    pub scale: f32,
    /// Size shown on screen; differs from `scale` only while growing
    pub display_scale: f32,
    pub move_speed: f32,
    pub facing: Facing,
    pub anim: AnimState,
    pub tint: Tint,
}

impl Player {
    /// Create a player standing with its feet at `feet`
    pub fn new(id: EntityId, feet: Vec2, move_speed: f32) -> Self {
        let base_half = Vec2::new(PLAYER_WIDTH / 2.0, PLAYER_HEIGHT / 2.0);
        Self {
            id,
            pos: feet - Vec2::new(0.0, base_half.y),
            vel: Vec2::ZERO,
            base_half,
            scale: 1.0,
            display_scale: 1.0,
            move_speed,
            facing: Facing::Right,
            anim: AnimState::Idle,
            tint: Tint::Normal,
        }
    }

    pub fn half_extents(&self) -> Vec2 {
        self.base_half * self.scale
    }

    /// Bottom edge, the point the fall check measures
    pub fn feet_y(&self) -> f32 {
        self.pos.y + self.half_extents().y
    }

    /// Apply this tick's intent. Jumping needs ground contact reported in the
    /// same tick; no contact data means airborne.
    pub fn advance(&mut self, input: &TickInput, contacts: Option<ContactFlags>, jump_impulse: f32) {
        if input.left {
            self.vel.x = -self.move_speed;
            self.facing = Facing::Left;
            self.anim = AnimState::WalkLeft;
        } else if input.right {
            self.vel.x = self.move_speed;
            self.facing = Facing::Right;
            self.anim = AnimState::WalkRight;
        } else {
            self.vel.x = 0.0;
            self.anim = AnimState::Idle;
        }

        let grounded = contacts.is_some_and(|c| c.grounded());
        if input.up && grounded {
            self.vel.y = jump_impulse;
        }
    }

    /// Permanent power-up: bigger hitbox, faster run. The caller guarantees
    /// one call per pickup.
    pub fn collect_power_up(&mut self, scale_factor: f32, speed_factor: f32) {
        self.scale *= scale_factor;
        self.display_scale = self.scale;
        self.move_speed *= speed_factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::Sides;

    fn player() -> Player {
        Player::new(EntityId(1), Vec2::new(100.0, 568.0), 220.0)
    }

    fn standing() -> Option<ContactFlags> {
        Some(ContactFlags {
            touching: Sides::DOWN,
            blocked: Sides::DOWN,
        })
    }

    #[test]
    fn test_new_stands_on_feet() {
        let p = player();
        assert_eq!(p.pos, Vec2::new(100.0, 543.0));
        assert_eq!(p.feet_y(), 568.0);
    }

    #[test]
    fn test_horizontal_intent() {
        let mut p = player();
        p.advance(&TickInput { left: true, ..Default::default() }, standing(), -876.0);
        assert_eq!(p.vel.x, -220.0);
        assert_eq!(p.facing, Facing::Left);
        assert_eq!(p.anim, AnimState::WalkLeft);

        p.advance(&TickInput { right: true, ..Default::default() }, standing(), -876.0);
        assert_eq!(p.vel.x, 220.0);
        assert_eq!(p.facing, Facing::Right);

        p.advance(&TickInput::default(), standing(), -876.0);
        assert_eq!(p.vel.x, 0.0);
        assert_eq!(p.anim, AnimState::Idle);
        // Idle keeps the last facing
        assert_eq!(p.facing, Facing::Right);
    }

    #[test]
    fn test_left_wins_over_right() {
        let mut p = player();
        let both = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        p.advance(&both, None, -876.0);
        assert_eq!(p.vel.x, -220.0);
    }

    #[test]
    fn test_jump_needs_ground() {
        let jump = TickInput {
            up: true,
            ..Default::default()
        };

        let mut p = player();
        p.vel.y = 120.0;
        p.advance(&jump, Some(ContactFlags::default()), -876.0);
        assert_eq!(p.vel.y, 120.0);

        p.advance(&jump, None, -876.0);
        assert_eq!(p.vel.y, 120.0);

        p.advance(&jump, standing(), -876.0);
        assert_eq!(p.vel.y, -876.0);
    }

    #[test]
    fn test_jump_from_touching_only() {
        // Standing on an enemy counts as ground
        let mut p = player();
        let contacts = Some(ContactFlags {
            touching: Sides::DOWN,
            blocked: Sides::NONE,
        });
        p.advance(&TickInput { up: true, ..Default::default() }, contacts, -876.0);
        assert_eq!(p.vel.y, -876.0);
    }

    #[test]
    fn test_collect_power_up() {
        let mut p = player();
        p.collect_power_up(1.5, 1.5);
        assert_eq!(p.move_speed, 330.0);
        assert_eq!(p.half_extents(), Vec2::new(15.0, 37.5));
        assert_eq!(p.display_scale, 1.5);
    }
}
