//! Patrolling enemy
//!
//! A goomba walks at a constant speed and turns around when it runs into a
//! wall or another body. It has two states and no memory beyond them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::ContactFlags;
use super::player::Facing;
use super::state::EntityId;
use crate::consts::GOOMBA_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Patrol {
    MovingLeft,
    MovingRight,
}

impl Patrol {
    /// Horizontal sign: -1 or +1
    pub fn sign(self) -> f32 {
        match self {
            Patrol::MovingLeft => -1.0,
            Patrol::MovingRight => 1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Patrol::MovingLeft => Patrol::MovingRight,
            Patrol::MovingRight => Patrol::MovingLeft,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goomba {
    pub id: EntityId,
    /// Body centre
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
    pub patrol: Patrol,
    pub base_speed: f32,
    pub alive: bool,
}

impl Goomba {
    pub fn new(id: EntityId, pos: Vec2, patrol: Patrol, base_speed: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::new(base_speed * patrol.sign(), 0.0),
            half: Vec2::splat(GOOMBA_SIZE / 2.0),
            patrol,
            base_speed,
            alive: true,
        }
    }

    /// Patrol direction as -1 / +1
    pub fn patrol_direction(&self) -> i8 {
        match self.patrol {
            Patrol::MovingLeft => -1,
            Patrol::MovingRight => 1,
        }
    }

    pub fn facing(&self) -> Facing {
        match self.patrol {
            Patrol::MovingLeft => Facing::Left,
            Patrol::MovingRight => Facing::Right,
        }
    }

    fn apply_velocity(&mut self) {
        self.vel.x = self.base_speed * self.patrol.sign();
    }

    /// Turn around on a wall or body ahead. Without contact data (body not
    /// stepped yet) the current velocity is kept.
    pub fn advance(&mut self, contacts: Option<ContactFlags>) {
        let Some(c) = contacts else {
            return;
        };
        match self.patrol {
            Patrol::MovingLeft if c.blocked.left || c.touching.left => {
                self.patrol = Patrol::MovingRight;
                self.apply_velocity();
            }
            Patrol::MovingRight if c.blocked.right || c.touching.right => {
                self.patrol = Patrol::MovingLeft;
                self.apply_velocity();
            }
            _ => {}
        }
    }

    /// Two goombas met: each one reverses, whichever side was hit
    pub fn bounce_off_enemy(&mut self) {
        self.patrol = self.patrol.reversed();
        self.apply_velocity();
    }
}
