//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;

use glam::Vec2;
use plumber::sim::{
    ArcadePhysics, BodyDesc, BodySnapshot, ContactEvent, ContactFlags, EntityId, GameState,
    LevelLayout, PhysicsAdapter,
};
use plumber::Tuning;

/// A one-screen level with solid ground and nothing else
pub fn flat_level() -> LevelLayout {
    LevelLayout {
        world_width: 640.0,
        world_height: 600.0,
        visible_height: 600.0,
        cell_size: 32.0,
        ground_holes: vec![],
        platforms: vec![],
        question_blocks: vec![],
        player_start: Vec2::new(40.0, 568.0),
        goombas: vec![],
    }
}

pub fn start_arcade(layout: &LevelLayout) -> (GameState, ArcadePhysics) {
    let mut physics = ArcadePhysics::new(2040.0, layout.world_bounds());
    let state = GameState::new(layout, Tuning::default(), &mut physics);
    (state, physics)
}

#[derive(Debug, Clone)]
pub struct ScriptedBody {
    pub desc: BodyDesc,
    pub integrated: bool,
}

/// Physics double: bodies never move, contacts come from a script
#[derive(Debug, Default)]
pub struct ScriptedPhysics {
    pub bodies: BTreeMap<EntityId, ScriptedBody>,
    /// Events returned by the next step
    pub queued: Vec<ContactEvent>,
    pub flags: BTreeMap<EntityId, ContactFlags>,
    pub resized: Vec<(EntityId, Vec2)>,
    pub paused: bool,
}

impl ScriptedPhysics {
    pub fn queue(&mut self, event: ContactEvent) {
        self.queued.push(event);
    }

    pub fn gravity_of(&self, id: EntityId) -> Option<bool> {
        self.bodies.get(&id).map(|b| b.desc.gravity)
    }
}

impl PhysicsAdapter for ScriptedPhysics {
    fn insert_body(&mut self, id: EntityId, desc: BodyDesc) {
        self.bodies.insert(
            id,
            ScriptedBody {
                desc,
                integrated: false,
            },
        );
    }

    fn remove_body(&mut self, id: EntityId) {
        self.bodies.remove(&id);
    }

    fn set_velocity(&mut self, id: EntityId, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.desc.velocity = velocity;
        }
    }

    fn set_gravity(&mut self, id: EntityId, enabled: bool) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.desc.gravity = enabled;
        }
    }

    fn set_half_extents(&mut self, id: EntityId, half_extents: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.desc.half_extents = half_extents;
            self.resized.push((id, half_extents));
        }
    }

    fn body(&self, id: EntityId) -> Option<BodySnapshot> {
        self.bodies.get(&id).map(|b| BodySnapshot {
            center: b.desc.center,
            velocity: b.desc.velocity,
            half_extents: b.desc.half_extents,
        })
    }

    fn contacts(&self, id: EntityId) -> Option<ContactFlags> {
        let body = self.bodies.get(&id)?;
        body.integrated
            .then(|| self.flags.get(&id).copied().unwrap_or_default())
    }

    fn step(&mut self, _dt: f32) -> Vec<ContactEvent> {
        if self.paused {
            return Vec::new();
        }
        for body in self.bodies.values_mut() {
            body.integrated = true;
        }
        std::mem::take(&mut self.queued)
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
