//! Game state and core simulation types
//!
//! Everything one session mutates lives in [`GameState`]. Entities are kept in
//! plain arenas (sorted by id) and addressed through [`EntityId`]; contacts
//! reported by physics are mapped back to their owners with
//! [`GameState::lookup`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::EffectManager;
use super::goomba::Goomba;
use super::level::LevelLayout;
use super::physics::{BodyDesc, Layer, PhysicsAdapter};
use super::player::{Player, Tint};
use crate::Rect;
use crate::tuning::Tuning;

/// Identifier shared by an entity and its physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Where an id lives: arena plus index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Player,
    Goomba(usize),
    Block(usize),
    /// Index into the effect manager's power-up arena
    PowerUp(usize),
}

/// Block types
///
/// Ground and platform tiles are ordinary terrain; only question blocks react
/// to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Ground,
    Platform,
    Question,
}

/// What a question block dispenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Payload {
    #[default]
    Empty,
    Coin,
    PowerUp,
}

/// A static level tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: EntityId,
    /// Top-left corner and size
    pub rect: Rect,
    pub kind: BlockKind,
    pub activated: bool,
    pub payload: Payload,
}

impl Block {
    pub fn is_question(&self) -> bool {
        self.kind == BlockKind::Question
    }

    /// Can still be struck for its payload
    pub fn is_armed(&self) -> bool {
        self.is_question() && !self.activated && self.payload != Payload::Empty
    }

    /// Consume the payload. Returns it only the first time.
    pub fn activate(&mut self) -> Option<Payload> {
        if !self.is_armed() {
            return None;
        }
        self.activated = true;
        Some(std::mem::take(&mut self.payload))
    }

    /// Spawn point for dispensed items: one cell above, horizontally centred
    pub fn spawn_anchor(&self) -> Vec2 {
        Vec2::new(
            self.rect.x + self.rect.width / 2.0,
            self.rect.y - self.rect.height / 2.0,
        )
    }
}

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefeatCause {
    /// Touched an enemy anywhere but its top
    EnemyContact,
    /// Dropped through a hole or below the screen
    FellOffWorld,
}

/// Session-wide score and terminal flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u32,
    pub game_over: bool,
    pub cause: Option<DefeatCause>,
    pub world_bounds: Rect,
    pub visible_height: f32,
}

impl SessionState {
    pub fn new(world_bounds: Rect, visible_height: f32) -> Self {
        Self {
            score: 0,
            game_over: false,
            cause: None,
            world_bounds,
            visible_height,
        }
    }

    /// Award points; ignored once the run is over
    pub fn add_score(&mut self, points: u32) {
        if !self.game_over {
            self.score = self.score.saturating_add(points);
        }
    }

    pub fn hud_text(&self) -> String {
        format!("Score: {}", self.score)
    }
}

/// Complete simulation state for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub tuning: Tuning,
    pub session: SessionState,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    /// Sorted by id
    pub goombas: Vec<Goomba>,
    /// Sorted by id; never shrinks
    pub blocks: Vec<Block>,
    /// Coins, power-ups and scheduled callbacks
    pub effects: EffectManager,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Build the level and register every body with physics
    pub fn new(layout: &LevelLayout, tuning: Tuning, physics: &mut dyn PhysicsAdapter) -> Self {
        let mut next_id = 1u32;
        let mut alloc = || {
            let id = EntityId(next_id);
            next_id += 1;
            id
        };

        let blocks = layout.build_blocks(&mut alloc);
        let player = Player::new(alloc(), layout.player_start, tuning.player_speed);
        let goombas: Vec<Goomba> = layout
            .goombas
            .iter()
            .map(|spawn| Goomba::new(alloc(), spawn.position, spawn.direction, tuning.goomba_speed))
            .collect();

        let state = Self {
            tuning,
            session: SessionState::new(layout.world_bounds(), layout.visible_height),
            time_ticks: 0,
            player,
            goombas,
            blocks,
            effects: EffectManager::default(),
            next_id,
        };
        state.register_bodies(physics);

        log::info!(
            "Session started: {} blocks, {} goombas",
            state.blocks.len(),
            state.goombas.len()
        );
        state
    }

    fn register_bodies(&self, physics: &mut dyn PhysicsAdapter) {
        for block in &self.blocks {
            physics.insert_body(block.id, BodyDesc::terrain(block.rect));
        }
        physics.insert_body(
            self.player.id,
            BodyDesc {
                layer: Layer::Player,
                center: self.player.pos,
                half_extents: self.player.half_extents(),
                velocity: self.player.vel,
                gravity: true,
                collide_world_bounds: true,
            },
        );
        for goomba in &self.goombas {
            physics.insert_body(
                goomba.id,
                BodyDesc {
                    layer: Layer::Enemy,
                    center: goomba.pos,
                    half_extents: goomba.half,
                    velocity: goomba.vel,
                    gravity: true,
                    collide_world_bounds: true,
                },
            );
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Resolve an id to its arena slot
    pub fn lookup(&self, id: EntityId) -> Option<EntityRef> {
        if id == self.player.id {
            return Some(EntityRef::Player);
        }
        if let Ok(i) = self.goombas.binary_search_by_key(&id, |g| g.id) {
            return Some(EntityRef::Goomba(i));
        }
        if let Ok(i) = self.blocks.binary_search_by_key(&id, |b| b.id) {
            return Some(EntityRef::Block(i));
        }
        self.effects
            .power_ups
            .iter()
            .position(|p| p.id == id)
            .map(EntityRef::PowerUp)
    }

    pub fn is_goomba(&self, id: EntityId) -> bool {
        matches!(self.lookup(id), Some(EntityRef::Goomba(_)))
    }

    pub fn goomba(&self, id: EntityId) -> Option<&Goomba> {
        self.goombas.iter().find(|g| g.id == id)
    }

    pub fn block(&self, id: EntityId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Copy integrated positions and velocities back into the entities
    pub fn pull_from_physics(&mut self, physics: &dyn PhysicsAdapter) {
        if let Some(body) = physics.body(self.player.id) {
            self.player.pos = body.center;
            self.player.vel = body.velocity;
        }
        for goomba in self.goombas.iter_mut().filter(|g| g.alive) {
            if let Some(body) = physics.body(goomba.id) {
                goomba.pos = body.center;
                goomba.vel = body.velocity;
            }
        }
        for power_up in self.effects.power_ups.iter_mut().filter(|p| p.alive) {
            if let Some(body) = physics.body(power_up.id) {
                power_up.pos = body.center;
                power_up.vel = body.velocity;
            }
        }
    }

    /// Hand the velocities chosen this tick to physics
    pub fn push_to_physics(&self, physics: &mut dyn PhysicsAdapter) {
        physics.set_velocity(self.player.id, self.player.vel);
        for goomba in self.goombas.iter().filter(|g| g.alive) {
            physics.set_velocity(goomba.id, goomba.vel);
        }
        for power_up in self.effects.power_ups.iter().filter(|p| p.alive) {
            physics.set_velocity(power_up.id, power_up.vel);
        }
    }

    /// Destroy a goomba and its body
    pub fn kill_goomba(&mut self, id: EntityId, physics: &mut dyn PhysicsAdapter) -> bool {
        match self.goombas.iter_mut().find(|g| g.id == id && g.alive) {
            Some(goomba) => {
                goomba.alive = false;
                physics.remove_body(id);
                true
            }
            None => false,
        }
    }

    /// Terminal transition: freeze physics and mark the player defeated
    pub fn end_session(&mut self, physics: &mut dyn PhysicsAdapter, cause: DefeatCause) {
        if self.session.game_over {
            return;
        }
        self.session.game_over = true;
        self.session.cause = Some(cause);
        self.player.tint = Tint::Defeated;
        physics.pause();
        log::info!(
            "Game over ({:?}) at tick {} with score {}",
            cause,
            self.time_ticks,
            self.session.score
        );
    }

    /// Drop dead entities so the next tick never sees them
    pub fn purge_dead(&mut self) {
        self.goombas.retain(|g| g.alive);
        self.effects.power_ups.retain(|p| p.alive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(payload: Payload) -> Block {
        Block {
            id: EntityId(7),
            rect: Rect::new(192.0, 424.0, 32.0, 32.0),
            kind: BlockKind::Question,
            activated: false,
            payload,
        }
    }

    #[test]
    fn test_block_activates_once() {
        let mut block = question(Payload::Coin);
        assert_eq!(block.activate(), Some(Payload::Coin));
        assert!(block.activated);
        assert_eq!(block.payload, Payload::Empty);
        assert_eq!(block.activate(), None);
    }

    #[test]
    fn test_empty_or_ordinary_blocks_never_activate() {
        let mut empty = question(Payload::Empty);
        assert_eq!(empty.activate(), None);
        assert!(!empty.activated);

        let mut ground = question(Payload::Coin);
        ground.kind = BlockKind::Ground;
        assert_eq!(ground.activate(), None);
    }

    #[test]
    fn test_spawn_anchor_is_one_cell_above() {
        let block = question(Payload::Coin);
        assert_eq!(block.spawn_anchor(), Vec2::new(208.0, 408.0));
    }

    #[test]
    fn test_score_frozen_after_game_over() {
        let mut session = SessionState::new(Rect::new(0.0, 0.0, 100.0, 100.0), 100.0);
        session.add_score(10);
        session.game_over = true;
        session.add_score(10);
        assert_eq!(session.score, 10);
        assert_eq!(session.hud_text(), "Score: 10");
    }
}
