//! Fixed timestep simulation tick
//!
//! One call to [`tick`] runs a full frame of gameplay in a fixed order:
//! physics step, entity updates, contact resolution, the fall check, timed
//! effects, and finally the velocities chosen this tick are handed back to
//! physics for the next step.

use serde::{Deserialize, Serialize};

use super::collision;
use super::physics::{ContactEvent, PhysicsAdapter, Sides};
use super::state::{DefeatCause, EntityId, GameState};
use crate::consts::MAX_SUBSTEPS;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump; only honoured when standing on something
    pub up: bool,
}

/// Advance the game state by one fixed timestep
///
/// `dt` must be the tuning's step (`1 / sim_hz`): effect durations are counted
/// in ticks at that rate.
pub fn tick(state: &mut GameState, physics: &mut dyn PhysicsAdapter, input: &TickInput, dt: f32) {
    debug_assert!(
        (dt - state.tuning.dt()).abs() < 1e-6,
        "tick dt {dt} does not match sim_hz {}",
        state.tuning.sim_hz
    );
    state.time_ticks += 1;

    if !state.session.game_over {
        let events = physics.step(dt);
        state.pull_from_physics(physics);

        let player_contacts = physics.contacts(state.player.id);
        let jump = state.tuning.jump_impulse;
        state.player.advance(input, player_contacts, jump);

        for i in 0..state.goombas.len() {
            let id = state.goombas[i].id;
            let enemy_sides = enemy_contact_sides(state, &events, id);
            let contacts = physics
                .contacts(id)
                .map(|c| c.without_touching(enemy_sides));
            state.goombas[i].advance(contacts);
        }

        collision::resolve(state, physics, &events);

        if !state.session.game_over {
            check_fall_through(state, physics);
        }
    }

    let now = state.time_ticks;
    state
        .effects
        .advance(now, &state.tuning, &state.session, &mut state.player, physics);

    if !state.session.game_over {
        state.push_to_physics(physics);
    }
    state.purge_dead();
}

/// Sides of `id` touched by other enemies this step. Those reversals belong
/// to the enemy bounce rule, not the patrol.
fn enemy_contact_sides(state: &GameState, events: &[ContactEvent], id: EntityId) -> Sides {
    events
        .iter()
        .filter(|e| e.involves(id) && !e.overlap_only)
        .filter_map(|e| {
            if e.a == id && state.is_goomba(e.b) {
                Some(e.a_sides)
            } else if e.b == id && state.is_goomba(e.a) {
                Some(e.b_sides)
            } else {
                None
            }
        })
        .fold(Sides::NONE, Sides::union)
}

/// End the run once the player's feet reach the bottom of the world or drop
/// below the visible area. Returns true if the run ended here.
pub fn check_fall_through(state: &mut GameState, physics: &mut dyn PhysicsAdapter) -> bool {
    let feet = state.player.feet_y();
    let fell = feet >= state.session.world_bounds.bottom() || feet > state.session.visible_height;
    if fell {
        state.end_session(physics, DefeatCause::FellOffWorld);
    }
    fell
}

/// Accumulates real frame time and runs whole simulation ticks
#[derive(Debug, Clone)]
pub struct FixedStep {
    dt: f32,
    accumulator: f32,
}

impl FixedStep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Feed one frame of wall time and run the ticks it covers. Returns the
    /// number of ticks run; at most `MAX_SUBSTEPS`, the rest is dropped.
    pub fn advance(
        &mut self,
        frame_dt: f32,
        state: &mut GameState,
        physics: &mut dyn PhysicsAdapter,
        input: &TickInput,
    ) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < MAX_SUBSTEPS {
            tick(state, physics, input, self.dt);
            self.accumulator -= self.dt;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Spiral of death guard
            self.accumulator = self.accumulator.min(self.dt);
        }
        substeps
    }
}
