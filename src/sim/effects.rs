//! Timed effects and transient pickups
//!
//! Everything that happens "some time later" is a [`TimedEffect`] keyed by
//! simulation tick. Each tick the manager first advances the cosmetic part of
//! every live effect (coin rise and fade, growth pulse), then fires the
//! effects that are due in (due tick, scheduling order) order.
//!
//! A callback whose target is gone is a no-op. Once the session is over only
//! cosmetic effects keep running; gameplay callbacks are dropped.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{BodyDesc, Layer, PhysicsAdapter};
use super::player::Player;
use super::state::{EntityId, SessionState};
use crate::consts::PICKUP_SIZE;
use crate::tuning::Tuning;

/// A coin popping out of a block. Purely visual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: EntityId,
    pub origin: Vec2,
    pub pos: Vec2,
    pub alpha: f32,
}

/// A power-up mushroom. Solid against terrain, overlap-only against the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
    pub gravity: bool,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Coin rises and fades, then disappears
    CoinPickupAnim { coin: EntityId },
    /// Power-up floats up, then falls under gravity
    PowerUpRise { power_up: EntityId },
    /// Player pulses, then the power-up is committed
    Growth { scale_factor: f32, speed_factor: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedEffect {
    /// Scheduling order, breaks ties between equal due ticks
    pub seq: u64,
    pub kind: EffectKind,
    pub start_tick: u64,
    pub duration_ticks: u64,
}

impl TimedEffect {
    pub fn due_tick(&self) -> u64 {
        self.start_tick.saturating_add(self.duration_ticks)
    }

    /// Fraction of the duration elapsed at `now`, clamped to [0, 1]
    pub fn progress(&self, now: u64) -> f32 {
        let elapsed = now.saturating_sub(self.start_tick);
        (elapsed as f32 / self.duration_ticks.max(1) as f32).min(1.0)
    }
}

/// Quadratic ease-out
#[inline]
pub fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Triangle wave for the growth pulse: 0 → 1 → 0 every `2 * half_cycle` ticks
pub fn growth_pulse(elapsed: u64, half_cycle: u64) -> f32 {
    let half_cycle = half_cycle.max(1);
    let phase = elapsed % (2 * half_cycle);
    if phase <= half_cycle {
        phase as f32 / half_cycle as f32
    } else {
        (2 * half_cycle - phase) as f32 / half_cycle as f32
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectManager {
    pub coins: Vec<Coin>,
    pub power_ups: Vec<PowerUp>,
    pub timers: Vec<TimedEffect>,
    next_seq: u64,
}

impl EffectManager {
    fn schedule(&mut self, kind: EffectKind, now: u64, duration_ticks: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(TimedEffect {
            seq,
            kind,
            start_tick: now,
            duration_ticks,
        });
    }

    /// Pending effect count
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Start a coin animation at `pos`
    pub fn spawn_coin(&mut self, id: EntityId, pos: Vec2, now: u64, tuning: &Tuning) {
        self.coins.push(Coin {
            id,
            origin: pos,
            pos,
            alpha: 1.0,
        });
        self.schedule(EffectKind::CoinPickupAnim { coin: id }, now, tuning.coin_ticks());
    }

    /// Launch a power-up from `pos`; gravity kicks in after the float delay
    pub fn spawn_power_up(
        &mut self,
        id: EntityId,
        pos: Vec2,
        now: u64,
        tuning: &Tuning,
        physics: &mut dyn PhysicsAdapter,
    ) {
        let power_up = PowerUp {
            id,
            pos,
            vel: Vec2::new(0.0, tuning.power_up_launch_speed),
            half: Vec2::splat(PICKUP_SIZE / 2.0),
            gravity: false,
            alive: true,
        };
        physics.insert_body(
            id,
            BodyDesc {
                layer: Layer::PowerUp,
                center: power_up.pos,
                half_extents: power_up.half,
                velocity: power_up.vel,
                gravity: false,
                collide_world_bounds: false,
            },
        );
        self.power_ups.push(power_up);
        self.schedule(
            EffectKind::PowerUpRise { power_up: id },
            now,
            tuning.power_up_float_ticks(),
        );
    }

    /// Pick up a power-up: destroy it and start the growth pulse. Returns false
    /// if it was already taken.
    pub fn collect_power_up(
        &mut self,
        id: EntityId,
        now: u64,
        tuning: &Tuning,
        physics: &mut dyn PhysicsAdapter,
    ) -> bool {
        let Some(power_up) = self.power_ups.iter_mut().find(|p| p.id == id && p.alive) else {
            return false;
        };
        power_up.alive = false;
        physics.remove_body(id);
        self.start_growth(now, tuning);
        true
    }

    /// Start the growth pulse; the power-up is committed when it ends
    pub fn start_growth(&mut self, now: u64, tuning: &Tuning) {
        self.schedule(
            EffectKind::Growth {
                scale_factor: tuning.power_up_scale,
                speed_factor: tuning.power_up_speed,
            },
            now,
            tuning.growth_total_ticks(),
        );
    }

    /// Advance every effect to tick `now` and fire the ones that are due.
    /// Returns the fired effects in firing order.
    pub fn advance(
        &mut self,
        now: u64,
        tuning: &Tuning,
        session: &SessionState,
        player: &mut Player,
        physics: &mut dyn PhysicsAdapter,
    ) -> Vec<EffectKind> {
        for timer in &self.timers {
            match timer.kind {
                EffectKind::CoinPickupAnim { coin } => {
                    if let Some(coin) = self.coins.iter_mut().find(|c| c.id == coin) {
                        let eased = ease_out_quad(timer.progress(now));
                        coin.pos.y = coin.origin.y - tuning.coin_rise * eased;
                        coin.alpha = 1.0 - eased;
                    }
                }
                EffectKind::Growth { scale_factor, .. } => {
                    let elapsed = now.saturating_sub(timer.start_tick);
                    let pulse = growth_pulse(elapsed, tuning.growth_half_cycle_ticks());
                    player.display_scale = player.scale * (1.0 + (scale_factor - 1.0) * pulse);
                }
                EffectKind::PowerUpRise { .. } => {}
            }
        }

        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|t| t.due_tick() <= now);
        self.timers = pending;
        due.sort_by_key(|t| (t.due_tick(), t.seq));

        let fired: Vec<EffectKind> = due.into_iter().map(|t| t.kind).collect();
        for &kind in &fired {
            self.fire(kind, session, player, physics);
        }

        if !session.game_over {
            self.despawn_fallen(session.world_bounds.bottom(), physics);
        }
        fired
    }

    fn fire(
        &mut self,
        kind: EffectKind,
        session: &SessionState,
        player: &mut Player,
        physics: &mut dyn PhysicsAdapter,
    ) {
        match kind {
            EffectKind::CoinPickupAnim { coin } => {
                self.coins.retain(|c| c.id != coin);
            }
            EffectKind::PowerUpRise { power_up } => {
                if session.game_over {
                    log::debug!("Power-up {:?} release dropped after game over", power_up);
                    return;
                }
                let Some(p) = self.power_ups.iter_mut().find(|p| p.id == power_up && p.alive)
                else {
                    log::debug!("Power-up {:?} gone before release", power_up);
                    return;
                };
                p.vel.y = 0.0;
                p.gravity = true;
                physics.set_velocity(p.id, p.vel);
                physics.set_gravity(p.id, true);
            }
            EffectKind::Growth {
                scale_factor,
                speed_factor,
            } => {
                player.display_scale = player.scale;
                if session.game_over {
                    log::debug!("Growth commit dropped after game over");
                    return;
                }
                player.collect_power_up(scale_factor, speed_factor);
                physics.set_half_extents(player.id, player.half_extents());
                log::info!(
                    "Power-up applied: scale {:.2}, speed {:.0}",
                    player.scale,
                    player.move_speed
                );
            }
        }
    }

    /// Power-ups that dropped out of the world can never be reached
    fn despawn_fallen(&mut self, world_bottom: f32, physics: &mut dyn PhysicsAdapter) {
        for p in self.power_ups.iter_mut().filter(|p| p.alive) {
            if p.pos.y - p.half.y > world_bottom {
                p.alive = false;
                physics.remove_body(p.id);
                log::debug!("Power-up {:?} fell out of the world", p.id);
            }
        }
    }
}
