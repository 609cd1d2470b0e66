//! Game balance tuning
//!
//! Every gameplay constant the simulation reads lives here so a session can be
//! rebalanced from JSON without recompiling. Missing fields fall back to the
//! built-in defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::ms_to_ticks;

/// Longest accepted duration for any `*_ms` field (ten minutes)
const MAX_DURATION_MS: f32 = 600_000.0;
const MAX_SIM_HZ: u32 = 1_000;
const MAX_GROWTH_REPEATS: u32 = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Simulation steps per second; converts millisecond timings to ticks
    pub sim_hz: u32,
    /// Downward acceleration (units/s²)
    pub gravity: f32,

    // === Player ===
    pub player_speed: f32,
    pub jump_impulse: f32,
    /// Vertical velocity after a stomp
    pub bounce_impulse: f32,

    // === Enemies ===
    pub goomba_speed: f32,

    // === Blocks and pickups ===
    pub coin_score: u32,
    /// Distance a coin rises while fading
    pub coin_rise: f32,
    pub coin_duration_ms: f32,
    /// Initial upward velocity of a spawned power-up
    pub power_up_launch_speed: f32,
    /// Time a power-up floats before gravity takes over
    pub power_up_float_ms: f32,

    // === Growth ===
    pub power_up_scale: f32,
    pub power_up_speed: f32,
    pub growth_half_cycle_ms: f32,
    pub growth_repeats: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            sim_hz: SIM_HZ,
            gravity: GRAVITY,

            player_speed: PLAYER_SPEED,
            jump_impulse: JUMP_IMPULSE,
            bounce_impulse: BOUNCE_IMPULSE,

            goomba_speed: GOOMBA_SPEED,

            coin_score: COIN_SCORE,
            coin_rise: 50.0,
            coin_duration_ms: 800.0,
            power_up_launch_speed: -100.0,
            power_up_float_ms: 500.0,

            power_up_scale: 1.5,
            power_up_speed: 1.5,
            growth_half_cycle_ms: 100.0,
            growth_repeats: 3,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_SIM_HZ).contains(&self.sim_hz) {
            return Err(ConfigError::invalid(
                "sim_hz",
                format!("must be between 1 and {MAX_SIM_HZ}"),
            ));
        }
        if !(1..=MAX_GROWTH_REPEATS).contains(&self.growth_repeats) {
            return Err(ConfigError::invalid(
                "growth_repeats",
                format!("must be between 1 and {MAX_GROWTH_REPEATS}"),
            ));
        }

        let positive = [
            ("gravity", self.gravity),
            ("player_speed", self.player_speed),
            ("goomba_speed", self.goomba_speed),
            ("coin_duration_ms", self.coin_duration_ms),
            ("power_up_float_ms", self.power_up_float_ms),
            ("power_up_scale", self.power_up_scale),
            ("power_up_speed", self.power_up_speed),
            ("growth_half_cycle_ms", self.growth_half_cycle_ms),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("expected a positive number, got {value}"),
                ));
            }
        }

        // Impulses point up (negative y)
        for (field, value) in [
            ("jump_impulse", self.jump_impulse),
            ("bounce_impulse", self.bounce_impulse),
            ("power_up_launch_speed", self.power_up_launch_speed),
        ] {
            if !value.is_finite() || value >= 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("expected a negative (upward) velocity, got {value}"),
                ));
            }
        }

        for (field, value) in [
            ("coin_duration_ms", self.coin_duration_ms),
            ("power_up_float_ms", self.power_up_float_ms),
            ("growth_half_cycle_ms", self.growth_half_cycle_ms),
        ] {
            if value > MAX_DURATION_MS {
                return Err(ConfigError::invalid(
                    field,
                    format!("{value} ms is longer than the {MAX_DURATION_MS} ms limit"),
                ));
            }
        }

        if !self.coin_rise.is_finite() || self.coin_rise < 0.0 {
            return Err(ConfigError::invalid("coin_rise", "must be finite and >= 0"));
        }
        Ok(())
    }

    /// Fixed timestep in seconds
    pub fn dt(&self) -> f32 {
        1.0 / self.sim_hz as f32
    }

    pub fn coin_ticks(&self) -> u64 {
        ms_to_ticks(self.coin_duration_ms, self.sim_hz)
    }

    pub fn power_up_float_ticks(&self) -> u64 {
        ms_to_ticks(self.power_up_float_ms, self.sim_hz)
    }

    /// Ticks for one half of a growth oscillation (grow or shrink)
    pub fn growth_half_cycle_ticks(&self) -> u64 {
        ms_to_ticks(self.growth_half_cycle_ms, self.sim_hz)
    }

    /// Whole growth animation: every repeat grows then shrinks back
    pub fn growth_total_ticks(&self) -> u64 {
        self.growth_half_cycle_ticks()
            .saturating_mul(2)
            .saturating_mul(u64::from(self.growth_repeats))
    }
}
