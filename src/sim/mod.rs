//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Time measured in ticks, never wall clock
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies
//!
//! Physics is reached only through [`PhysicsAdapter`].

pub mod collision;
pub mod effects;
pub mod goomba;
pub mod level;
pub mod physics;
pub mod player;
pub mod state;
pub mod tick;

pub use collision::{Outcome, classify, resolve};
pub use effects::{Coin, EffectKind, EffectManager, PowerUp, TimedEffect};
pub use goomba::{Goomba, Patrol};
pub use level::{GoombaSpawn, LevelLayout, PlatformRow, QuestionBlockSpec};
pub use physics::{
    ArcadePhysics, BodyDesc, BodySnapshot, ContactEvent, ContactFlags, Layer, PhysicsAdapter,
    Sides,
};
pub use player::{AnimState, Facing, Player, Tint};
pub use state::{
    Block, BlockKind, DefeatCause, EntityId, EntityRef, GameState, Payload, SessionState,
};
pub use tick::{FixedStep, TickInput, check_fall_through, tick};
