//! Render projection
//!
//! [`RenderFrame`] is a read-only snapshot of what should be on screen after a
//! tick: one sprite per visible entity, the camera view, and the HUD line. It
//! never feeds back into the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::consts::{PICKUP_SIZE, VIEW_WIDTH};
use crate::sim::{AnimState, BlockKind, Facing, GameState, Tint};

/// Texture keys, one per sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Texture {
    Mario,
    Goomba,
    Ground,
    Platform,
    QuestionBlock,
    /// Question block after it has been struck
    UsedBlock,
    Coin,
    PowerUp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub texture: Texture,
    /// Centre in world space
    pub pos: Vec2,
    /// Unscaled size
    pub size: Vec2,
    pub scale: f32,
    pub alpha: f32,
    pub tint: Tint,
    /// Mirror horizontally (sheets face right)
    pub flip_x: bool,
    pub anim: Option<AnimState>,
}

impl Sprite {
    fn still(texture: Texture, pos: Vec2, size: Vec2) -> Self {
        Self {
            texture,
            pos,
            size,
            scale: 1.0,
            alpha: 1.0,
            tint: Tint::Normal,
            flip_x: false,
            anim: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    /// Back to front
    pub sprites: Vec<Sprite>,
    /// Visible world rect, clamped to the world
    pub camera: Rect,
    pub follow_target: Vec2,
    pub hud_text: String,
    pub game_over: bool,
}

impl RenderFrame {
    pub fn capture(state: &GameState) -> Self {
        let mut sprites = Vec::with_capacity(state.blocks.len() + state.goombas.len() + 8);

        for block in &state.blocks {
            let texture = match block.kind {
                BlockKind::Ground => Texture::Ground,
                BlockKind::Platform => Texture::Platform,
                BlockKind::Question if block.activated => Texture::UsedBlock,
                BlockKind::Question => Texture::QuestionBlock,
            };
            sprites.push(Sprite::still(
                texture,
                block.rect.center(),
                Vec2::new(block.rect.width, block.rect.height),
            ));
        }

        for power_up in state.effects.power_ups.iter().filter(|p| p.alive) {
            sprites.push(Sprite::still(Texture::PowerUp, power_up.pos, power_up.half * 2.0));
        }

        for goomba in state.goombas.iter().filter(|g| g.alive) {
            sprites.push(Sprite {
                flip_x: goomba.facing() == Facing::Left,
                ..Sprite::still(Texture::Goomba, goomba.pos, goomba.half * 2.0)
            });
        }

        for coin in &state.effects.coins {
            sprites.push(Sprite {
                alpha: coin.alpha,
                ..Sprite::still(Texture::Coin, coin.pos, Vec2::splat(PICKUP_SIZE))
            });
        }

        let player = &state.player;
        sprites.push(Sprite {
            texture: Texture::Mario,
            pos: player.pos,
            size: player.base_half * 2.0,
            scale: player.display_scale,
            alpha: 1.0,
            tint: player.tint,
            flip_x: player.facing == Facing::Left,
            anim: Some(player.anim),
        });

        let world = state.session.world_bounds;
        let camera = follow_camera(
            player.pos,
            Vec2::new(VIEW_WIDTH, state.session.visible_height),
            &world,
        );

        Self {
            sprites,
            camera,
            follow_target: player.pos,
            hud_text: state.session.hud_text(),
            game_over: state.session.game_over,
        }
    }
}

/// View of `size` centred on `target`, pushed back inside `world`
pub fn follow_camera(target: Vec2, size: Vec2, world: &Rect) -> Rect {
    let clamp_axis = |center: f32, extent: f32, min: f32, span: f32| {
        if extent >= span {
            min
        } else {
            (center - extent / 2.0).clamp(min, min + span - extent)
        }
    };
    Rect::new(
        clamp_axis(target.x, size.x, world.x, world.width),
        clamp_axis(target.y, size.y, world.y, world.height),
        size.x,
        size.y,
    )
}
