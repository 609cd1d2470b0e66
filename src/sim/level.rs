//! Level layout
//!
//! A level is a grid of 32-unit cells counted from the bottom of the world:
//! a ground row with holes, short platform rows, and question blocks. Row
//! `grid_y` has its centre line `grid_y` cells above the world bottom.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::goomba::Patrol;
use super::state::{Block, BlockKind, EntityId, Payload};
use crate::Rect;
use crate::consts::{CELL_SIZE, VIEW_HEIGHT};
use crate::error::ConfigError;

/// `count` platform tiles starting at (`grid_x`, `grid_y`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformRow {
    pub grid_x: u32,
    pub grid_y: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuestionBlockSpec {
    pub grid_x: u32,
    pub grid_y: u32,
    pub payload: Payload,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoombaSpawn {
    /// Body centre
    pub position: Vec2,
    pub direction: Patrol,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub world_width: f32,
    pub world_height: f32,
    /// Height of the screen; falling past it ends the run
    pub visible_height: f32,
    pub cell_size: f32,
    /// Ground columns left open
    pub ground_holes: Vec<u32>,
    pub platforms: Vec<PlatformRow>,
    pub question_blocks: Vec<QuestionBlockSpec>,
    /// Player feet position
    pub player_start: Vec2,
    pub goombas: Vec<GoombaSpawn>,
}

impl Default for LevelLayout {
    fn default() -> Self {
        Self::classic()
    }
}

impl LevelLayout {
    /// The classic stage: three screens wide with three holes in the ground
    pub fn classic() -> Self {
        let row = |grid_x, grid_y| PlatformRow {
            grid_x,
            grid_y,
            count: 1,
        };
        let question = |grid_x, grid_y, payload| QuestionBlockSpec {
            grid_x,
            grid_y,
            payload,
        };

        Self {
            world_width: 2400.0,
            world_height: VIEW_HEIGHT,
            visible_height: VIEW_HEIGHT,
            cell_size: CELL_SIZE,
            ground_holes: vec![10, 20, 30],
            platforms: vec![row(9, 5), row(11, 5), row(13, 5), row(16, 2), row(26, 2)],
            question_blocks: vec![
                question(6, 5, Payload::Coin),
                question(10, 5, Payload::Coin),
                question(12, 5, Payload::Coin),
                question(11, 9, Payload::PowerUp),
            ],
            player_start: Vec2::new(100.0, 450.0),
            goombas: vec![
                GoombaSpawn {
                    position: Vec2::new(600.0, 500.0),
                    direction: Patrol::MovingRight,
                },
                GoombaSpawn {
                    position: Vec2::new(800.0, 500.0),
                    direction: Patrol::MovingLeft,
                },
            ],
        }
    }

    /// Parse a layout from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let layout: Self = serde_json::from_str(json)?;
        if !(layout.cell_size > 0.0 && layout.world_width > 0.0 && layout.world_height > 0.0) {
            return Err(ConfigError::invalid(
                "world",
                "cell size and world dimensions must be positive",
            ));
        }
        Ok(layout)
    }

    pub fn world_bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.world_width, self.world_height)
    }

    /// Number of ground columns, including the one straddling the right edge
    pub fn ground_columns(&self) -> u32 {
        (self.world_width / self.cell_size).ceil() as u32 + 1
    }

    /// Cell-sized rect at grid column `grid_x`, row `grid_y`
    pub fn cell_rect(&self, grid_x: u32, grid_y: u32) -> Rect {
        let size = self.cell_size;
        let center_y = self.world_height - grid_y as f32 * size;
        Rect::new(grid_x as f32 * size, center_y - size / 2.0, size, size)
    }

    /// Ground row rect at column `x`
    fn ground_rect(&self, x: u32) -> Rect {
        let size = self.cell_size;
        Rect::new(x as f32 * size, self.world_height - size, size, size)
    }

    /// Materialise every tile, allocating ids in build order
    pub fn build_blocks(&self, next_id: &mut impl FnMut() -> EntityId) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut push = |rect: Rect, kind: BlockKind, payload: Payload| {
            blocks.push(Block {
                id: next_id(),
                rect,
                kind,
                activated: false,
                payload,
            });
        };

        for x in (0..self.ground_columns()).filter(|x| !self.ground_holes.contains(x)) {
            push(self.ground_rect(x), BlockKind::Ground, Payload::Empty);
        }
        for row in &self.platforms {
            for i in 0..row.count {
                push(
                    self.cell_rect(row.grid_x + i, row.grid_y),
                    BlockKind::Platform,
                    Payload::Empty,
                );
            }
        }
        for spec in &self.question_blocks {
            push(
                self.cell_rect(spec.grid_x, spec.grid_y),
                BlockKind::Question,
                spec.payload,
            );
        }

        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(layout: &LevelLayout) -> Vec<Block> {
        let mut next = 0u32;
        layout.build_blocks(&mut || {
            next += 1;
            EntityId(next)
        })
    }

    #[test]
    fn test_classic_ground_has_three_holes() {
        let layout = LevelLayout::classic();
        let blocks = build(&layout);
        let ground: Vec<_> = blocks.iter().filter(|b| b.kind == BlockKind::Ground).collect();
        assert_eq!(layout.ground_columns(), 76);
        assert_eq!(ground.len(), 73);
        for hole in [10.0, 20.0, 30.0] {
            assert!(!ground.iter().any(|b| b.rect.x == hole * 32.0));
        }
        assert!(ground.iter().all(|b| b.rect.y == 568.0));
    }

    #[test]
    fn test_question_block_geometry() {
        let layout = LevelLayout::classic();
        let blocks = build(&layout);
        let questions: Vec<_> = blocks.iter().filter(|b| b.is_question()).collect();
        assert_eq!(questions.len(), 4);

        // (6, 5): centre line 160 above the bottom
        let first = questions[0];
        assert_eq!(first.rect, Rect::new(192.0, 424.0, 32.0, 32.0));
        assert_eq!(first.payload, Payload::Coin);
        assert_eq!(first.spawn_anchor(), Vec2::new(208.0, 408.0));

        let power = questions[3];
        assert_eq!(power.payload, Payload::PowerUp);
        assert_eq!(power.rect.y, 600.0 - 9.0 * 32.0 - 16.0);
    }

    #[test]
    fn test_ids_are_sequential() {
        let blocks = build(&LevelLayout::classic());
        assert!(blocks.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(blocks.len(), 73 + 5 + 4);
    }

    #[test]
    fn test_layout_from_json() {
        let json = serde_json::to_string(&LevelLayout::classic()).expect("serialize");
        let layout = LevelLayout::from_json(&json).expect("parse");
        assert_eq!(layout, LevelLayout::classic());

        let err = LevelLayout::from_json(&json.replace("\"cell_size\":32.0", "\"cell_size\":0.0"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
