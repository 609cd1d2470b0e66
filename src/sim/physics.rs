//! Physics seam and the reference arcade solver
//!
//! The simulation treats physics as a black box behind [`PhysicsAdapter`]: it
//! integrates velocity and gravity, separates overlapping bodies, and reports
//! per-body contact flags plus per-pair [`ContactEvent`]s for the step.
//!
//! [`ArcadePhysics`] is a small axis-aligned implementation: statics never
//! move, dynamic bodies are moved one axis at a time and pushed out of static
//! rects, then dynamic pairs are separated. A pair is split along the axis on
//! which it was still apart before the step, so a body dropping onto another's
//! shoulder lands on top instead of being pushed sideways. Only pairs that
//! already overlapped on both axes fall back to the axis of least overlap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::EntityId;
use crate::Rect;

/// Overlaps thinner than this are treated as resting contact, not penetration
const OVERLAP_EPSILON: f32 = 1e-3;

/// One boolean per box side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sides {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Sides {
    pub const NONE: Sides = Sides {
        up: false,
        down: false,
        left: false,
        right: false,
    };
    pub const UP: Sides = Sides {
        up: true,
        ..Sides::NONE
    };
    pub const DOWN: Sides = Sides {
        down: true,
        ..Sides::NONE
    };
    pub const LEFT: Sides = Sides {
        left: true,
        ..Sides::NONE
    };
    pub const RIGHT: Sides = Sides {
        right: true,
        ..Sides::NONE
    };

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    pub fn union(self, other: Sides) -> Sides {
        Sides {
            up: self.up || other.up,
            down: self.down || other.down,
            left: self.left || other.left,
            right: self.right || other.right,
        }
    }

    /// Clear every side set in `other`
    pub fn without(self, other: Sides) -> Sides {
        Sides {
            up: self.up && !other.up,
            down: self.down && !other.down,
            left: self.left && !other.left,
            right: self.right && !other.right,
        }
    }
}

/// Contact state of one body for the current step
///
/// `touching` covers every contact; `blocked` only immovable ones (terrain and
/// world bounds).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFlags {
    pub touching: Sides,
    pub blocked: Sides,
}

impl ContactFlags {
    /// Standing on something this step
    pub fn grounded(&self) -> bool {
        self.touching.down || self.blocked.down
    }

    pub fn without_touching(self, sides: Sides) -> ContactFlags {
        ContactFlags {
            touching: self.touching.without(sides),
            blocked: self.blocked,
        }
    }
}

/// A contact between two bodies during one step, with the side of each body
/// that was hit. Valid only for the tick it was produced in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    pub a: EntityId,
    pub b: EntityId,
    pub a_sides: Sides,
    pub b_sides: Sides,
    /// Non-solid overlap (pickups); no separation happened
    pub overlap_only: bool,
}

impl ContactEvent {
    pub fn involves(&self, id: EntityId) -> bool {
        self.a == id || self.b == id
    }
}

/// Collision layer of a body; decides which pairs interact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    Player,
    Enemy,
    PowerUp,
    /// Static level geometry
    Terrain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Solid: bodies are separated
    Collide,
    /// Detect only
    Overlap,
}

/// Pair rules: everything moving collides with terrain, the player and enemies
/// collide with each other, enemies bounce off enemies, the player only
/// overlaps power-ups.
pub fn interaction(a: Layer, b: Layer) -> Option<Interaction> {
    use Layer::*;
    match (a, b) {
        (Terrain, Terrain) => None,
        (_, Terrain) | (Terrain, _) => Some(Interaction::Collide),
        (Player, Enemy) | (Enemy, Player) | (Enemy, Enemy) => Some(Interaction::Collide),
        (Player, PowerUp) | (PowerUp, Player) => Some(Interaction::Overlap),
        _ => None,
    }
}

/// Everything needed to create a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub layer: Layer,
    pub center: Vec2,
    pub half_extents: Vec2,
    pub velocity: Vec2,
    pub gravity: bool,
    pub collide_world_bounds: bool,
}

impl BodyDesc {
    /// Immovable terrain occupying `rect`
    pub fn terrain(rect: Rect) -> Self {
        Self {
            layer: Layer::Terrain,
            center: rect.center(),
            half_extents: rect.half_extents(),
            velocity: Vec2::ZERO,
            gravity: false,
            collide_world_bounds: false,
        }
    }
}

/// Kinematic state read back after a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub center: Vec2,
    pub velocity: Vec2,
    pub half_extents: Vec2,
}

/// The physics collaborator
pub trait PhysicsAdapter {
    fn insert_body(&mut self, id: EntityId, desc: BodyDesc);
    fn remove_body(&mut self, id: EntityId);
    fn set_velocity(&mut self, id: EntityId, velocity: Vec2);
    fn set_gravity(&mut self, id: EntityId, enabled: bool);
    /// Resize a body keeping its bottom edge in place
    fn set_half_extents(&mut self, id: EntityId, half_extents: Vec2);
    fn body(&self, id: EntityId) -> Option<BodySnapshot>;
    /// `None` until the body has been through at least one step
    fn contacts(&self, id: EntityId) -> Option<ContactFlags>;
    /// Integrate one step and report the contacts it produced
    fn step(&mut self, dt: f32) -> Vec<ContactEvent>;
    /// Freeze integration for good
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
}

#[derive(Debug, Clone)]
struct DynamicBody {
    id: EntityId,
    layer: Layer,
    center: Vec2,
    /// Center before the current step's integration
    prev_center: Vec2,
    half: Vec2,
    velocity: Vec2,
    gravity: bool,
    collide_world_bounds: bool,
    contacts: ContactFlags,
    integrated: bool,
}

impl DynamicBody {
    fn rect(&self) -> Rect {
        Rect::from_center(self.center, self.half)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone)]
struct StaticBody {
    id: EntityId,
    rect: Rect,
}

/// Penetration depth on both axes, if the rects overlap
fn overlap(a: &Rect, b: &Rect) -> Option<Vec2> {
    let ox = a.right().min(b.right()) - a.x.max(b.x);
    let oy = a.bottom().min(b.bottom()) - a.y.max(b.y);
    (ox > OVERLAP_EPSILON && oy > OVERLAP_EPSILON).then_some(Vec2::new(ox, oy))
}

/// Merges repeated contacts between the same pair within one step
#[derive(Default)]
struct ContactLog {
    events: Vec<ContactEvent>,
}

impl ContactLog {
    fn record(&mut self, a: EntityId, b: EntityId, a_sides: Sides, b_sides: Sides, overlap_only: bool) {
        if let Some(existing) = self.events.iter_mut().find(|e| e.a == a && e.b == b) {
            existing.a_sides = existing.a_sides.union(a_sides);
            existing.b_sides = existing.b_sides.union(b_sides);
            return;
        }
        self.events.push(ContactEvent {
            a,
            b,
            a_sides,
            b_sides,
            overlap_only,
        });
    }
}

/// Reference arcade-style solver
#[derive(Debug, Clone)]
pub struct ArcadePhysics {
    gravity: f32,
    bounds: Rect,
    /// Sorted by id for deterministic iteration
    bodies: Vec<DynamicBody>,
    statics: Vec<StaticBody>,
    paused: bool,
}

impl ArcadePhysics {
    pub fn new(gravity: f32, bounds: Rect) -> Self {
        Self {
            gravity,
            bounds,
            bodies: Vec::new(),
            statics: Vec::new(),
            paused: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len() + self.statics.len()
    }

    fn dynamic(&self, id: EntityId) -> Option<&DynamicBody> {
        let i = self.bodies.binary_search_by_key(&id, |b| b.id).ok()?;
        Some(&self.bodies[i])
    }

    fn dynamic_mut(&mut self, id: EntityId) -> Option<&mut DynamicBody> {
        let i = self.bodies.binary_search_by_key(&id, |b| b.id).ok()?;
        Some(&mut self.bodies[i])
    }

    /// Move along x and push out of statics
    fn sweep_x(body: &mut DynamicBody, statics: &[StaticBody], dt: f32, log: &mut ContactLog) {
        body.center.x += body.velocity.x * dt;
        for s in statics {
            if overlap(&body.rect(), &s.rect).is_none() {
                continue;
            }
            let (body_side, static_side) = if body.center.x < s.rect.center().x {
                body.center.x = s.rect.x - body.half.x;
                body.velocity.x = body.velocity.x.min(0.0);
                (Sides::RIGHT, Sides::LEFT)
            } else {
                body.center.x = s.rect.right() + body.half.x;
                body.velocity.x = body.velocity.x.max(0.0);
                (Sides::LEFT, Sides::RIGHT)
            };
            body.contacts.touching = body.contacts.touching.union(body_side);
            body.contacts.blocked = body.contacts.blocked.union(body_side);
            log.record(body.id, s.id, body_side, static_side, false);
        }
    }

    /// Move along y and push out of statics
    fn sweep_y(body: &mut DynamicBody, statics: &[StaticBody], dt: f32, log: &mut ContactLog) {
        body.center.y += body.velocity.y * dt;
        for s in statics {
            if overlap(&body.rect(), &s.rect).is_none() {
                continue;
            }
            let (body_side, static_side) = if body.center.y < s.rect.center().y {
                body.center.y = s.rect.y - body.half.y;
                body.velocity.y = body.velocity.y.min(0.0);
                (Sides::DOWN, Sides::UP)
            } else {
                body.center.y = s.rect.bottom() + body.half.y;
                body.velocity.y = body.velocity.y.max(0.0);
                (Sides::UP, Sides::DOWN)
            };
            body.contacts.touching = body.contacts.touching.union(body_side);
            body.contacts.blocked = body.contacts.blocked.union(body_side);
            log.record(body.id, s.id, body_side, static_side, false);
        }
    }

    fn clamp_to_bounds(body: &mut DynamicBody, bounds: &Rect) {
        let half = body.half;
        let blocked = &mut body.contacts.blocked;
        if body.center.x - half.x < bounds.x {
            body.center.x = bounds.x + half.x;
            body.velocity.x = body.velocity.x.max(0.0);
            blocked.left = true;
        } else if body.center.x + half.x > bounds.right() {
            body.center.x = bounds.right() - half.x;
            body.velocity.x = body.velocity.x.min(0.0);
            blocked.right = true;
        }
        if body.center.y - half.y < bounds.y {
            body.center.y = bounds.y + half.y;
            body.velocity.y = body.velocity.y.max(0.0);
            blocked.up = true;
        } else if body.center.y + half.y > bounds.bottom() {
            body.center.y = bounds.bottom() - half.y;
            body.velocity.y = body.velocity.y.min(0.0);
            blocked.down = true;
        }
    }

    /// Axis to split a pair along: the one on which the pair was still apart
    /// before this step, vertical first. Falls back to least overlap.
    fn separation_axis(a: &DynamicBody, b: &DynamicBody, depth: Vec2) -> Axis {
        let reach = a.half + b.half - Vec2::splat(OVERLAP_EPSILON);
        let gap = (a.prev_center - b.prev_center).abs();
        if gap.y >= reach.y {
            Axis::Y
        } else if gap.x >= reach.x {
            Axis::X
        } else if depth.x < depth.y {
            Axis::X
        } else {
            Axis::Y
        }
    }

    /// Push a solid dynamic pair apart along `axis`
    fn separate(a: &mut DynamicBody, b: &mut DynamicBody, depth: Vec2, axis: Axis) -> (Sides, Sides) {
        if axis == Axis::X {
            let push = depth.x / 2.0;
            if a.center.x < b.center.x {
                a.center.x -= push;
                b.center.x += push;
                a.velocity.x = a.velocity.x.min(0.0);
                b.velocity.x = b.velocity.x.max(0.0);
                (Sides::RIGHT, Sides::LEFT)
            } else {
                a.center.x += push;
                b.center.x -= push;
                a.velocity.x = a.velocity.x.max(0.0);
                b.velocity.x = b.velocity.x.min(0.0);
                (Sides::LEFT, Sides::RIGHT)
            }
        } else {
            let push = depth.y / 2.0;
            if a.center.y < b.center.y {
                a.center.y -= push;
                b.center.y += push;
                a.velocity.y = a.velocity.y.min(0.0);
                b.velocity.y = b.velocity.y.max(0.0);
                (Sides::DOWN, Sides::UP)
            } else {
                a.center.y += push;
                b.center.y -= push;
                a.velocity.y = a.velocity.y.max(0.0);
                b.velocity.y = b.velocity.y.min(0.0);
                (Sides::UP, Sides::DOWN)
            }
        }
    }
}

impl PhysicsAdapter for ArcadePhysics {
    fn insert_body(&mut self, id: EntityId, desc: BodyDesc) {
        self.remove_body(id);
        if desc.layer == Layer::Terrain {
            let rect = Rect::from_center(desc.center, desc.half_extents);
            let at = self.statics.partition_point(|s| s.id < id);
            self.statics.insert(at, StaticBody { id, rect });
            return;
        }
        let at = self.bodies.partition_point(|b| b.id < id);
        self.bodies.insert(
            at,
            DynamicBody {
                id,
                layer: desc.layer,
                center: desc.center,
                prev_center: desc.center,
                half: desc.half_extents,
                velocity: desc.velocity,
                gravity: desc.gravity,
                collide_world_bounds: desc.collide_world_bounds,
                contacts: ContactFlags::default(),
                integrated: false,
            },
        );
    }

    fn remove_body(&mut self, id: EntityId) {
        self.bodies.retain(|b| b.id != id);
        self.statics.retain(|s| s.id != id);
    }

    fn set_velocity(&mut self, id: EntityId, velocity: Vec2) {
        if let Some(body) = self.dynamic_mut(id) {
            body.velocity = velocity;
        }
    }

    fn set_gravity(&mut self, id: EntityId, enabled: bool) {
        if let Some(body) = self.dynamic_mut(id) {
            body.gravity = enabled;
        }
    }

    fn set_half_extents(&mut self, id: EntityId, half_extents: Vec2) {
        if let Some(body) = self.dynamic_mut(id) {
            let bottom = body.center.y + body.half.y;
            body.half = half_extents;
            body.center.y = bottom - half_extents.y;
        }
    }

    fn body(&self, id: EntityId) -> Option<BodySnapshot> {
        if let Some(body) = self.dynamic(id) {
            return Some(BodySnapshot {
                center: body.center,
                velocity: body.velocity,
                half_extents: body.half,
            });
        }
        self.statics
            .iter()
            .find(|s| s.id == id)
            .map(|s| BodySnapshot {
                center: s.rect.center(),
                velocity: Vec2::ZERO,
                half_extents: s.rect.half_extents(),
            })
    }

    fn contacts(&self, id: EntityId) -> Option<ContactFlags> {
        self.dynamic(id)
            .filter(|b| b.integrated)
            .map(|b| b.contacts)
    }

    fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        if self.paused {
            return Vec::new();
        }

        let mut log = ContactLog::default();
        let gravity = self.gravity;
        let bounds = self.bounds;
        let statics = &self.statics;
        let bodies = &mut self.bodies;

        for body in bodies.iter_mut() {
            body.contacts = ContactFlags::default();
            body.prev_center = body.center;
            if body.gravity {
                body.velocity.y += gravity * dt;
            }
            Self::sweep_x(body, statics, dt, &mut log);
            Self::sweep_y(body, statics, dt, &mut log);
            if body.collide_world_bounds {
                Self::clamp_to_bounds(body, &bounds);
            }
            body.integrated = true;
        }

        for j in 1..bodies.len() {
            let (head, tail) = bodies.split_at_mut(j);
            let b = &mut tail[0];
            for a in head.iter_mut() {
                let Some(kind) = interaction(a.layer, b.layer) else {
                    continue;
                };
                let Some(depth) = overlap(&a.rect(), &b.rect()) else {
                    continue;
                };
                match kind {
                    Interaction::Overlap => {
                        log.record(a.id, b.id, Sides::NONE, Sides::NONE, true);
                    }
                    Interaction::Collide => {
                        let axis = Self::separation_axis(a, b, depth);
                        let (a_side, b_side) = Self::separate(a, b, depth, axis);
                        a.contacts.touching = a.contacts.touching.union(a_side);
                        b.contacts.touching = b.contacts.touching.union(b_side);
                        log.record(a.id, b.id, a_side, b_side, false);
                    }
                }
            }
        }

        log.events
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
