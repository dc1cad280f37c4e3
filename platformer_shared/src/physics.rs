//! Physics abstraction.
//!
//! Controllers talk to physics only through [`PhysicsBackend`]: overlap
//! queries, velocity access, impulses, accelerations and collision-aware
//! moves. [`SimplePhysics`] is a deterministic box-vs-box backend that is good
//! enough for a flat platformer scene and for headless tests.

use serde::{Deserialize, Serialize};

use crate::{
    ecs::{Collider, EntityId, RigidBody, Transform, World},
    math::Vec3,
};

bitflags::bitflags! {
    /// Collision layers. A query mask matches any collider sharing a bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct LayerMask: u32 {
        const DEFAULT = 1 << 0;
        const GROUND = 1 << 1;
        const PLAYER = 1 << 2;
        const SCENERY = 1 << 3;
        const ALL = u32::MAX;
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Physics parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    pub gravity: Vec3,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

impl PhysicsConfig {
    pub fn gravity_magnitude(&self) -> f32 {
        self.gravity.length()
    }
}

/// Physics stepper and query surface.
///
/// Body operations have default implementations that edit the [`RigidBody`]
/// component directly; the accumulated acceleration and pending move are
/// consumed by the backend's next [`step`](PhysicsBackend::step). Operations on
/// an entity without a body are ignored.
pub trait PhysicsBackend: Send + Sync {
    /// Advances every body by `dt_sec`.
    fn step(&mut self, world: &mut World, dt_sec: f32);

    /// Global gravity vector.
    fn gravity(&self) -> Vec3;

    /// True if a sphere overlaps any static collider on a layer in `mask`.
    fn check_sphere(&self, world: &World, center: Vec3, radius: f32, mask: LayerMask) -> bool;

    fn gravity_magnitude(&self) -> f32 {
        self.gravity().length()
    }

    fn position(&self, world: &World, body: EntityId) -> Option<Vec3> {
        world.get::<Transform>(body).map(|t| t.position)
    }

    fn velocity(&self, world: &World, body: EntityId) -> Vec3 {
        world
            .get::<RigidBody>(body)
            .map(|b| b.velocity)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(&self, world: &mut World, body: EntityId, velocity: Vec3) {
        if let Some(b) = world.get_mut::<RigidBody>(body) {
            b.velocity = velocity;
        }
    }

    /// Instantaneous velocity change of `impulse / mass`.
    fn apply_impulse(&self, world: &mut World, body: EntityId, impulse: Vec3) {
        if let Some(b) = world.get_mut::<RigidBody>(body) {
            let inv_mass = if b.mass > 0.0 { 1.0 / b.mass } else { 0.0 };
            b.velocity += impulse * inv_mass;
        }
    }

    /// Continuous acceleration applied over the next step, independent of mass.
    fn apply_acceleration(&self, world: &mut World, body: EntityId, acceleration: Vec3) {
        if let Some(b) = world.get_mut::<RigidBody>(body) {
            b.pending_acceleration += acceleration;
        }
    }

    /// Requests a move to `target`, resolved against colliders on the next step.
    fn move_position(&self, world: &mut World, body: EntityId, target: Vec3) {
        if let Some(b) = world.get_mut::<RigidBody>(body) {
            b.pending_move = Some(target);
        }
    }
}

/// Deterministic box physics against static colliders.
#[derive(Debug, Clone, Default)]
pub struct SimplePhysics {
    pub cfg: PhysicsConfig,
}

impl SimplePhysics {
    pub fn new(cfg: PhysicsConfig) -> Self {
        Self { cfg }
    }
}

impl PhysicsBackend for SimplePhysics {
    fn step(&mut self, world: &mut World, dt_sec: f32) {
        let statics: Vec<(Vec3, Collider)> = world
            .iter::<Collider>()
            .filter_map(|(id, c)| world.get::<Transform>(id).map(|t| (t.position, *c)))
            .collect();

        for id in world.ids() {
            let (Some(body), Some(transform)) = (
                world.get::<RigidBody>(id).copied(),
                world.get::<Transform>(id).copied(),
            ) else {
                continue;
            };

            let mut velocity =
                body.velocity + (self.cfg.gravity + body.pending_acceleration) * dt_sec;
            let mut position = body.pending_move.unwrap_or(transform.position) + velocity * dt_sec;

            for (center, collider) in &statics {
                let Some(push) =
                    penetration(position, body.half_extents, *center, collider.half_extents)
                else {
                    continue;
                };
                position += push;
                if push.x * velocity.x < 0.0 {
                    velocity.x = 0.0;
                }
                if push.y * velocity.y < 0.0 {
                    velocity.y = 0.0;
                }
                if push.z * velocity.z < 0.0 {
                    velocity.z = 0.0;
                }
            }

            if let Some(b) = world.get_mut::<RigidBody>(id) {
                b.velocity = velocity;
                b.pending_acceleration = Vec3::ZERO;
                b.pending_move = None;
            }
            if let Some(t) = world.get_mut::<Transform>(id) {
                t.position = position;
            }
        }
    }

    fn gravity(&self) -> Vec3 {
        self.cfg.gravity
    }

    fn check_sphere(&self, world: &World, center: Vec3, radius: f32, mask: LayerMask) -> bool {
        let r_sq = radius * radius;
        world
            .iter::<Collider>()
            .filter(|(_, c)| c.layer.intersects(mask))
            .filter_map(|(id, c)| world.get::<Transform>(id).map(|t| (t.position, c.half_extents)))
            .any(|(box_center, half)| {
                let closest = Vec3::new(
                    center.x.clamp(box_center.x - half.x, box_center.x + half.x),
                    center.y.clamp(box_center.y - half.y, box_center.y + half.y),
                    center.z.clamp(box_center.z - half.z, box_center.z + half.z),
                );
                (center - closest).len_sq() <= r_sq
            })
    }
}

/// Minimum translation that separates box `a` from box `b`, if they overlap.
fn penetration(a: Vec3, a_half: Vec3, b: Vec3, b_half: Vec3) -> Option<Vec3> {
    let d = a - b;
    let overlap = Vec3::new(
        a_half.x + b_half.x - d.x.abs(),
        a_half.y + b_half.y - d.y.abs(),
        a_half.z + b_half.z - d.z.abs(),
    );
    if overlap.x <= 0.0 || overlap.y <= 0.0 || overlap.z <= 0.0 {
        return None;
    }
    let sign = |v: f32| if v < 0.0 { -1.0 } else { 1.0 };
    let push = if overlap.y <= overlap.x && overlap.y <= overlap.z {
        Vec3::new(0.0, overlap.y * sign(d.y), 0.0)
    } else if overlap.x <= overlap.z {
        Vec3::new(overlap.x * sign(d.x), 0.0, 0.0)
    } else {
        Vec3::new(0.0, 0.0, overlap.z * sign(d.z))
    };
    Some(push)
}
