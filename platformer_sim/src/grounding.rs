//! Ground contact sensing.

use platformer_shared::{
    config::MovementConfig,
    ecs::{EntityId, World},
    math::Vec3,
    physics::{LayerMask, PhysicsBackend},
};

/// Sphere probe at a character's feet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundSensor {
    /// Probe position relative to the body. `None` probes at the body origin.
    pub offset: Option<Vec3>,
    pub radius: f32,
    pub mask: LayerMask,
    /// Upward speed above which an active jump is never grounded.
    pub rising_threshold: f32,
}

impl GroundSensor {
    pub fn from_config(cfg: &MovementConfig) -> Self {
        Self {
            offset: cfg.ground_check_offset,
            radius: cfg.ground_check_radius,
            mask: cfg.ground_layers,
            rising_threshold: cfg.rising_velocity_threshold,
        }
    }

    /// World-space probe center, if the body still has a transform.
    pub fn probe_point(
        &self,
        world: &World,
        physics: &dyn PhysicsBackend,
        body: EntityId,
    ) -> Option<Vec3> {
        let origin = physics.position(world, body)?;
        Some(origin + self.offset.unwrap_or(Vec3::ZERO))
    }

    /// Samples ground contact for this tick.
    ///
    /// While `is_jumping` and still rising faster than `rising_threshold` the
    /// result is false even if the probe overlaps ground: the body can still
    /// intersect the floor on the first ticks after the impulse.
    pub fn sense(
        &self,
        world: &World,
        physics: &dyn PhysicsBackend,
        body: EntityId,
        is_jumping: bool,
    ) -> bool {
        let Some(point) = self.probe_point(world, physics, body) else {
            return false;
        };
        let touching = physics.check_sphere(world, point, self.radius, self.mask);
        if is_jumping && physics.velocity(world, body).y > self.rising_threshold {
            return false;
        }
        touching
    }
}
