//! Smoothed camera follow.
//!
//! Runs in the late phase so it reads the target's position after all
//! movement for the frame has been applied.

use platformer_shared::{
    config::CameraFollowConfig,
    ecs::{EntityId, Transform, World},
    math::Vec3,
};

/// Moves a camera toward `target + offset` with exponential smoothing.
///
/// The target is a non-owning handle: if it is unset or the entity no longer
/// exists the follower does nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraFollower {
    camera: EntityId,
    target: Option<EntityId>,
    pub offset: Vec3,
    pub transition_speed: f32,
}

impl CameraFollower {
    pub fn new(camera: EntityId, target: Option<EntityId>, cfg: &CameraFollowConfig) -> Self {
        Self {
            camera,
            target,
            offset: cfg.offset,
            transition_speed: cfg.transition_speed,
        }
    }

    pub fn camera(&self) -> EntityId {
        self.camera
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
    }

    pub fn late_update(&self, world: &mut World, dt: f32) {
        let Some(target) = self.target else {
            return;
        };
        let Some(target_pos) = world.get::<Transform>(target).map(|t| t.position) else {
            return;
        };
        let desired = target_pos + self.offset;
        if let Some(camera) = world.get_mut::<Transform>(self.camera) {
            camera.position = follow_step(camera.position, desired, self.transition_speed, dt);
        }
    }
}

/// One smoothing step: `lerp(current, desired, speed * dt)`, with t clamped to [0, 1].
pub fn follow_step(current: Vec3, desired: Vec3, speed: f32, dt: f32) -> Vec3 {
    current.lerp(desired, speed * dt)
}
