//! Player locomotion.
//!
//! Ties the ground sensor and jump rules to one physics body and forwards the
//! resulting flags to an optional animation sink. Jump/ground logic runs in
//! the frame update; planar movement runs in the fixed step.

use platformer_shared::{
    anim::{AnimationSink, IS_GROUNDED, IS_JUMPING, IS_WALKING},
    config::MovementConfig,
    ecs::{EntityId, World},
    input::{Axis, InputSource},
    math::Vec3,
    physics::PhysicsBackend,
    time::FrameTime,
};
use tracing::{debug, trace, warn};

use crate::{
    grounding::GroundSensor,
    jump::{JumpController, JumpEvent},
};

/// Per-character runtime state.
///
/// `grounded_time` accumulates while grounded and is zero whenever not.
/// `jump_key_released` starts armed so the first press can jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionState {
    pub is_grounded: bool,
    pub is_jumping: bool,
    pub is_walking: bool,
    pub jump_key_released: bool,
    pub grounded_time: f32,
    pub jump_count: u32,
    pub last_jump_time: f32,
}

impl Default for LocomotionState {
    fn default() -> Self {
        Self {
            is_grounded: false,
            is_jumping: false,
            is_walking: false,
            jump_key_released: true,
            grounded_time: 0.0,
            jump_count: 0,
            last_jump_time: 0.0,
        }
    }
}

impl LocomotionState {
    fn update_grounded_time(&mut self, dt: f32) {
        if self.is_grounded {
            self.grounded_time += dt;
        } else {
            self.grounded_time = 0.0;
        }
    }
}

/// Movement controller bound to one body.
#[derive(Debug, Clone)]
pub struct LocomotionController {
    body: EntityId,
    cfg: MovementConfig,
    sensor: GroundSensor,
    jump: JumpController,
    state: LocomotionState,
}

impl LocomotionController {
    pub fn new(body: EntityId, cfg: MovementConfig) -> Self {
        if cfg.ground_check_offset.is_none() {
            warn!(entity = ?body, "Ground check point not assigned, probing at body origin");
        }
        Self {
            body,
            sensor: GroundSensor::from_config(&cfg),
            jump: JumpController::from_config(&cfg),
            cfg,
            state: LocomotionState::default(),
        }
    }

    pub fn body(&self) -> EntityId {
        self.body
    }

    pub fn config(&self) -> &MovementConfig {
        &self.cfg
    }

    pub fn state(&self) -> &LocomotionState {
        &self.state
    }

    /// Frame update: ground check, jump/landing, gravity shaping.
    pub fn update(
        &mut self,
        world: &mut World,
        physics: &dyn PhysicsBackend,
        input: &dyn InputSource,
        time: &FrameTime,
        mut anim: Option<&mut dyn AnimationSink>,
    ) -> Option<JumpEvent> {
        let was_grounded = self.state.is_grounded;
        self.state.is_grounded = self
            .sensor
            .sense(world, physics, self.body, self.state.is_jumping);

        if let Some(anim) = anim.as_deref_mut() {
            anim.set_bool(IS_GROUNDED, self.state.is_grounded);
            if !was_grounded && self.state.is_grounded {
                anim.set_bool(IS_JUMPING, false);
            }
        }

        self.state.update_grounded_time(time.delta);

        let event = self
            .jump
            .handle_input(&mut self.state, world, physics, self.body, input, time);
        match event {
            Some(JumpEvent::Jumped) => {
                debug!(entity = ?self.body, jumps = self.state.jump_count, "Jump");
                if let Some(anim) = anim.as_deref_mut() {
                    anim.set_bool(IS_JUMPING, true);
                }
            }
            Some(JumpEvent::Landed) => debug!(entity = ?self.body, "Landed"),
            None => {}
        }

        self.jump.apply_extra_gravity(world, physics, self.body, input);

        trace!(
            entity = ?self.body,
            grounded = self.state.is_grounded,
            jumping = self.state.is_jumping,
            grounded_time = self.state.grounded_time,
            vy = physics.velocity(world, self.body).y,
            "Locomotion tick"
        );
        event
    }

    /// Fixed step: planar movement from the two axes.
    ///
    /// Returns the requested displacement, before collision resolution.
    pub fn fixed_update(
        &mut self,
        world: &mut World,
        physics: &dyn PhysicsBackend,
        input: &dyn InputSource,
        time: &FrameTime,
        anim: Option<&mut dyn AnimationSink>,
    ) -> Vec3 {
        let direction = planar_direction(input);
        let walking = direction.length() > self.cfg.move_deadzone;

        let mut displacement = Vec3::ZERO;
        if walking {
            if let Some(position) = physics.position(world, self.body) {
                displacement = direction * (self.cfg.move_speed * time.fixed_delta);
                physics.move_position(world, self.body, position + displacement);
            }
        }

        self.state.is_walking = walking;
        if let Some(anim) = anim {
            anim.set_bool(IS_WALKING, walking);
        }
        displacement
    }
}

/// Unit movement direction on the XZ plane, or zero at rest.
pub fn planar_direction(input: &dyn InputSource) -> Vec3 {
    Vec3::new(input.axis(Axis::Horizontal), 0.0, input.axis(Axis::Vertical)).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use platformer_shared::{
        anim::Animator,
        ecs::{Collider, RigidBody, Transform},
        input::{ButtonState, InputFrame},
        physics::{LayerMask, SimplePhysics},
    };

    use super::*;

    struct Rig {
        world: World,
        physics: SimplePhysics,
        body: EntityId,
        ctl: LocomotionController,
        anim: Animator,
        time: FrameTime,
    }

    impl Rig {
        fn new(cfg: MovementConfig) -> Self {
            let mut world = World::default();
            let floor = world.spawn();
            world.insert(floor, Transform::from_position(Vec3::new(0.0, -0.5, 0.0)));
            world.insert(
                floor,
                Collider {
                    half_extents: Vec3::new(20.0, 0.5, 20.0),
                    layer: LayerMask::GROUND,
                },
            );
            let body = world.spawn();
            world.insert(body, Transform::from_position(Vec3::new(0.0, 0.5, 0.0)));
            world.insert(body, RigidBody::new(Vec3::new(0.5, 0.5, 0.5), LayerMask::PLAYER));

            let cfg = MovementConfig {
                ground_check_offset: Some(Vec3::new(0.0, -0.5, 0.0)),
                ..cfg
            };
            Self {
                world,
                physics: SimplePhysics::default(),
                body,
                ctl: LocomotionController::new(body, cfg),
                anim: Animator::default(),
                time: FrameTime::new(0.02),
            }
        }

        fn tick(&mut self, input: InputFrame) -> Option<JumpEvent> {
            self.time.advance(0.02);
            self.ctl.fixed_update(
                &mut self.world,
                &self.physics,
                &input,
                &self.time,
                Some(&mut self.anim),
            );
            self.physics.step(&mut self.world, 0.02);
            self.ctl.update(
                &mut self.world,
                &self.physics,
                &input,
                &self.time,
                Some(&mut self.anim),
            )
        }
    }

    fn axes(h: f32, v: f32) -> InputFrame {
        InputFrame {
            horizontal: h,
            vertical: v,
            ..InputFrame::default()
        }
    }

    #[test]
    fn walking_displacement_matches_speed() {
        let mut rig = Rig::new(MovementConfig::default());
        rig.time.advance(0.02);

        let d = rig.ctl.fixed_update(
            &mut rig.world,
            &rig.physics,
            &axes(1.0, 0.0),
            &rig.time,
            Some(&mut rig.anim),
        );

        assert!(d.abs_diff_le(Vec3::new(0.1, 0.0, 0.0), 1e-6));
        let pending = rig.world.get::<RigidBody>(rig.body).unwrap().pending_move;
        assert!(pending.unwrap().abs_diff_le(Vec3::new(0.1, 0.5, 0.0), 1e-6));
        assert!(rig.anim.flag(IS_WALKING));
        assert!(rig.ctl.state().is_walking);
    }

    #[test]
    fn diagonal_input_is_normalized() {
        let mut rig = Rig::new(MovementConfig::default());
        rig.time.advance(0.02);
        let d = rig.ctl.fixed_update(
            &mut rig.world,
            &rig.physics,
            &axes(1.0, 1.0),
            &rig.time,
            None,
        );
        assert!((d.length() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn small_input_does_not_walk() {
        let mut rig = Rig::new(MovementConfig::default());
        rig.anim.set_bool(IS_WALKING, true);
        rig.time.advance(0.02);
        let d = rig.ctl.fixed_update(
            &mut rig.world,
            &rig.physics,
            &axes(0.0, 0.0),
            &rig.time,
            Some(&mut rig.anim),
        );
        assert_eq!(d, Vec3::ZERO);
        assert_eq!(rig.anim.get(IS_WALKING), Some(false));
        assert!(rig.world.get::<RigidBody>(rig.body).unwrap().pending_move.is_none());
    }

    #[test]
    fn jump_then_land_cycle() {
        let mut rig = Rig::new(MovementConfig::default());
        for _ in 0..5 {
            rig.tick(InputFrame::default());
        }
        assert!(rig.ctl.state().is_grounded);
        assert!(rig.anim.flag(IS_GROUNDED));

        let press = InputFrame {
            jump: ButtonState {
                held: true,
                pressed: true,
                released: false,
            },
            ..InputFrame::default()
        };
        assert_eq!(rig.tick(press), Some(JumpEvent::Jumped));
        assert!(rig.anim.flag(IS_JUMPING));

        // Rising right after the impulse: contact is ignored.
        rig.tick(InputFrame::default());
        assert!(!rig.ctl.state().is_grounded);

        let mut landed = false;
        for _ in 0..200 {
            if rig.tick(InputFrame::default()) == Some(JumpEvent::Landed) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!(!rig.ctl.state().is_jumping);
        assert!(!rig.anim.flag(IS_JUMPING));
        assert!(rig.anim.flag(IS_GROUNDED));
    }

    #[test]
    fn runs_without_animator() {
        let mut rig = Rig::new(MovementConfig::default());
        rig.time.advance(0.02);
        let input = axes(0.0, 1.0);
        rig.ctl
            .fixed_update(&mut rig.world, &rig.physics, &input, &rig.time, None);
        rig.ctl
            .update(&mut rig.world, &rig.physics, &input, &rig.time, None);
        assert!(rig.ctl.state().is_walking);
        assert_eq!(rig.anim.get(IS_WALKING), None);
    }
}
