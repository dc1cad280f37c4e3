//! Jump rules and gravity shaping.
//!
//! Two policies are supported (see [`JumpPolicy`]):
//! - single jump, edge-triggered, gated on the button having been released
//!   and on having stood on the ground for `ground_delay`;
//! - multi jump, up to `max_jumps` presses between ground contacts, each
//!   separated by `jump_cooldown` seconds of elapsed time.
//!
//! Gravity shaping is shared: extra downward acceleration while falling (with
//! a terminal speed clamp), and while rising with the button released so a
//! short tap gives a short hop.

use platformer_shared::{
    config::{JumpPolicy, MovementConfig},
    ecs::{EntityId, World},
    input::{Button, InputSource},
    math::Vec3,
    physics::PhysicsBackend,
    time::FrameTime,
};

use crate::locomotion::LocomotionState;

/// Transition produced by [`JumpController::handle_input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpEvent {
    Jumped,
    Landed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpController {
    pub policy: JumpPolicy,
    pub jump_force: f32,
    pub ground_delay: f32,
    pub landing_delay: f32,
    pub landing_velocity_threshold: f32,
    pub jump_cooldown: f32,
    pub max_jumps: u32,
    pub fall_multiplier: f32,
    pub low_jump_multiplier: f32,
    pub max_fall_speed: f32,
}

impl JumpController {
    pub fn from_config(cfg: &MovementConfig) -> Self {
        Self {
            policy: cfg.jump_policy,
            jump_force: cfg.jump_force,
            ground_delay: cfg.ground_delay,
            landing_delay: cfg.landing_delay,
            landing_velocity_threshold: cfg.landing_velocity_threshold,
            jump_cooldown: cfg.jump_cooldown,
            max_jumps: cfg.max_jumps,
            fall_multiplier: cfg.fall_multiplier,
            low_jump_multiplier: cfg.low_jump_multiplier,
            max_fall_speed: cfg.max_fall_speed,
        }
    }

    /// Runs release tracking, the jump check and the landing check for one tick.
    ///
    /// Expects `state.is_grounded` and `state.grounded_time` to be current.
    pub fn handle_input(
        &self,
        state: &mut LocomotionState,
        world: &mut World,
        physics: &dyn PhysicsBackend,
        body: EntityId,
        input: &dyn InputSource,
        time: &FrameTime,
    ) -> Option<JumpEvent> {
        if input.button_up(Button::Jump) {
            state.jump_key_released = true;
        }

        match self.policy {
            JumpPolicy::SingleWithRelease => {
                let can_jump = state.is_grounded
                    && state.grounded_time > self.ground_delay
                    && !state.is_jumping
                    && state.jump_key_released;

                if can_jump && input.button_down(Button::Jump) {
                    self.launch(state, world, physics, body);
                    return Some(JumpEvent::Jumped);
                }

                let vy = physics.velocity(world, body).y;
                if state.is_jumping
                    && state.is_grounded
                    && state.grounded_time > self.landing_delay
                    && vy < self.landing_velocity_threshold
                {
                    state.is_jumping = false;
                    return Some(JumpEvent::Landed);
                }
                None
            }
            JumpPolicy::MultiWithCooldown => {
                let mut event = None;
                if state.is_grounded {
                    state.jump_count = 0;
                    if state.is_jumping {
                        state.is_jumping = false;
                        event = Some(JumpEvent::Landed);
                    }
                }

                let cooled_down = time.elapsed - state.last_jump_time >= self.jump_cooldown;
                if input.button_down(Button::Jump)
                    && state.jump_count < self.max_jumps
                    && cooled_down
                {
                    self.launch(state, world, physics, body);
                    state.jump_count += 1;
                    state.last_jump_time = time.elapsed;
                    event = Some(JumpEvent::Jumped);
                }
                event
            }
        }
    }

    fn launch(
        &self,
        state: &mut LocomotionState,
        world: &mut World,
        physics: &dyn PhysicsBackend,
        body: EntityId,
    ) {
        state.is_jumping = true;
        state.is_grounded = false;
        state.grounded_time = 0.0;
        state.jump_key_released = false;

        let v = physics.velocity(world, body);
        physics.set_velocity(world, body, Vec3::new(v.x, 0.0, v.z));
        physics.apply_impulse(world, body, Vec3::UP * self.jump_force);
    }

    /// Adds fall or low-jump gravity and clamps terminal fall speed.
    pub fn apply_extra_gravity(
        &self,
        world: &mut World,
        physics: &dyn PhysicsBackend,
        body: EntityId,
        input: &dyn InputSource,
    ) {
        let g = physics.gravity_magnitude();
        let v = physics.velocity(world, body);

        if v.y < 0.0 {
            physics.apply_acceleration(world, body, Vec3::DOWN * (self.fall_multiplier * g));
            if v.y < -self.max_fall_speed {
                physics.set_velocity(world, body, Vec3::new(v.x, -self.max_fall_speed, v.z));
            }
        } else if v.y > 0.0 && !input.button(Button::Jump) {
            physics.apply_acceleration(world, body, Vec3::DOWN * (self.low_jump_multiplier * g));
        }
    }
}

#[cfg(test)]
mod tests {
    use platformer_shared::{
        ecs::{RigidBody, Transform},
        input::{ButtonState, InputFrame},
        physics::{LayerMask, SimplePhysics},
    };

    use super::*;

    fn body_world() -> (World, EntityId) {
        let mut world = World::default();
        let body = world.spawn();
        world.insert(body, Transform::default());
        world.insert(body, RigidBody::new(Vec3::new(0.5, 0.5, 0.5), LayerMask::PLAYER));
        (world, body)
    }

    fn jump(pressed: bool, held: bool, released: bool) -> InputFrame {
        InputFrame {
            jump: ButtonState {
                held,
                pressed,
                released,
            },
            ..InputFrame::default()
        }
    }

    fn grounded_for(t: f32) -> LocomotionState {
        LocomotionState {
            is_grounded: true,
            grounded_time: t,
            ..LocomotionState::default()
        }
    }

    fn at(elapsed: f32) -> FrameTime {
        FrameTime {
            delta: 0.02,
            fixed_delta: 0.02,
            elapsed,
            frame: 0,
        }
    }

    #[test]
    fn single_jump_sets_state_and_velocity() {
        let (mut world, body) = body_world();
        let physics = SimplePhysics::default();
        physics.set_velocity(&mut world, body, Vec3::new(1.0, -0.5, 0.0));
        let ctl = JumpController::from_config(&MovementConfig::default());
        let mut state = grounded_for(0.1);

        let ev = ctl.handle_input(
            &mut state,
            &mut world,
            &physics,
            body,
            &jump(true, true, false),
            &at(1.0),
        );

        assert_eq!(ev, Some(JumpEvent::Jumped));
        assert!(state.is_jumping);
        assert!(!state.is_grounded);
        assert_eq!(state.grounded_time, 0.0);
        assert!(!state.jump_key_released);
        assert_eq!(physics.velocity(&world, body), Vec3::new(1.0, 5.0, 0.0));
    }

    #[test]
    fn single_jump_waits_for_ground_delay() {
        let (mut world, body) = body_world();
        let physics = SimplePhysics::default();
        let ctl = JumpController::from_config(&MovementConfig::default());
        let mut state = grounded_for(0.04);

        let ev = ctl.handle_input(
            &mut state,
            &mut world,
            &physics,
            body,
            &jump(true, true, false),
            &at(1.0),
        );
        assert_eq!(ev, None);
        assert!(!state.is_jumping);
    }

    #[test]
    fn single_jump_requires_release_edge() {
        let (mut world, body) = body_world();
        let physics = SimplePhysics::default();
        let ctl = JumpController::from_config(&MovementConfig::default());
        let mut state = LocomotionState {
            jump_key_released: false,
            ..grounded_for(0.5)
        };

        let press = jump(true, true, false);
        assert_eq!(
            ctl.handle_input(&mut state, &mut world, &physics, body, &press, &at(1.0)),
            None
        );

        // The release edge re-arms; a press on the same tick as a release is not
        // possible, so the next press fires.
        let release = jump(false, false, true);
        ctl.handle_input(&mut state, &mut world, &physics, body, &release, &at(1.02));
        assert!(state.jump_key_released);
        assert_eq!(
            ctl.handle_input(&mut state, &mut world, &physics, body, &press, &at(1.04)),
            Some(JumpEvent::Jumped)
        );
    }

    #[test]
    fn single_jump_lands_after_landing_delay() {
        let (mut world, body) = body_world();
        let physics = SimplePhysics::default();
        let ctl = JumpController::from_config(&MovementConfig::default());
        let idle = InputFrame::default();

        let mut state = LocomotionState {
            is_jumping: true,
            ..grounded_for(0.02)
        };
        assert_eq!(
            ctl.handle_input(&mut state, &mut world, &physics, body, &idle, &at(1.0)),
            None
        );
        assert!(state.is_jumping);

        state.grounded_time = 0.06;
        assert_eq!(
            ctl.handle_input(&mut state, &mut world, &physics, body, &idle, &at(1.04)),
            Some(JumpEvent::Landed)
        );
        assert!(!state.is_jumping);
    }

    #[test]
    fn multi_jump_allows_air_jumps_up_to_max() {
        let (mut world, body) = body_world();
        let physics = SimplePhysics::default();
        let ctl = JumpController::from_config(&MovementConfig {
            jump_policy: JumpPolicy::MultiWithCooldown,
            ..MovementConfig::default()
        });
        let press = jump(true, true, false);
        let mut state = grounded_for(0.0);

        let first = ctl.handle_input(&mut state, &mut world, &physics, body, &press, &at(1.0));
        assert_eq!(first, Some(JumpEvent::Jumped));
        assert_eq!(state.jump_count, 1);

        // Within the cooldown: ignored.
        assert_eq!(
            ctl.handle_input(&mut state, &mut world, &physics, body, &press, &at(1.1)),
            None
        );
        assert_eq!(
            ctl.handle_input(&mut state, &mut world, &physics, body, &press, &at(1.3)),
            Some(JumpEvent::Jumped)
        );
        assert_eq!(state.jump_count, 2);

        // Out of jumps until ground contact.
        assert_eq!(
            ctl.handle_input(&mut state, &mut world, &physics, body, &press, &at(2.0)),
            None
        );
        assert_eq!(state.jump_count, 2);

        state.is_grounded = true;
        let idle = InputFrame::default();
        assert_eq!(
            ctl.handle_input(&mut state, &mut world, &physics, body, &idle, &at(2.1)),
            Some(JumpEvent::Landed)
        );
        assert_eq!(state.jump_count, 0);
        assert!(!state.is_jumping);
    }

    #[test]
    fn multi_jump_ignores_held_button() {
        let (mut world, body) = body_world();
        let physics = SimplePhysics::default();
        let ctl = JumpController::from_config(&MovementConfig {
            jump_policy: JumpPolicy::MultiWithCooldown,
            ..MovementConfig::default()
        });
        let held = jump(false, true, false);
        let mut state = grounded_for(1.0);

        assert_eq!(
            ctl.handle_input(&mut state, &mut world, &physics, body, &held, &at(5.0)),
            None
        );
        assert_eq!(state.jump_count, 0);
    }

    #[test]
    fn falling_is_clamped_and_accelerated() {
        let (mut world, body) = body_world();
        let physics = SimplePhysics::default();
        let ctl = JumpController::from_config(&MovementConfig::default());
        physics.set_velocity(&mut world, body, Vec3::new(0.0, -25.0, 0.0));

        ctl.apply_extra_gravity(&mut world, &physics, body, &InputFrame::default());

        assert_eq!(physics.velocity(&world, body).y, -10.0);
        let rb = world.get::<RigidBody>(body).unwrap();
        assert!((rb.pending_acceleration.y + 2.5 * 9.81).abs() < 1e-4);
    }

    #[test]
    fn low_jump_gravity_only_when_released() {
        let (mut world, body) = body_world();
        let physics = SimplePhysics::default();
        let ctl = JumpController::from_config(&MovementConfig::default());
        physics.set_velocity(&mut world, body, Vec3::new(0.0, 3.0, 0.0));

        ctl.apply_extra_gravity(&mut world, &physics, body, &jump(false, true, false));
        assert_eq!(world.get::<RigidBody>(body).unwrap().pending_acceleration, Vec3::ZERO);

        ctl.apply_extra_gravity(&mut world, &physics, body, &InputFrame::default());
        let acc = world.get::<RigidBody>(body).unwrap().pending_acceleration;
        assert!((acc.y + 2.0 * 9.81).abs() < 1e-4);
    }
}
