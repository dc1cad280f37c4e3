//! Back-and-forth rotation for scenery.

use platformer_shared::{
    config::RotatorConfig,
    ecs::{EntityId, Transform, World},
    math::Quat,
};
use tracing::trace;

/// Accumulated swing state. Angles are in degrees.
///
/// `direction` toggles on the tick the total crosses a bound, never while it
/// merely sits past one, so a long frame followed by short ones cannot pin the
/// swing at a bound. The two bound checks are independent (no `else`); with
/// inverted bounds (`lower_bound > upper_bound`) they are not reconciled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatorState {
    pub total_rotation: f32,
    /// `1.0` or `-1.0`.
    pub direction: f32,
    pub lower_bound: f32,
    pub upper_bound: f32,
    pub angular_speed: f32,
}

impl RotatorState {
    pub fn from_config(cfg: &RotatorConfig) -> Self {
        Self {
            total_rotation: 0.0,
            direction: if cfg.initial_direction < 0.0 { -1.0 } else { 1.0 },
            lower_bound: cfg.lower_bound,
            upper_bound: cfg.upper_bound,
            angular_speed: cfg.angular_speed,
        }
    }

    /// Advances by `dt` seconds and returns the rotation applied this tick.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let prev = self.total_rotation;
        let delta = self.direction * self.angular_speed * dt;
        self.total_rotation += delta;

        if prev <= self.upper_bound && self.total_rotation > self.upper_bound {
            self.direction = -self.direction;
        }
        if prev >= self.lower_bound && self.total_rotation < self.lower_bound {
            self.direction = -self.direction;
        }
        delta
    }
}

/// Rotates one entity about its local z-axis.
#[derive(Debug, Clone, PartialEq)]
pub struct OscillatingRotator {
    entity: EntityId,
    state: RotatorState,
}

impl OscillatingRotator {
    pub fn new(entity: EntityId, cfg: &RotatorConfig) -> Self {
        Self {
            entity,
            state: RotatorState::from_config(cfg),
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn state(&self) -> &RotatorState {
        &self.state
    }

    pub fn update(&mut self, world: &mut World, dt: f32) {
        let delta = self.state.advance(dt);
        if let Some(transform) = world.get_mut::<Transform>(self.entity) {
            transform.rotate_local(Quat::from_rotation_z(delta.to_radians()));
            trace!(
                entity = ?self.entity,
                total = self.state.total_rotation,
                z = transform.rotation.z,
                "Rotator tick"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> RotatorConfig {
        RotatorConfig {
            lower_bound: -10.0,
            upper_bound: 10.0,
            angular_speed: 100.0,
            initial_direction: 1.0,
        }
    }

    #[test]
    fn flips_after_crossing_upper_bound() {
        let mut state = RotatorState::from_config(&cfg());
        // 0.1 s per tick = 10 degrees per tick.
        assert_eq!(state.advance(0.1), 10.0);
        assert_eq!(state.direction, 1.0, "exactly at the bound does not flip");
        state.advance(0.1);
        assert_eq!(state.total_rotation, 20.0);
        assert_eq!(state.direction, -1.0);
        assert_eq!(state.advance(0.1), -10.0);
    }

    #[test]
    fn flips_after_crossing_lower_bound() {
        let mut state = RotatorState::from_config(&RotatorConfig {
            initial_direction: -1.0,
            ..cfg()
        });
        state.advance(0.1);
        assert_eq!(state.direction, -1.0);
        state.advance(0.1);
        assert_eq!(state.direction, 1.0);
    }

    #[test]
    fn long_frame_overshoot_then_short_frames_turn_back() {
        let mut state = RotatorState::from_config(&cfg());
        state.advance(0.105);
        assert!((state.total_rotation - 10.5).abs() < 1e-4);
        assert_eq!(state.direction, -1.0);

        // 0.3 degrees per tick, each shorter than the overshoot.
        for _ in 0..20 {
            state.advance(0.003);
            assert_eq!(state.direction, -1.0);
        }
        assert!((state.total_rotation - 4.5).abs() < 1e-3);

        for _ in 0..1000 {
            state.advance(0.003);
        }
        assert!(state.total_rotation < 10.5);
        assert!(state.total_rotation > -10.5);
    }

    #[test]
    fn starting_past_a_bound_does_not_flip_until_a_crossing() {
        let mut state = RotatorState::from_config(&cfg());
        state.total_rotation = 30.0;
        state.direction = -1.0;
        for _ in 0..5 {
            state.advance(0.01);
            assert_eq!(state.direction, -1.0);
        }
        assert!((state.total_rotation - 25.0).abs() < 1e-4);
    }

    #[test]
    fn inverted_bounds_are_left_alone() {
        // Lower above upper: the start is already past the upper bound and
        // upward travel never crosses the lower one.
        let mut state = RotatorState::from_config(&RotatorConfig {
            lower_bound: 50.0,
            upper_bound: -50.0,
            ..cfg()
        });
        for _ in 0..5 {
            state.advance(0.1);
            assert_eq!(state.direction, 1.0);
        }
        assert_eq!(state.total_rotation, 50.0);
    }

    #[test]
    fn transform_tracks_accumulated_angle() {
        let mut world = World::default();
        let e = world.spawn();
        world.insert(e, Transform::default());
        let mut rotator = OscillatingRotator::new(e, &cfg());

        for _ in 0..7 {
            rotator.update(&mut world, 0.016);
        }

        let z = world.get::<Transform>(e).unwrap().rotation.z_angle().to_degrees();
        assert!((z - rotator.state().total_rotation).abs() < 1e-3);
    }

    #[test]
    fn missing_entity_still_advances() {
        let mut world = World::default();
        let e = world.spawn();
        let mut rotator = OscillatingRotator::new(e, &cfg());
        world.despawn(e);
        rotator.update(&mut world, 0.05);
        assert_eq!(rotator.state().total_rotation, 5.0);
    }
}
