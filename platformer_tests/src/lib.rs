//! Shared fixtures for the scenario and property suites.

use platformer_shared::{
    config::{
        CameraConfig, CameraFollowConfig, ColliderConfig, JumpPolicy, MovementConfig,
        PlayerConfig, SceneConfig,
    },
    ecs::EntityId,
    input::InputState,
    math::Vec3,
    physics::{LayerMask, PhysicsConfig},
};
use platformer_sim::{jump::JumpEvent, locomotion::LocomotionState, Simulation};

pub const PLAYER: &str = "hero";
pub const CAMERA: &str = "cam";
/// Frame step matching the 50 Hz fixed step: one fixed step per frame.
pub const DT: f32 = 0.02;
/// Half-height of the test character.
pub const HALF_HEIGHT: f32 = 0.9;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

pub fn movement(policy: JumpPolicy) -> MovementConfig {
    MovementConfig {
        jump_policy: policy,
        ground_check_offset: Some(Vec3::new(0.0, -HALF_HEIGHT, 0.0)),
        ..MovementConfig::default()
    }
}

/// Flat floor with one player at `start` and a camera following it.
pub fn scene(movement: MovementConfig, start: Vec3) -> SceneConfig {
    SceneConfig {
        frame_hz: 50,
        fixed_hz: 50,
        physics: PhysicsConfig::default(),
        ground: vec![ColliderConfig {
            name: Some("floor".to_string()),
            position: Vec3::new(0.0, -0.5, 0.0),
            half_extents: Vec3::new(100.0, 0.5, 100.0),
            layer: LayerMask::GROUND,
        }],
        players: vec![PlayerConfig {
            name: PLAYER.to_string(),
            position: start,
            half_extents: Vec3::new(0.4, HALF_HEIGHT, 0.4),
            mass: 1.0,
            animator: true,
            movement,
        }],
        cameras: vec![CameraConfig {
            name: CAMERA.to_string(),
            position: Vec3::new(0.0, 4.0, -8.0),
            follow: CameraFollowConfig {
                target: Some(PLAYER.to_string()),
                offset: Vec3::new(0.0, 4.0, -8.0),
                transition_speed: 2.0,
            },
        }],
        rotators: Vec::new(),
    }
}

/// Player standing on the floor.
pub fn standing(policy: JumpPolicy) -> SceneConfig {
    scene(movement(policy), Vec3::new(0.0, HALF_HEIGHT, 0.0))
}

pub fn jump_held() -> InputState {
    InputState::new(0.0, 0.0, true)
}

/// A simulation plus the handles the tests poke at.
pub struct Harness {
    pub sim: Simulation,
    pub player: EntityId,
    pub camera: EntityId,
}

impl Harness {
    pub fn new(cfg: &SceneConfig) -> anyhow::Result<Self> {
        init_tracing();
        let sim = Simulation::from_config(cfg)?;
        let player = sim
            .entity_by_name(PLAYER)
            .ok_or_else(|| anyhow::anyhow!("player not spawned"))?;
        let camera = sim
            .entity_by_name(CAMERA)
            .ok_or_else(|| anyhow::anyhow!("camera not spawned"))?;
        Ok(Self {
            sim,
            player,
            camera,
        })
    }

    /// Runs one frame and returns the player's jump event, if any.
    pub fn step(&mut self, input: InputState) -> Option<JumpEvent> {
        self.sim.frame(input, DT);
        self.sim.jump_event(self.player)
    }

    pub fn idle(&mut self, frames: usize) {
        for _ in 0..frames {
            self.step(InputState::default());
        }
    }

    pub fn position(&self) -> Vec3 {
        self.sim.position(self.player).unwrap_or(Vec3::ZERO)
    }

    pub fn velocity(&self) -> Vec3 {
        self.sim.physics().velocity(self.sim.world(), self.player)
    }

    pub fn state(&self) -> LocomotionState {
        self.sim
            .locomotion(self.player)
            .map(|l| *l.state())
            .unwrap_or_default()
    }
}
