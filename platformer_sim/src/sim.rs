//! Frame scheduler.
//!
//! Owns the world, the physics backend and every controller, and runs them in
//! a fixed order each frame:
//! 1. Fixed phase: zero or more fixed steps from the time accumulator
//!    (locomotion movement, then `physics.step`).
//! 2. Update phase: locomotion jump/ground logic, rotators.
//! 3. Late phase: cameras, after all movement for the frame is final.
//!
//! Determinism notes:
//! - Entities are spawned in config order; controllers run in spawn order.
//! - Nothing here reads the wall clock; `frame` takes the frame delta.

use std::collections::HashMap;

use anyhow::{bail, ensure};
use platformer_shared::{
    anim::{AnimationSink, Animator},
    config::SceneConfig,
    ecs::{Collider, EntityId, Name, RigidBody, Transform, World},
    input::{InputFrame, InputState, InputTracker},
    math::Vec3,
    physics::{LayerMask, PhysicsBackend, SimplePhysics},
    time::FrameTime,
};
use tracing::{debug, info, warn};

use crate::{
    camera::CameraFollower,
    jump::JumpEvent,
    locomotion::LocomotionController,
    rotator::OscillatingRotator,
};

/// Upper bound on fixed steps per frame, so a long stall cannot spiral.
pub const MAX_FIXED_STEPS_PER_FRAME: u32 = 8;

struct PlayerSlot {
    controller: LocomotionController,
    animator: Option<Animator>,
}

/// Headless simulation of one scene.
pub struct Simulation {
    world: World,
    physics: Box<dyn PhysicsBackend>,
    time: FrameTime,
    input: InputTracker,
    last_input: InputFrame,
    accumulator: f32,

    players: Vec<PlayerSlot>,
    rotators: Vec<OscillatingRotator>,
    cameras: Vec<CameraFollower>,

    /// Jump events from the last frame, by body.
    events: HashMap<EntityId, JumpEvent>,
}

impl Simulation {
    /// Builds a simulation with the reference physics backend.
    pub fn from_config(cfg: &SceneConfig) -> anyhow::Result<Self> {
        Self::with_backend(cfg, Box::new(SimplePhysics::new(cfg.physics)))
    }

    /// Builds a simulation with a caller-supplied physics backend.
    pub fn with_backend(
        cfg: &SceneConfig,
        physics: Box<dyn PhysicsBackend>,
    ) -> anyhow::Result<Self> {
        ensure!(cfg.fixed_hz > 0, "fixed_hz must be positive");
        ensure!(cfg.frame_hz > 0, "frame_hz must be positive");

        let mut sim = Self {
            world: World::default(),
            physics,
            time: FrameTime::new(cfg.fixed_delta()),
            input: InputTracker::default(),
            last_input: InputFrame::default(),
            accumulator: 0.0,
            players: Vec::new(),
            rotators: Vec::new(),
            cameras: Vec::new(),
            events: HashMap::new(),
        };
        sim.spawn_scene(cfg)?;

        info!(
            players = sim.players.len(),
            cameras = sim.cameras.len(),
            rotators = sim.rotators.len(),
            fixed_hz = cfg.fixed_hz,
            "Scene loaded"
        );
        Ok(sim)
    }

    fn spawn_named(&mut self, name: &str, transform: Transform) -> anyhow::Result<EntityId> {
        if self.world.find_by_name(name).is_some() {
            bail!("duplicate entity name: {name}");
        }
        let id = self.world.spawn();
        self.world.insert(id, Name(name.to_string()));
        self.world.insert(id, transform);
        Ok(id)
    }

    fn spawn_scene(&mut self, cfg: &SceneConfig) -> anyhow::Result<()> {
        for collider in &cfg.ground {
            let id = match &collider.name {
                Some(name) => self.spawn_named(name, Transform::from_position(collider.position))?,
                None => {
                    let id = self.world.spawn();
                    self.world
                        .insert(id, Transform::from_position(collider.position));
                    id
                }
            };
            self.world.insert(
                id,
                Collider {
                    half_extents: collider.half_extents,
                    layer: collider.layer,
                },
            );
            debug!(id = ?id, layer = ?collider.layer, "Spawned collider");
        }

        for player in &cfg.players {
            let id = self.spawn_named(&player.name, Transform::from_position(player.position))?;
            let mut body = RigidBody::new(player.half_extents, LayerMask::PLAYER);
            body.mass = player.mass;
            self.world.insert(id, body);
            self.players.push(PlayerSlot {
                controller: LocomotionController::new(id, player.movement),
                animator: player.animator.then(Animator::default),
            });
            debug!(id = ?id, name = %player.name, policy = ?player.movement.jump_policy, "Spawned player");
        }

        for rotator in &cfg.rotators {
            let id = self.spawn_named(&rotator.name, Transform::from_position(rotator.position))?;
            self.rotators.push(OscillatingRotator::new(id, &rotator.rotator));
            debug!(id = ?id, name = %rotator.name, "Spawned rotator");
        }

        // Cameras last so their targets already exist.
        for camera in &cfg.cameras {
            let id = self.spawn_named(&camera.name, Transform::from_position(camera.position))?;
            let target = match &camera.follow.target {
                Some(name) => {
                    let found = self.world.find_by_name(name);
                    if found.is_none() {
                        warn!(
                            camera = %camera.name,
                            target = %name,
                            "Camera target not found, camera will stay put"
                        );
                    }
                    found
                }
                None => None,
            };
            self.cameras
                .push(CameraFollower::new(id, target, &camera.follow));
            debug!(id = ?id, name = %camera.name, target = ?target, "Spawned camera");
        }
        Ok(())
    }

    /// Advances the simulation by one frame of `dt` seconds.
    pub fn frame(&mut self, raw: InputState, dt: f32) {
        self.time.advance(dt);
        let input = self.input.sample(raw);
        self.last_input = input;
        self.events.clear();

        // Fixed phase.
        let fixed = self.time.fixed_delta;
        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= fixed {
            if steps == MAX_FIXED_STEPS_PER_FRAME {
                warn!(
                    frame = self.time.frame,
                    dropped = self.accumulator,
                    "Fixed step budget exceeded, dropping time"
                );
                self.accumulator = 0.0;
                break;
            }
            for slot in &mut self.players {
                slot.controller.fixed_update(
                    &mut self.world,
                    self.physics.as_ref(),
                    &input,
                    &self.time,
                    slot.animator.as_mut().map(|a| a as &mut dyn AnimationSink),
                );
            }
            self.physics.step(&mut self.world, fixed);
            self.accumulator -= fixed;
            steps += 1;
        }

        // Update phase.
        for slot in &mut self.players {
            let event = slot.controller.update(
                &mut self.world,
                self.physics.as_ref(),
                &input,
                &self.time,
                slot.animator.as_mut().map(|a| a as &mut dyn AnimationSink),
            );
            if let Some(event) = event {
                self.events.insert(slot.controller.body(), event);
            }
        }
        for rotator in &mut self.rotators {
            rotator.update(&mut self.world, dt);
        }

        // Late phase.
        for camera in &self.cameras {
            camera.late_update(&mut self.world, dt);
        }
    }

    /// Runs `frames` frames of `dt`, asking `input` for each frame's sample.
    pub fn run_for_frames(
        &mut self,
        frames: u64,
        dt: f32,
        mut input: impl FnMut(u64) -> InputState,
    ) {
        for i in 0..frames {
            let raw = input(i);
            self.frame(raw, dt);
        }
    }

    /// Removes an entity and any controller driving it.
    ///
    /// Cameras that tracked it keep their handle and simply stop moving.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        self.players.retain(|p| p.controller.body() != entity);
        self.rotators.retain(|r| r.entity() != entity);
        self.cameras.retain(|c| c.camera() != entity);
        self.events.remove(&entity);
        self.world.despawn(entity)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn physics(&self) -> &dyn PhysicsBackend {
        self.physics.as_ref()
    }

    pub fn time(&self) -> &FrameTime {
        &self.time
    }

    /// Input frame (with edges) used by the last `frame` call.
    pub fn last_input(&self) -> &InputFrame {
        &self.last_input
    }

    pub fn entity_by_name(&self, name: &str) -> Option<EntityId> {
        self.world.find_by_name(name)
    }

    pub fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.world.get::<Transform>(entity).map(|t| t.position)
    }

    pub fn locomotion(&self, body: EntityId) -> Option<&LocomotionController> {
        self.players
            .iter()
            .map(|p| &p.controller)
            .find(|c| c.body() == body)
    }

    pub fn animator(&self, body: EntityId) -> Option<&Animator> {
        self.players
            .iter()
            .find(|p| p.controller.body() == body)
            .and_then(|p| p.animator.as_ref())
    }

    /// Jump event produced for `body` during the last frame, if any.
    pub fn jump_event(&self, body: EntityId) -> Option<JumpEvent> {
        self.events.get(&body).copied()
    }

    pub fn camera(&self, camera: EntityId) -> Option<&CameraFollower> {
        self.cameras.iter().find(|c| c.camera() == camera)
    }

    pub fn camera_mut(&mut self, camera: EntityId) -> Option<&mut CameraFollower> {
        self.cameras.iter_mut().find(|c| c.camera() == camera)
    }

    pub fn rotator(&self, entity: EntityId) -> Option<&OscillatingRotator> {
        self.rotators.iter().find(|r| r.entity() == entity)
    }
}
