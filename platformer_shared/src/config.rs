//! Configuration system.
//!
//! Loads per-entity tuning and scene layout from JSON strings (file IO left
//! to app). Every field has a default so partial documents are accepted.

use serde::{Deserialize, Serialize};

use crate::{
    math::Vec3,
    physics::{LayerMask, PhysicsConfig},
};

/// Which jump rules a locomotion controller runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpPolicy {
    /// One jump from the ground; the button must be released before the next.
    #[default]
    SingleWithRelease,
    /// Up to `max_jumps` presses before touching ground again, with a cooldown.
    MultiWithCooldown,
}

/// Movement tuning for one character. Read-only at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub move_speed: f32,
    pub jump_force: f32,
    pub fall_multiplier: f32,
    pub low_jump_multiplier: f32,
    pub max_fall_speed: f32,

    /// Collider layers that count as ground.
    pub ground_layers: LayerMask,
    /// Ground probe position relative to the body. `None` probes at the body origin.
    pub ground_check_offset: Option<Vec3>,
    pub ground_check_radius: f32,
    /// Time grounded before a jump is allowed.
    pub ground_delay: f32,
    /// Time grounded before a jump counts as landed.
    pub landing_delay: f32,

    pub jump_policy: JumpPolicy,
    /// Minimum seconds between jumps (multi-jump only).
    pub jump_cooldown: f32,
    pub max_jumps: u32,

    /// Upward speed above which an active jump ignores ground contact.
    pub rising_velocity_threshold: f32,
    /// Vertical speed below which a grounded jump may land.
    pub landing_velocity_threshold: f32,
    /// Minimum input magnitude that moves the character.
    pub move_deadzone: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_force: 5.0,
            fall_multiplier: 2.5,
            low_jump_multiplier: 2.0,
            max_fall_speed: 10.0,
            ground_layers: LayerMask::GROUND,
            ground_check_offset: None,
            ground_check_radius: 0.2,
            ground_delay: 0.05,
            landing_delay: 0.05,
            jump_policy: JumpPolicy::SingleWithRelease,
            jump_cooldown: 0.2,
            max_jumps: 2,
            rising_velocity_threshold: 0.1,
            landing_velocity_threshold: 0.1,
            move_deadzone: 0.1,
        }
    }
}

/// Camera follow settings. `target` names the tracked entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraFollowConfig {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub offset: Vec3,
    #[serde(default = "default_transition_speed")]
    pub transition_speed: f32,
}

fn default_transition_speed() -> f32 {
    2.0
}

impl Default for CameraFollowConfig {
    fn default() -> Self {
        Self {
            target: None,
            offset: Vec3::ZERO,
            transition_speed: default_transition_speed(),
        }
    }
}

/// Back-and-forth rotation about z. Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotatorConfig {
    pub lower_bound: f32,
    pub upper_bound: f32,
    /// Degrees per second.
    pub angular_speed: f32,
    /// Starting direction, `1.0` or `-1.0`.
    #[serde(default = "default_initial_direction")]
    pub initial_direction: f32,
}

fn default_initial_direction() -> f32 {
    1.0
}

impl Default for RotatorConfig {
    fn default() -> Self {
        Self {
            lower_bound: -45.0,
            upper_bound: 45.0,
            angular_speed: 30.0,
            initial_direction: default_initial_direction(),
        }
    }
}

/// Static box collider in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColliderConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub position: Vec3,
    pub half_extents: Vec3,
    #[serde(default = "default_ground_layer")]
    pub layer: LayerMask,
}

fn default_ground_layer() -> LayerMask {
    LayerMask::GROUND
}

/// Player-controlled character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub position: Vec3,
    #[serde(default = "default_player_half_extents")]
    pub half_extents: Vec3,
    #[serde(default = "default_mass")]
    pub mass: f32,
    /// Whether the character drives an animator.
    #[serde(default = "default_true")]
    pub animator: bool,
    #[serde(default)]
    pub movement: MovementConfig,
}

fn default_player_half_extents() -> Vec3 {
    Vec3::new(0.4, 0.9, 0.4)
}

fn default_mass() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Camera entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub name: String,
    pub position: Vec3,
    #[serde(default)]
    pub follow: CameraFollowConfig,
}

/// Scenery entity with an oscillating rotator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotatorEntityConfig {
    pub name: String,
    pub position: Vec3,
    #[serde(default)]
    pub rotator: RotatorConfig,
}

/// Root scene description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Frame (update phase) rate used by the host loop.
    #[serde(default = "default_frame_hz")]
    pub frame_hz: u32,
    /// Fixed physics rate.
    #[serde(default = "default_fixed_hz")]
    pub fixed_hz: u32,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub ground: Vec<ColliderConfig>,
    #[serde(default)]
    pub players: Vec<PlayerConfig>,
    #[serde(default)]
    pub cameras: Vec<CameraConfig>,
    #[serde(default)]
    pub rotators: Vec<RotatorEntityConfig>,
}

fn default_frame_hz() -> u32 {
    60
}

fn default_fixed_hz() -> u32 {
    50
}

impl Default for SceneConfig {
    /// A flat slab with one player, a follow camera and a rocking platform.
    fn default() -> Self {
        let player_half = default_player_half_extents();
        Self {
            frame_hz: default_frame_hz(),
            fixed_hz: default_fixed_hz(),
            physics: PhysicsConfig::default(),
            ground: vec![ColliderConfig {
                name: Some("floor".to_string()),
                position: Vec3::new(0.0, -0.5, 0.0),
                half_extents: Vec3::new(50.0, 0.5, 50.0),
                layer: LayerMask::GROUND,
            }],
            players: vec![PlayerConfig {
                name: "player".to_string(),
                position: Vec3::new(0.0, player_half.y, 0.0),
                half_extents: player_half,
                mass: default_mass(),
                animator: true,
                movement: MovementConfig {
                    ground_check_offset: Some(Vec3::new(0.0, -player_half.y, 0.0)),
                    ..MovementConfig::default()
                },
            }],
            cameras: vec![CameraConfig {
                name: "main_camera".to_string(),
                position: Vec3::new(0.0, 4.0, -8.0),
                follow: CameraFollowConfig {
                    target: Some("player".to_string()),
                    offset: Vec3::new(0.0, 4.0, -8.0),
                    transition_speed: default_transition_speed(),
                },
            }],
            rotators: vec![RotatorEntityConfig {
                name: "rocking_platform".to_string(),
                position: Vec3::new(6.0, 2.0, 0.0),
                rotator: RotatorConfig::default(),
            }],
        }
    }
}

impl SceneConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Fixed physics step in seconds.
    pub fn fixed_delta(&self) -> f32 {
        1.0 / self.fixed_hz.max(1) as f32
    }

    /// Frame step in seconds.
    pub fn frame_delta(&self) -> f32 {
        1.0 / self.frame_hz.max(1) as f32
    }
}
