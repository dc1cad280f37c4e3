//! `platformer_sim`
//!
//! Gameplay controllers for a small 3D platformer and the frame scheduler
//! that drives them:
//! - Ground sensing with a rising-jump override
//! - Jump rules (single jump with release gate, or multi jump with cooldown)
//!   and fall / low-jump gravity shaping
//! - Planar locomotion with animation flags
//! - Smoothed camera follow (late phase)
//! - Oscillating scenery rotation
//!
//! Controllers never call each other. Each one is constructed with the handle
//! of the entity it drives plus its config, and is ticked by [`Simulation`].

pub mod camera;
pub mod grounding;
pub mod jump;
pub mod locomotion;
pub mod rotator;
pub mod sim;

pub use sim::Simulation;
