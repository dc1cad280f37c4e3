//! `platformer_shared`
//!
//! The host surface the gameplay controllers run against.
//!
//! Design goals:
//! - Deterministic and headless; every collaborator can be driven from tests.
//! - Clear separation of concerns (math, ecs, physics, input, time, animation).
//! - Traits for abstraction and dependency injection.
//! - No `unsafe`.

pub mod anim;
pub mod config;
pub mod ecs;
pub mod input;
pub mod math;
pub mod physics;
pub mod time;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::anim::*;
    pub use crate::config::*;
    pub use crate::ecs::*;
    pub use crate::input::*;
    pub use crate::math::*;
    pub use crate::physics::*;
    pub use crate::time::*;
}
