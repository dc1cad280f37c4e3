//! Animation state sink.
//!
//! Controllers only push named boolean parameters; they never read them back.

use std::collections::HashMap;

pub const IS_GROUNDED: &str = "isGrounded";
pub const IS_JUMPING: &str = "isJumping";
pub const IS_WALKING: &str = "isWalking";

/// Receives animation parameters from gameplay code.
pub trait AnimationSink: Send + Sync {
    fn set_bool(&mut self, name: &str, value: bool);
}

/// Recording sink holding the last value written for each parameter.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    params: HashMap<String, bool>,
}

impl Animator {
    /// Last value written, or `None` if never set.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.params.get(name).copied()
    }

    /// Last value written, treating unset parameters as false.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).unwrap_or(false)
    }
}

impl AnimationSink for Animator {
    fn set_bool(&mut self, name: &str, value: bool) {
        match self.params.get_mut(name) {
            Some(v) => *v = value,
            None => {
                self.params.insert(name.to_string(), value);
            }
        }
    }
}
