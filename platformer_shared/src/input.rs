//! Input handling.
//!
//! In a real game this would integrate with windowing, gamepads and action
//! bindings. Here the host samples a raw [`InputState`] once per frame and an
//! [`InputTracker`] derives the per-frame press/release edges from it.

use serde::{Deserialize, Serialize};

/// Analog movement axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Digital buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Jump,
}

/// Read-only view of input for a single frame.
pub trait InputSource {
    /// Axis value in `[-1, 1]`.
    fn axis(&self, axis: Axis) -> f32;
    /// True only on the frame the button went down.
    fn button_down(&self, button: Button) -> bool;
    /// True only on the frame the button went up.
    fn button_up(&self, button: Button) -> bool;
    /// True while the button is held.
    fn button(&self, button: Button) -> bool;
}

/// Raw user input sampled at a moment in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    pub horizontal: f32,
    pub vertical: f32,
    pub jump: bool,
}

impl InputState {
    pub fn new(horizontal: f32, vertical: f32, jump: bool) -> Self {
        Self {
            horizontal,
            vertical,
            jump,
        }
    }
}

/// Held/pressed/released state of one button for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub held: bool,
    pub pressed: bool,
    pub released: bool,
}

/// Input for one frame with edges resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    pub horizontal: f32,
    pub vertical: f32,
    pub jump: ButtonState,
}

impl InputSource for InputFrame {
    fn axis(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }

    fn button_down(&self, button: Button) -> bool {
        match button {
            Button::Jump => self.jump.pressed,
        }
    }

    fn button_up(&self, button: Button) -> bool {
        match button {
            Button::Jump => self.jump.released,
        }
    }

    fn button(&self, button: Button) -> bool {
        match button {
            Button::Jump => self.jump.held,
        }
    }
}

/// Turns successive raw samples into frames with press/release edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputTracker {
    jump_was_held: bool,
}

impl InputTracker {
    pub fn sample(&mut self, raw: InputState) -> InputFrame {
        let held = raw.jump;
        let frame = InputFrame {
            horizontal: raw.horizontal.clamp(-1.0, 1.0),
            vertical: raw.vertical.clamp(-1.0, 1.0),
            jump: ButtonState {
                held,
                pressed: held && !self.jump_was_held,
                released: !held && self.jump_was_held,
            },
        };
        self.jump_was_held = held;
        frame
    }
}
