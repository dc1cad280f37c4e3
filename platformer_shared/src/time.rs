//! Frame timing handed to controllers by the host loop.

/// Timing for the current frame.
///
/// `delta` is the variable frame step used by update-phase logic,
/// `fixed_delta` the physics step used by fixed-phase logic, and `elapsed`
/// the total time since start (used for real-time cooldowns).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    pub delta: f32,
    pub fixed_delta: f32,
    pub elapsed: f32,
    pub frame: u64,
}

impl FrameTime {
    pub fn new(fixed_delta: f32) -> Self {
        Self {
            delta: 0.0,
            fixed_delta,
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Starts the next frame lasting `delta` seconds.
    pub fn advance(&mut self, delta: f32) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame += 1;
    }
}
