/// Animation loop state. Leaves `Idle` on the first frame and never returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Simulation clock driven by the host's refresh-callback timestamps.
///
/// Time is reported in the host's units (milliseconds for
/// `requestAnimationFrame`). No fixed step and no catch-up: every host frame
/// is exactly one tick.
#[derive(Debug, Clone)]
pub struct SimClock {
    state: LoopState,
    /// Elapsed simulated time (host units).
    elapsed: f64,
    /// Ticks since the loop started.
    frames: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Record a new host timestamp. Timestamps that step backwards (or are
    /// not finite) leave the clock where it is, so elapsed time never decreases.
    pub fn advance_to(&mut self, timestamp: f64) {
        self.state = LoopState::Running;
        self.frames += 1;
        if timestamp.is_finite() && timestamp > self.elapsed {
            self.elapsed = timestamp;
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn state(&self) -> LoopState {
        self.state
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}
