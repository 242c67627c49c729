//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tuning knobs for playback stepping.
///
/// Owned by the session that owns the stepper; defaults match the shipped
/// game settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnimConfig {
    /// Global multiplier applied to every delta seek.
    pub global_speed: f32,
    /// Parallel seeking only engages at or above this many live instances;
    /// below it the fan-out overhead costs more than it saves.
    pub parallel_min_instances: usize,
    /// Worker thread cap for parallel seeking. `0` means use every core;
    /// `1` disables parallelism entirely.
    pub max_workers: usize,
    /// Upper bound on events dispatched per step; overflow is dropped with
    /// a warning rather than stalling the frame.
    pub max_events_per_step: usize,
}

impl Default for AnimConfig {
    fn default() -> Self {
        Self {
            global_speed: 1.0,
            parallel_min_instances: 10,
            max_workers: 0,
            max_events_per_step: 1024,
        }
    }
}
