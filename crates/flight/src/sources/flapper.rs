use std::f32::consts::TAU;

use skylark_shared::KeypointFrame;

use crate::sources::presets::PosePreset;
use crate::sources::MotionSource;

/// Steady wingbeats at a fixed cadence, torso upright.
pub struct FlapperSource {
    period_cycles: u32,
    amplitude: f32,
}

impl FlapperSource {
    pub fn new() -> Self {
        Self::with_beat(8, 0.06)
    }

    /// `period_cycles` is one full up-down stroke; `amplitude` is the wrist
    /// travel in image units.
    pub fn with_beat(period_cycles: u32, amplitude: f32) -> Self {
        Self {
            period_cycles: period_cycles.max(2),
            amplitude,
        }
    }

    fn preset(&self, cycle: u32) -> PosePreset {
        let phase = TAU * (cycle % self.period_cycles) as f32 / self.period_cycles as f32;
        PosePreset {
            arm_spread: 0.7,
            arm_sag: 0.06,
            wrist_drop: self.amplitude * phase.sin(),
            lean: 0.0,
            yaw: 0.0,
        }
    }
}

impl Default for FlapperSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionSource for FlapperSource {
    fn name(&self) -> &str {
        "flapper"
    }

    fn next_frame(&mut self, cycle: u32) -> Option<KeypointFrame> {
        Some(self.preset(cycle).frame())
    }
}
