use std::f32::consts::TAU;

use skylark_shared::KeypointFrame;

use crate::sources::presets::PosePreset;
use crate::sources::MotionSource;

/// Glides in a T-pose while swinging the torso left and right.
pub struct WeaverSource {
    period_cycles: u32,
    amplitude: f32,
}

impl WeaverSource {
    pub fn new() -> Self {
        Self::with_weave(40, 0.35)
    }

    /// `period_cycles` is one full left-right sweep; `amplitude` is the peak
    /// yaw in shoulder widths.
    pub fn with_weave(period_cycles: u32, amplitude: f32) -> Self {
        Self {
            period_cycles: period_cycles.max(2),
            amplitude,
        }
    }
}

impl Default for WeaverSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionSource for WeaverSource {
    fn name(&self) -> &str {
        "weaver"
    }

    fn next_frame(&mut self, cycle: u32) -> Option<KeypointFrame> {
        let phase = TAU * (cycle % self.period_cycles) as f32 / self.period_cycles as f32;
        let preset = PosePreset {
            arm_spread: 1.0,
            arm_sag: 0.0,
            wrist_drop: 0.0,
            lean: 0.0,
            yaw: self.amplitude * phase.sin(),
        };
        Some(preset.frame())
    }
}
