use std::f32::consts::TAU;

use skylark_shared::KeypointFrame;

use crate::sources::presets::PosePreset;
use crate::sources::MotionSource;

/// Wingbeats while leaning back, reading as a climb.
pub struct ClimberSource {
    period_cycles: u32,
    amplitude: f32,
}

impl ClimberSource {
    pub fn new() -> Self {
        Self {
            period_cycles: 8,
            amplitude: 0.06,
        }
    }
}

impl Default for ClimberSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionSource for ClimberSource {
    fn name(&self) -> &str {
        "climber"
    }

    fn next_frame(&mut self, cycle: u32) -> Option<KeypointFrame> {
        let phase = TAU * (cycle % self.period_cycles) as f32 / self.period_cycles as f32;
        let preset = PosePreset {
            arm_spread: 0.7,
            arm_sag: 0.06,
            wrist_drop: self.amplitude * phase.sin(),
            lean: -0.3,
            yaw: 0.0,
        };
        Some(preset.frame())
    }
}
