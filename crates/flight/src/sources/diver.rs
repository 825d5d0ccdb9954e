use skylark_shared::KeypointFrame;

use crate::sources::presets::PosePreset;
use crate::sources::MotionSource;

/// Arms swept back, torso pitched hard toward the camera.
pub struct DiverSource;

impl MotionSource for DiverSource {
    fn name(&self) -> &str {
        "diver"
    }

    fn next_frame(&mut self, _cycle: u32) -> Option<KeypointFrame> {
        let preset = PosePreset {
            arm_spread: 0.2,
            arm_sag: 0.08,
            wrist_drop: 0.02,
            lean: 0.7,
            yaw: 0.0,
        };
        Some(preset.frame())
    }
}
