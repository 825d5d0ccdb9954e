use skylark_shared::KeypointFrame;

use crate::sources::presets::PosePreset;
use crate::sources::MotionSource;

/// Arms down, no motion. The pipeline should read this as idle forever.
pub struct StandingSource;

impl MotionSource for StandingSource {
    fn name(&self) -> &str {
        "standing"
    }

    fn next_frame(&mut self, _cycle: u32) -> Option<KeypointFrame> {
        Some(PosePreset::default().frame())
    }
}
