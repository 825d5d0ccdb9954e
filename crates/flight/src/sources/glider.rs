use skylark_shared::KeypointFrame;

use crate::sources::presets::PosePreset;
use crate::sources::MotionSource;

/// Held T-pose: arms level and fully spread.
pub struct GliderSource;

impl GliderSource {
    fn preset() -> PosePreset {
        PosePreset {
            arm_spread: 1.0,
            arm_sag: 0.0,
            wrist_drop: 0.0,
            lean: 0.0,
            yaw: 0.0,
        }
    }
}

impl MotionSource for GliderSource {
    fn name(&self) -> &str {
        "glider"
    }

    fn next_frame(&mut self, _cycle: u32) -> Option<KeypointFrame> {
        Some(Self::preset().frame())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skylark_shared::*;

    use crate::classifier::CommandClassifier;
    use crate::features::FeatureExtractor;

    #[test]
    fn test_glider_classifies_glide() {
        let config = FlightConfig::default();
        let mut source = GliderSource;
        let mut extractor = FeatureExtractor::new(config);
        let mut classifier = CommandClassifier::new(config);

        let mut last = FlightCommand::idle();
        for cycle in 0..10 {
            let frame = source.next_frame(cycle).unwrap();
            let features = extractor.extract(Some(&frame), 0.066);
            assert!(features.arm_extension >= config.glide_extension_min);
            last = classifier.classify(&features);
        }

        assert_eq!(last.vertical, VerticalCommand::Glide);
    }
}
