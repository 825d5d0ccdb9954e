use skylark_shared::*;

pub const SHOULDER_HALF_SPAN: f32 = 0.08;
const ELBOW_REACH: f32 = 0.20;
const WRIST_REACH: f32 = 0.34;
const CONFIDENCE: f32 = 0.95;

/// Camera-space skeleton builder shared by the synthetic sources.
/// Coordinates follow the detector convention: origin top-left, y growing
/// downward, the subject's left side on the image's right.
#[derive(Debug, Clone, Copy)]
pub struct PosePreset {
    /// 0 = arms hanging, 1 = full T-pose.
    pub arm_spread: f32,
    /// Elbow droop below the shoulder line, image units.
    pub arm_sag: f32,
    /// Wrist offset below the elbow, image units. Negative raises the wrists.
    pub wrist_drop: f32,
    /// Torso lean this pose should read as, positive = toward the camera.
    pub lean: f32,
    /// Torso yaw this pose should read as, positive = turning right.
    pub yaw: f32,
}

impl Default for PosePreset {
    fn default() -> Self {
        // Neutral standing: arms down, facing straight ahead.
        Self {
            arm_spread: 0.05,
            arm_sag: 0.06,
            wrist_drop: 0.05,
            lean: 0.0,
            yaw: 0.0,
        }
    }
}

impl PosePreset {
    pub fn frame(&self) -> KeypointFrame {
        let width = 2.0 * SHOULDER_HALF_SPAN;
        let elbow_dx = SHOULDER_HALF_SPAN + self.arm_spread * ELBOW_REACH;
        let wrist_dx = SHOULDER_HALF_SPAN + self.arm_spread * WRIST_REACH;
        let elbow_y = 0.5 + self.arm_sag;
        let wrist_y = elbow_y + self.wrist_drop;

        let mut frame = KeypointFrame::default();
        frame.insert(JointId::LeftShoulder, 0.5 + SHOULDER_HALF_SPAN, 0.5, CONFIDENCE);
        frame.insert(JointId::RightShoulder, 0.5 - SHOULDER_HALF_SPAN, 0.5, CONFIDENCE);
        frame.insert(JointId::LeftElbow, 0.5 + elbow_dx, elbow_y, CONFIDENCE);
        frame.insert(JointId::RightElbow, 0.5 - elbow_dx, elbow_y, CONFIDENCE);
        frame.insert(JointId::LeftWrist, 0.5 + wrist_dx, wrist_y, CONFIDENCE);
        frame.insert(JointId::RightWrist, 0.5 - wrist_dx, wrist_y, CONFIDENCE);
        frame.insert(
            JointId::Nose,
            0.5 - self.yaw * width,
            0.5 + (self.lean - LEAN_NEUTRAL) * width,
            CONFIDENCE,
        );
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureExtractor;

    #[test]
    fn test_preset_carries_all_joints() {
        let frame = PosePreset::default().frame();
        assert_eq!(frame.joints.len(), 7);
    }

    #[test]
    fn test_preset_round_trips_through_extraction() {
        let preset = PosePreset {
            arm_spread: 1.0,
            arm_sag: 0.0,
            wrist_drop: 0.0,
            lean: 0.2,
            yaw: 0.25,
        };
        let mut extractor = FeatureExtractor::new(FlightConfig::default());
        let features = extractor.extract(Some(&preset.frame()), 0.066);

        assert!(features.arm_extension > 0.9, "T-pose should read extended");
        assert!((features.torso_lean - 0.2).abs() < 1e-3);
        assert!((features.torso_yaw - 0.25).abs() < 1e-3);
    }
}
