use skylark_shared::*;

struct Arm {
    elbow: Keypoint,
    wrist: Keypoint,
}

fn arm(frame: &KeypointFrame, elbow: JointId, wrist: JointId, min_confidence: f32) -> Option<Arm> {
    Some(Arm {
        elbow: *frame.joint(elbow, min_confidence)?,
        wrist: *frame.joint(wrist, min_confidence)?,
    })
}

/// Turns keypoint frames into motion features. Keeps the last good vector so
/// a dropped or degenerate frame never snaps the signals to zero.
pub struct FeatureExtractor {
    config: FlightConfig,
    prev: FeatureVector,
    primed: bool,
}

impl FeatureExtractor {
    pub fn new(config: FlightConfig) -> Self {
        Self {
            config,
            prev: FeatureVector::default(),
            primed: false,
        }
    }

    /// Extract features from one detection cycle. `cycle_dt` is the real
    /// elapsed time since the previous delivered frame.
    ///
    /// Returns the previous vector unchanged when the frame is missing, the
    /// dt is unusable, or the frame lacks the minimum joint set (both
    /// shoulders plus at least one elbow+wrist pair).
    pub fn extract(&mut self, frame: Option<&KeypointFrame>, cycle_dt: f32) -> FeatureVector {
        let Some(frame) = frame else {
            return self.prev;
        };
        if cycle_dt <= 0.0 {
            return self.prev;
        }

        let min_confidence = self.config.min_confidence;
        let (Some(left_shoulder), Some(right_shoulder)) = (
            frame.joint(JointId::LeftShoulder, min_confidence),
            frame.joint(JointId::RightShoulder, min_confidence),
        ) else {
            return self.prev;
        };

        let width = left_shoulder.pos().distance(right_shoulder.pos());
        if width < 1e-4 {
            return self.prev;
        }
        let shoulder_mid = (left_shoulder.pos() + right_shoulder.pos()) * 0.5;

        let left = arm(frame, JointId::LeftElbow, JointId::LeftWrist, min_confidence);
        let right = arm(frame, JointId::RightElbow, JointId::RightWrist, min_confidence);
        if left.is_none() && right.is_none() {
            return self.prev;
        }

        // Mean wrist-below-elbow offset over the arms we can see, in
        // shoulder widths so camera distance cancels out.
        let mut offset_sum = 0.0;
        let mut arm_count = 0u32;
        for pair in [&left, &right].into_iter().flatten() {
            offset_sum += (pair.wrist.y - pair.elbow.y) / width;
            arm_count += 1;
        }
        let arm_offset = offset_sum / arm_count as f32;

        // Image y grows downward, so a rising wrist shrinks the offset.
        let arm_vertical_speed = if self.primed {
            (self.prev.arm_offset - arm_offset) / cycle_dt
        } else {
            0.0
        };

        // Extension only counts with both arms present and held level;
        // half a wingspan is never a glide.
        let arm_extension = match (&left, &right) {
            (Some(l), Some(r)) => {
                let left_level = (left_shoulder.y - l.elbow.y).abs() < self.config.arm_level_max;
                let right_level = (right_shoulder.y - r.elbow.y).abs() < self.config.arm_level_max;
                if left_level && right_level {
                    let span = l.wrist.pos().distance(r.wrist.pos());
                    (span / (self.config.wingspan_ratio * width)).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };

        // Nose missing: hold lean and yaw, the arm features stay live.
        let (torso_lean, torso_yaw) = match frame.joint(JointId::Nose, min_confidence) {
            Some(nose) => {
                let lean = (nose.y - shoulder_mid.y) / width + self.config.lean_neutral;
                let mut yaw = (nose.x - shoulder_mid.x) / width;
                if self.config.mirror_input {
                    yaw = -yaw;
                }
                (lean, yaw)
            }
            None => (self.prev.torso_lean, self.prev.torso_yaw),
        };

        let features = FeatureVector {
            arm_extension,
            arm_vertical_speed,
            torso_lean,
            torso_yaw,
            arm_offset,
        };
        self.prev = features;
        self.primed = true;
        features
    }

    pub fn last(&self) -> FeatureVector {
        self.prev
    }
}
