use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{FlightConfig, SessionConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointId {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

impl Keypoint {
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn is_valid(&self, min_confidence: f32) -> bool {
        self.confidence >= min_confidence
    }
}

/// One detection cycle's worth of keypoints, keyed by joint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeypointFrame {
    pub joints: BTreeMap<JointId, Keypoint>,
}

impl KeypointFrame {
    /// Look up a joint, treating low-confidence detections as absent.
    pub fn joint(&self, id: JointId, min_confidence: f32) -> Option<&Keypoint> {
        self.joints.get(&id).filter(|k| k.is_valid(min_confidence))
    }

    pub fn insert(&mut self, id: JointId, x: f32, y: f32, confidence: f32) {
        self.joints.insert(id, Keypoint { x, y, confidence });
    }
}

/// Motion signals derived from one keypoint frame, normalized by shoulder width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Wingspan openness in [0,1]. Zero unless both arms are held level.
    pub arm_extension: f32,
    /// Signed wrist motion in shoulder widths per second, positive = raising.
    pub arm_vertical_speed: f32,
    /// Signed torso pitch, positive = leaning toward the camera.
    pub torso_lean: f32,
    /// Signed torso yaw, positive = turning right.
    pub torso_yaw: f32,
    /// Raw mean wrist-below-elbow offset, kept for differentiation.
    pub arm_offset: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerticalCommand {
    Idle,
    Glide,
    Dive { intensity: f32 },
    Flap { intensity: f32 },
    GainHeight { intensity: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    pub fn sign(&self) -> f32 {
        match self {
            TurnDirection::Left => -1.0,
            TurnDirection::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnCommand {
    pub direction: TurnDirection,
    pub intensity: f32,
}

/// One vertical command per cycle plus an optional, independent turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightCommand {
    pub vertical: VerticalCommand,
    pub turn: Option<TurnCommand>,
}

impl FlightCommand {
    pub fn idle() -> Self {
        Self {
            vertical: VerticalCommand::Idle,
            turn: None,
        }
    }
}

impl Default for FlightCommand {
    fn default() -> Self {
        Self::idle()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BirdState {
    pub speed: f32,
    pub height: f32,
    pub vertical_momentum: f32,
    pub turn_rate: f32,
    /// Accumulated heading in radians; the renderer wraps it.
    pub yaw: f32,
    /// Cosmetic banking angle in [-1,1], chases turn_rate.
    pub bank: f32,
    pub energy: f32,
}

impl BirdState {
    pub fn spawn(config: &FlightConfig) -> Self {
        Self {
            speed: 0.0,
            height: config.start_height,
            vertical_momentum: 0.0,
            turn_rate: 0.0,
            yaw: 0.0,
            bank: 0.0,
            energy: 1.0,
        }
    }

    pub fn grounded(&self) -> bool {
        self.height <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogFrame {
    pub tick: u32,
    pub bird: BirdState,
    pub command: FlightCommand,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub final_tick: u32,
    pub landings: u32,
    pub dropped_frames: u32,
    pub forced_idles: u32,
    pub peak_height: f32,
    pub peak_speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLog {
    pub config: SessionConfig,
    pub frames: Vec<LogFrame>,
    pub summary: SessionSummary,
}
