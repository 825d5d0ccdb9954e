use std::collections::VecDeque;

use skylark_shared::*;

use crate::smoothing::Smoother;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerticalMode {
    Idle,
    Glide,
    Dive,
    Flap,
    GainHeight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnMode {
    Off,
    Left,
    Right,
}

/// Debounces mode flips: a new mode must be observed for `required`
/// consecutive cycles before it replaces the held one.
struct Latch<M> {
    held: M,
    candidate: Option<M>,
    streak: u32,
}

impl<M: Copy + PartialEq> Latch<M> {
    fn new(held: M) -> Self {
        Self {
            held,
            candidate: None,
            streak: 0,
        }
    }

    fn update(&mut self, raw: M, required: u32) -> M {
        if raw == self.held {
            self.candidate = None;
            self.streak = 0;
        } else {
            if self.candidate == Some(raw) {
                self.streak += 1;
            } else {
                self.candidate = Some(raw);
                self.streak = 1;
            }
            if self.streak >= required {
                self.held = raw;
                self.candidate = None;
                self.streak = 0;
            }
        }
        self.held
    }

    fn force(&mut self, mode: M) {
        self.held = mode;
        self.candidate = None;
        self.streak = 0;
    }
}

/// Maps feature vectors to flight commands, one per detection cycle.
pub struct CommandClassifier {
    config: FlightConfig,
    arm_speeds: VecDeque<f32>,
    vertical: Latch<VerticalMode>,
    turn: Latch<TurnMode>,
    flap_intensity: Smoother,
    dive_intensity: Smoother,
    turn_intensity: Smoother,
}

impl CommandClassifier {
    pub fn new(config: FlightConfig) -> Self {
        Self {
            config,
            arm_speeds: VecDeque::with_capacity(config.flap_window as usize + 1),
            vertical: Latch::new(VerticalMode::Idle),
            turn: Latch::new(TurnMode::Off),
            flap_intensity: Smoother::new(config.smooth_flap),
            dive_intensity: Smoother::new(config.smooth_dive),
            turn_intensity: Smoother::new(config.smooth_turn),
        }
    }

    pub fn classify(&mut self, features: &FeatureVector) -> FlightCommand {
        let c = &self.config;

        self.arm_speeds.push_back(features.arm_vertical_speed);
        while self.arm_speeds.len() > c.flap_window as usize {
            self.arm_speeds.pop_front();
        }
        let flapping = self.window_has_reversal();

        // Fixed priority: climb > flap > glide > dive > idle.
        let raw_vertical = if flapping && features.torso_lean < c.back_lean_max {
            VerticalMode::GainHeight
        } else if flapping {
            VerticalMode::Flap
        } else if features.arm_extension >= c.glide_extension_min {
            VerticalMode::Glide
        } else if features.torso_lean >= c.dive_lean_min {
            VerticalMode::Dive
        } else {
            VerticalMode::Idle
        };

        // Intensities track their signals every cycle so a freshly switched
        // mode starts from a warm value.
        let flap_level = self
            .flap_intensity
            .apply(features.arm_vertical_speed.abs())
            .clamp(0.0, 1.0);
        let dive_raw = ((features.torso_lean - c.dive_lean_min)
            / (c.dive_lean_full - c.dive_lean_min))
            .clamp(0.0, 1.0);
        let dive_level = self.dive_intensity.apply(dive_raw).clamp(0.0, 1.0);

        let vertical = match self.vertical.update(raw_vertical, c.hysteresis_cycles) {
            VerticalMode::Idle => VerticalCommand::Idle,
            VerticalMode::Glide => VerticalCommand::Glide,
            VerticalMode::Dive => VerticalCommand::Dive {
                intensity: dive_level,
            },
            VerticalMode::Flap => VerticalCommand::Flap {
                intensity: flap_level,
            },
            VerticalMode::GainHeight => VerticalCommand::GainHeight {
                intensity: flap_level,
            },
        };

        let yaw = features.torso_yaw;
        let raw_turn = if yaw.abs() > c.turn_deadzone {
            if yaw > 0.0 {
                TurnMode::Right
            } else {
                TurnMode::Left
            }
        } else {
            TurnMode::Off
        };
        // Power curve above the deadzone, strictly monotonic in |yaw|.
        let turn_raw = ((yaw.abs() - c.turn_deadzone) / (c.turn_full_range - c.turn_deadzone))
            .clamp(0.0, 1.0)
            .powf(c.turn_exponent);
        let turn_level = self.turn_intensity.apply(turn_raw).clamp(0.0, 1.0);

        let turn = match self.turn.update(raw_turn, c.hysteresis_cycles) {
            TurnMode::Off => None,
            TurnMode::Left => Some(TurnCommand {
                direction: TurnDirection::Left,
                intensity: turn_level,
            }),
            TurnMode::Right => Some(TurnCommand {
                direction: TurnDirection::Right,
                intensity: turn_level,
            }),
        };

        FlightCommand { vertical, turn }
    }

    /// One full up/down reversal among window samples above the noise floor.
    fn window_has_reversal(&self) -> bool {
        let floor = self.config.flap_noise_floor;
        let mut prev_sign = 0.0f32;
        for &v in &self.arm_speeds {
            if v.abs() <= floor {
                continue;
            }
            let sign = v.signum();
            if prev_sign != 0.0 && sign != prev_sign {
                return true;
            }
            prev_sign = sign;
        }
        false
    }

    /// Latch both axes to idle immediately, bypassing hysteresis. Used when
    /// the detector goes silent; the next real frames re-earn their mode.
    pub fn force_idle(&mut self) {
        self.vertical.force(VerticalMode::Idle);
        self.turn.force(TurnMode::Off);
        self.arm_speeds.clear();
        self.flap_intensity.reset(0.0);
        self.dive_intensity.reset(0.0);
        self.turn_intensity.reset(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> CommandClassifier {
        CommandClassifier::new(FlightConfig::default())
    }

    fn neutral() -> FeatureVector {
        FeatureVector::default()
    }

    fn gliding() -> FeatureVector {
        FeatureVector {
            arm_extension: 0.9,
            ..Default::default()
        }
    }

    fn leaning(lean: f32) -> FeatureVector {
        FeatureVector {
            torso_lean: lean,
            ..Default::default()
        }
    }

    fn yawing(yaw: f32) -> FeatureVector {
        FeatureVector {
            torso_yaw: yaw,
            ..Default::default()
        }
    }

    /// Alternating arm speed, strong enough to clear the noise floor.
    fn flap_stroke(cycle: u32, amplitude: f32) -> FeatureVector {
        let sign = if cycle % 2 == 0 { 1.0 } else { -1.0 };
        FeatureVector {
            arm_vertical_speed: sign * amplitude,
            ..Default::default()
        }
    }

    fn feed(c: &mut CommandClassifier, features: FeatureVector, cycles: u32) -> FlightCommand {
        let mut last = FlightCommand::idle();
        for _ in 0..cycles {
            last = c.classify(&features);
        }
        last
    }

    #[test]
    fn test_neutral_pose_is_idle() {
        let mut c = classifier();
        let cmd = feed(&mut c, neutral(), 10);
        assert_eq!(cmd.vertical, VerticalCommand::Idle);
        assert!(cmd.turn.is_none());
    }

    #[test]
    fn test_glide_requires_consecutive_cycles() {
        let mut c = classifier();
        feed(&mut c, neutral(), 4);
        let first = c.classify(&gliding());
        assert_eq!(first.vertical, VerticalCommand::Idle, "one cycle must not switch");
        let second = c.classify(&gliding());
        assert_eq!(second.vertical, VerticalCommand::Glide);
    }

    #[test]
    fn test_single_cycle_blip_never_switches() {
        let mut c = classifier();
        feed(&mut c, neutral(), 4);
        c.classify(&gliding());
        let after = feed(&mut c, neutral(), 6);
        assert_eq!(after.vertical, VerticalCommand::Idle);
    }

    #[test]
    fn test_reversal_reads_as_flap() {
        let mut c = classifier();
        let mut last = FlightCommand::idle();
        for cycle in 0..6 {
            last = c.classify(&flap_stroke(cycle, 0.4));
        }
        match last.vertical {
            VerticalCommand::Flap { intensity } => {
                assert!(intensity > 0.0, "flap intensity should be warm, got {intensity}");
            }
            other => panic!("expected flap, got {other:?}"),
        }
    }

    #[test]
    fn test_flap_while_leaning_back_climbs() {
        let mut c = classifier();
        let mut last = FlightCommand::idle();
        for cycle in 0..6 {
            let mut f = flap_stroke(cycle, 0.5);
            f.torso_lean = -0.3;
            last = c.classify(&f);
        }
        assert!(
            matches!(last.vertical, VerticalCommand::GainHeight { .. }),
            "expected climb, got {:?}",
            last.vertical
        );
    }

    #[test]
    fn test_flap_outranks_glide() {
        let mut c = classifier();
        let mut last = FlightCommand::idle();
        for cycle in 0..6 {
            let mut f = flap_stroke(cycle, 0.5);
            f.arm_extension = 1.0;
            last = c.classify(&f);
        }
        assert!(matches!(last.vertical, VerticalCommand::Flap { .. }));
    }

    #[test]
    fn test_forward_lean_dives() {
        let mut c = classifier();
        let cmd = feed(&mut c, leaning(0.6), 5);
        match cmd.vertical {
            VerticalCommand::Dive { intensity } => {
                assert!(intensity > 0.3, "strong lean should dive hard, got {intensity}");
            }
            other => panic!("expected dive, got {other:?}"),
        }
    }

    #[test]
    fn test_weak_arm_noise_does_not_flap() {
        let mut c = classifier();
        let mut last = FlightCommand::idle();
        for cycle in 0..10 {
            last = c.classify(&flap_stroke(cycle, 0.1)); // under the floor
        }
        assert_eq!(last.vertical, VerticalCommand::Idle);
    }

    #[test]
    fn test_yaw_inside_deadzone_is_no_turn() {
        let mut c = classifier();
        let cmd = feed(&mut c, yawing(0.05), 6);
        assert!(cmd.turn.is_none());
    }

    #[test]
    fn test_turn_direction_follows_sign() {
        let mut c = classifier();
        let cmd = feed(&mut c, yawing(0.3), 5);
        assert_eq!(cmd.turn.map(|t| t.direction), Some(TurnDirection::Right));

        let mut c = classifier();
        let cmd = feed(&mut c, yawing(-0.3), 5);
        assert_eq!(cmd.turn.map(|t| t.direction), Some(TurnDirection::Left));
    }

    #[test]
    fn test_turn_intensity_monotonic_in_yaw() {
        let mut gentle = classifier();
        let small = feed(&mut gentle, yawing(0.1), 12);
        let mut sharp = classifier();
        let large = feed(&mut sharp, yawing(0.3), 12);

        let small_i = small.turn.map(|t| t.intensity).unwrap_or(0.0);
        let large_i = large.turn.map(|t| t.intensity).unwrap_or(0.0);
        assert!(small_i > 0.0, "yaw past the deadzone should turn, got {small_i}");
        assert!(
            large_i > small_i,
            "larger yaw must turn harder: {large_i} vs {small_i}"
        );
    }

    #[test]
    fn test_turn_combines_with_glide() {
        let mut c = classifier();
        let mut f = gliding();
        f.torso_yaw = 0.3;
        let cmd = feed(&mut c, f, 5);
        assert_eq!(cmd.vertical, VerticalCommand::Glide);
        assert!(cmd.turn.is_some());
    }

    #[test]
    fn test_force_idle_latches_immediately() {
        let mut c = classifier();
        feed(&mut c, gliding(), 5);
        c.force_idle();
        let cmd = c.classify(&neutral());
        assert_eq!(cmd.vertical, VerticalCommand::Idle);
        assert!(cmd.turn.is_none());
    }

    #[test]
    fn test_modes_reearned_after_force_idle() {
        let mut c = classifier();
        feed(&mut c, gliding(), 5);
        c.force_idle();
        let first = c.classify(&gliding());
        assert_eq!(first.vertical, VerticalCommand::Idle);
        let second = c.classify(&gliding());
        assert_eq!(second.vertical, VerticalCommand::Glide);
    }
}
